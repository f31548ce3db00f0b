use std::f64::consts::PI;

use chatlog_metrics::LanguageCount;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width bins over `[min, max]`; the last bin is closed on the right.
/// A constant series gets a range centred on its value, at least one unit wide.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let (mut low, mut high) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), value| {
            (low.min(*value), high.max(*value))
        });
    if low == high {
        let pad = (low.abs() * 1e-9).max(0.5);
        low -= pad;
        high += pad;
    }

    let width = (high - low) / bins as f64;
    let mut counts = vec![0_usize; bins];
    for value in values {
        let index = (((value - low) / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(index, count)| HistogramBin {
            start: low + width * index as f64,
            end: if index + 1 == bins {
                high
            } else {
                low + width * (index + 1) as f64
            },
            count,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub count: usize,
    pub fraction: f64,
    /// Radians, counter-clockwise from the positive x axis.
    pub start_angle: f64,
    pub end_angle: f64,
}

impl PieSlice {
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.fraction * 100.0)
    }
}

/// Slices follow the order of `counts`, starting at angle zero.
pub fn pie_slices(counts: &[LanguageCount]) -> Vec<PieSlice> {
    let total: usize = counts.iter().map(|entry| entry.count).sum();
    if total == 0 {
        return Vec::new();
    }

    let mut angle = 0.0;
    counts
        .iter()
        .filter(|entry| entry.count > 0)
        .map(|entry| {
            let fraction = entry.count as f64 / total as f64;
            let start_angle = angle;
            angle += fraction * 2.0 * PI;
            PieSlice {
                label: entry.language.as_str().to_string(),
                count: entry.count,
                fraction,
                start_angle,
                end_angle: angle,
            }
        })
        .collect()
}

const MAX_TICKS: usize = 64;

/// Tick positions covering `[low, high]` on a 1-2-5 step.
pub fn axis_ticks(low: f64, high: f64, target: usize) -> Vec<f64> {
    if !(high > low) || target == 0 {
        return vec![low];
    }

    let raw_step = (high - low) / target as f64;
    let magnitude = 10_f64.powf(raw_step.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|factor| factor * magnitude)
        .find(|step| *step >= raw_step)
        .unwrap_or(10.0 * magnitude);

    let first = (low / step).ceil() * step;
    if first + step == first {
        // step is below the float resolution at this magnitude
        return vec![low, high];
    }

    let last = ((high - first) / step + 1e-9).floor().max(0.0) as usize;
    (0..=last.min(MAX_TICKS))
        .map(|index| first + index as f64 * step)
        .filter(|tick| *tick <= high + step * 1e-9)
        .collect()
}

pub fn format_tick(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}
