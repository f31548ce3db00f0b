use std::f64::consts::PI;

use chatlog_metrics::{TokenPoint, VisualizationBundle};
use chrono::DateTime;

use crate::charts::{axis_ticks, format_tick, histogram, pie_slices};
use crate::config::DashboardConfig;
use crate::svg::{Anchor, SvgDocument};

const TITLE_SIZE: f64 = 18.0;
const LABEL_SIZE: f64 = 14.0;
const TICK_SIZE: f64 = 11.0;
const Y_TICK_TARGET: usize = 5;
const X_TICK_TARGET: usize = 6;

/// One cell of the 2x2 grid.
#[derive(Debug, Clone, Copy)]
struct Panel {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

/// Inner drawing region of a panel, in absolute coordinates.
#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl Panel {
    fn grid(config: &DashboardConfig) -> [Panel; 4] {
        let width = f64::from(config.width) / 2.0;
        let height = f64::from(config.height) / 2.0;
        let cell = |column: f64, row: f64| Panel {
            x: column * width,
            y: row * height,
            width,
            height,
        };
        [cell(0.0, 0.0), cell(1.0, 0.0), cell(0.0, 1.0), cell(1.0, 1.0)]
    }

    fn plot_area(&self) -> PlotArea {
        PlotArea {
            left: self.x + 80.0,
            top: self.y + 50.0,
            right: self.x + self.width - 30.0,
            bottom: self.y + self.height - 70.0,
        }
    }

    fn title(&self, doc: &mut SvgDocument, title: &str, config: &DashboardConfig) {
        doc.text(
            self.x + self.width / 2.0,
            self.y + 32.0,
            title,
            TITLE_SIZE,
            Anchor::Middle,
            &config.text_color,
        );
    }
}

impl PlotArea {
    fn width(&self) -> f64 {
        (self.right - self.left).max(1.0)
    }

    fn height(&self) -> f64 {
        (self.bottom - self.top).max(1.0)
    }

    fn x_at(&self, value: f64, low: f64, high: f64) -> f64 {
        self.left + (value - low) / (high - low) * self.width()
    }

    fn y_at(&self, value: f64, low: f64, high: f64) -> f64 {
        self.bottom - (value - low) / (high - low) * self.height()
    }

    fn background(&self, doc: &mut SvgDocument, config: &DashboardConfig) {
        doc.rect(
            self.left,
            self.top,
            self.width(),
            self.height(),
            &config.plot_background,
        );
    }

    fn no_data(&self, doc: &mut SvgDocument, config: &DashboardConfig) {
        doc.text(
            self.left + self.width() / 2.0,
            self.top + self.height() / 2.0,
            "No data",
            LABEL_SIZE,
            Anchor::Middle,
            &config.text_color,
        );
    }

    /// Horizontal grid lines and labels; returns the top of the value range.
    fn y_axis(&self, doc: &mut SvgDocument, max: f64, config: &DashboardConfig) -> f64 {
        let ticks = axis_ticks(0.0, max.max(1.0), Y_TICK_TARGET);
        let high = ticks.last().copied().unwrap_or(1.0).max(max).max(1.0);

        for tick in ticks {
            let y = self.y_at(tick, 0.0, high);
            doc.line(self.left, y, self.right, y, &config.grid_color, 1.0);
            doc.text(
                self.left - 8.0,
                y + TICK_SIZE / 3.0,
                &format_tick(tick),
                TICK_SIZE,
                Anchor::End,
                &config.text_color,
            );
        }
        high
    }

    fn axis_labels(
        &self,
        doc: &mut SvgDocument,
        x_label: Option<&str>,
        y_label: Option<&str>,
        config: &DashboardConfig,
    ) {
        if let Some(label) = x_label {
            doc.text(
                self.left + self.width() / 2.0,
                self.bottom + 50.0,
                label,
                LABEL_SIZE,
                Anchor::Middle,
                &config.text_color,
            );
        }
        if let Some(label) = y_label {
            doc.vertical_text(
                self.left - 55.0,
                self.top + self.height() / 2.0,
                label,
                LABEL_SIZE,
                &config.text_color,
            );
        }
    }
}

pub fn render_dashboard(bundle: &VisualizationBundle, config: &DashboardConfig) -> String {
    let mut doc = SvgDocument::new(config.width, config.height, &config.font_family);
    doc.rect(
        0.0,
        0.0,
        f64::from(config.width),
        f64::from(config.height),
        &config.background,
    );

    let [hourly, latency, language, tokens] = Panel::grid(config);
    hourly_bars(&mut doc, hourly, bundle, config);
    latency_histogram(&mut doc, latency, &bundle.latency_distribution, config);
    language_pie(&mut doc, language, bundle, config);
    token_scatter(&mut doc, tokens, &bundle.token_usage, config);

    doc.finish()
}

fn hourly_bars(
    doc: &mut SvgDocument,
    panel: Panel,
    bundle: &VisualizationBundle,
    config: &DashboardConfig,
) {
    panel.title(doc, "Interactions by Hour", config);
    let area = panel.plot_area();
    area.background(doc, config);
    area.axis_labels(
        doc,
        Some("Hour of Day"),
        Some("Number of Interactions"),
        config,
    );

    if bundle.hourly_interactions.is_empty() {
        area.no_data(doc, config);
        return;
    }

    let max = bundle
        .hourly_interactions
        .values()
        .copied()
        .max()
        .unwrap_or_default() as f64;
    let high = area.y_axis(doc, max, config);

    let slot = area.width() / bundle.hourly_interactions.len() as f64;
    for (index, (hour, count)) in bundle.hourly_interactions.iter().enumerate() {
        let x = area.left + slot * index as f64 + slot * 0.1;
        let y = area.y_at(*count as f64, 0.0, high);
        doc.rect(x, y, slot * 0.8, area.bottom - y, config.color(0));
        doc.text(
            x + slot * 0.4,
            area.bottom + 18.0,
            &hour.to_string(),
            TICK_SIZE,
            Anchor::Middle,
            &config.text_color,
        );
    }
}

fn latency_histogram(
    doc: &mut SvgDocument,
    panel: Panel,
    latencies: &[f64],
    config: &DashboardConfig,
) {
    panel.title(doc, "Latency Distribution", config);
    let area = panel.plot_area();
    area.background(doc, config);
    area.axis_labels(doc, Some("Latency (ms)"), Some("Count"), config);

    let bins = histogram(latencies, config.histogram_bins);
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        area.no_data(doc, config);
        return;
    };
    let (low, high_x) = (first.start, last.end);

    let max = bins.iter().map(|bin| bin.count).max().unwrap_or_default() as f64;
    let high_y = area.y_axis(doc, max, config);

    for tick in axis_ticks(low, high_x, X_TICK_TARGET) {
        doc.text(
            area.x_at(tick, low, high_x),
            area.bottom + 18.0,
            &format_tick(tick),
            TICK_SIZE,
            Anchor::Middle,
            &config.text_color,
        );
    }

    for bin in &bins {
        if bin.count == 0 {
            continue;
        }
        let x = area.x_at(bin.start, low, high_x);
        let width = area.x_at(bin.end, low, high_x) - x;
        let y = area.y_at(bin.count as f64, 0.0, high_y);
        doc.rect(x, y, width, area.bottom - y, config.color(1));
        doc.line(x, y, x, area.bottom, &config.background, 0.5);
    }
}

fn language_pie(
    doc: &mut SvgDocument,
    panel: Panel,
    bundle: &VisualizationBundle,
    config: &DashboardConfig,
) {
    panel.title(doc, "Language Distribution", config);
    let area = panel.plot_area();

    let slices = pie_slices(&bundle.language_distribution);
    if slices.is_empty() {
        area.no_data(doc, config);
        return;
    }

    let cx = area.left + area.width() / 2.0;
    let cy = area.top + area.height() / 2.0;
    let radius = area.width().min(area.height()) / 2.0 * 0.8;
    let point = |angle: f64, scale: f64| {
        (
            cx + radius * scale * angle.cos(),
            cy - radius * scale * angle.sin(),
        )
    };

    for (index, slice) in slices.iter().enumerate() {
        let color = config.color(2 + index);
        if slices.len() == 1 {
            doc.circle(cx, cy, radius, color, 1.0);
        } else {
            let (x0, y0) = point(slice.start_angle, 1.0);
            let (x1, y1) = point(slice.end_angle, 1.0);
            let large_arc = u8::from(slice.end_angle - slice.start_angle > PI);
            let data = format!(
                "M {cx:.2} {cy:.2} L {x0:.2} {y0:.2} A {radius:.2} {radius:.2} 0 {large_arc} 0 {x1:.2} {y1:.2} Z"
            );
            doc.path(&data, color, &config.background);
        }

        let middle = (slice.start_angle + slice.end_angle) / 2.0;
        let (label_x, label_y) = point(middle, 1.12);
        let anchor = if middle.cos() < -0.1 {
            Anchor::End
        } else if middle.cos() > 0.1 {
            Anchor::Start
        } else {
            Anchor::Middle
        };
        doc.text(
            label_x,
            label_y,
            &slice.label,
            LABEL_SIZE,
            anchor,
            &config.text_color,
        );

        let (pct_x, pct_y) = point(middle, 0.6);
        doc.text(
            pct_x,
            pct_y + TICK_SIZE / 3.0,
            &slice.percent_label(),
            LABEL_SIZE,
            Anchor::Middle,
            &config.text_color,
        );
    }
}

fn token_scatter(
    doc: &mut SvgDocument,
    panel: Panel,
    points: &[TokenPoint],
    config: &DashboardConfig,
) {
    panel.title(doc, "Token Usage Over Time", config);
    let area = panel.plot_area();
    area.background(doc, config);
    area.axis_labels(doc, Some("Date"), Some("Total Tokens"), config);

    if points.is_empty() {
        area.no_data(doc, config);
        return;
    }

    let seconds: Vec<f64> = points
        .iter()
        .map(|point| point.timestamp.and_utc().timestamp() as f64)
        .collect();
    let (mut low, mut high) = seconds
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), value| {
            (low.min(*value), high.max(*value))
        });
    if low == high {
        low -= 3600.0;
        high += 3600.0;
    }
    let pad = (high - low) * 0.03;
    let (low, high) = (low - pad, high + pad);
    let span_days = (high - low) / 86_400.0;

    let max_tokens = points
        .iter()
        .map(|point| point.total_tokens)
        .max()
        .unwrap_or_default() as f64;
    let high_y = area.y_axis(doc, max_tokens * 1.05, config);

    for step in 0..X_TICK_TARGET {
        let value = low + (high - low) * (step as f64 + 0.5) / X_TICK_TARGET as f64;
        let Some(moment) = DateTime::from_timestamp(value as i64, 0) else {
            continue;
        };
        let label = if span_days < 2.0 {
            moment.format("%m-%d %H:%M").to_string()
        } else {
            moment.format("%Y-%m-%d").to_string()
        };
        doc.text(
            area.x_at(value, low, high),
            area.bottom + 18.0,
            &label,
            TICK_SIZE,
            Anchor::Middle,
            &config.text_color,
        );
    }

    for (point, x_value) in points.iter().zip(&seconds) {
        doc.circle(
            area.x_at(*x_value, low, high),
            area.y_at(point.total_tokens as f64, 0.0, high_y),
            4.0,
            config.color(4),
            config.scatter_alpha,
        );
    }
}
