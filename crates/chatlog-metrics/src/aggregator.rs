use std::collections::BTreeMap;

/// Count / mean / sample standard deviation over a stream of values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningStats {
    count: usize,
    sum: f64,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }

    /// Uses the n - 1 denominator; undefined below two samples.
    pub fn sample_std(&self) -> Option<f64> {
        if self.count < 2 {
            None
        } else {
            Some((self.m2 / (self.count - 1) as f64).sqrt())
        }
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = Self::default();
        for value in iter {
            stats.push(value);
        }
        stats
    }
}

/// Partitions `items` by `key` and folds every partition into an accumulator
/// created with `Default`. Groups come back ordered by key.
pub fn group_by<'a, T, K, A, KF, FF>(
    items: &'a [T],
    key: KF,
    mut fold: FF,
) -> BTreeMap<K, A>
where
    K: Ord,
    A: Default,
    KF: Fn(&'a T) -> K,
    FF: FnMut(&mut A, &'a T),
{
    let mut groups: BTreeMap<K, A> = BTreeMap::new();

    for item in items {
        let entry = groups.entry(key(item)).or_default();
        fold(entry, item);
    }

    groups
}

/// Counts occurrences of `key`, ordered by descending count. Ties keep the
/// order in which each key was first seen.
pub fn value_counts<'a, T, K, KF>(items: &'a [T], key: KF) -> Vec<(K, usize)>
where
    K: Ord + Clone,
    KF: Fn(&'a T) -> K,
{
    let mut first_seen: BTreeMap<K, (usize, usize)> = BTreeMap::new();

    for (position, item) in items.iter().enumerate() {
        let entry = first_seen.entry(key(item)).or_insert((position, 0));
        entry.1 += 1;
    }

    let mut counts: Vec<(K, usize, usize)> = first_seen
        .into_iter()
        .map(|(value, (position, count))| (value, position, count))
        .collect();
    counts.sort_by(|a, b| b.2.cmp(&a.2).then(a.1.cmp(&b.1)));

    counts
        .into_iter()
        .map(|(value, _, count)| (value, count))
        .collect()
}

/// Two-decimal rounding with exact ties going to the even neighbour, so an
/// error rate of 1/8 reports as 0.12.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::{group_by, round2, value_counts, RunningStats};

    #[test]
    fn running_stats_reports_undefined_values_for_small_samples() {
        let empty = RunningStats::default();
        assert_eq!(empty.count(), 0);
        assert_eq!(empty.mean(), None);
        assert_eq!(empty.sample_std(), None);

        let single: RunningStats = [4.0].into_iter().collect();
        assert_eq!(single.mean(), Some(4.0));
        assert_eq!(single.sample_std(), None);
    }

    #[test]
    fn running_stats_uses_sample_standard_deviation() {
        let stats: RunningStats = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]
            .into_iter()
            .collect();

        assert_eq!(stats.count(), 8);
        assert_eq!(stats.mean(), Some(5.0));
        // population std is 2.0; sample std is sqrt(32 / 7)
        let std = stats.sample_std().expect("defined for eight samples");
        assert!((std - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn group_by_orders_groups_by_key() {
        let items = [3_u32, 1, 3, 2, 1, 3];
        let groups = group_by(&items, |value| *value, |count: &mut usize, _| *count += 1);

        let collected: Vec<(u32, usize)> = groups.into_iter().collect();
        assert_eq!(collected, vec![(1, 2), (2, 1), (3, 3)]);
    }

    #[test]
    fn value_counts_breaks_ties_by_first_appearance() {
        let items = ["b", "a", "c", "a", "c", "d"];
        let counts = value_counts(&items, |value| value.to_string());

        assert_eq!(
            counts,
            vec![
                ("a".to_string(), 2),
                ("c".to_string(), 2),
                ("b".to_string(), 1),
                ("d".to_string(), 1),
            ]
        );
    }

    #[test]
    fn round2_rounds_to_two_decimals() {
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(200.0), 200.0);
        assert_eq!(round2(0.333_3), 0.33);
        assert_eq!(round2(1.005_1), 1.01);
    }

    #[test]
    fn round2_sends_exact_ties_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
    }
}
