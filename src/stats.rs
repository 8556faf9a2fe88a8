// Summary statistics over numeric series and aggregated groups.
//
// Every function here guards its divisor and its reductions: empty input
// gives zeros, never NaN or a panic.
use crate::types::{AggregatedGroup, SalaryFigure, StatisticsSummary};

pub const REMOTE_LABEL: &str = "Remote";
/// Labels counted as the on-site bucket.
pub const ONSITE_LABELS: [&str; 2] = ["Onsite/Hybrid", "Onsite"];

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

fn min_of(v: &[f64]) -> Option<f64> {
    v.iter().copied().reduce(f64::min)
}

fn max_of(v: &[f64]) -> Option<f64> {
    v.iter().copied().reduce(f64::max)
}

/// `{average, min, max, spread}` of a series; all zero when it is empty.
pub fn summarize(series: &[f64]) -> StatisticsSummary {
    match (min_of(series), max_of(series)) {
        (Some(min), Some(max)) => StatisticsSummary {
            average: average(series),
            min,
            max,
            spread: max - min,
        },
        _ => StatisticsSummary::default(),
    }
}

/// `part` as a percentage of `whole`, 0 when `whole` is not positive.
pub fn share(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        (part / whole) * 100.0
    } else {
        0.0
    }
}

/// Bar width relative to the largest value shown.
pub fn share_of_top(value: f64, top: f64) -> f64 {
    share(value, top)
}

/// Total divided by group count, rounded to the nearest integer.
pub fn average_per_group(total: f64, group_count: usize) -> f64 {
    if group_count == 0 {
        return 0.0;
    }
    (total / group_count as f64).round()
}

pub fn total_of(groups: &[AggregatedGroup]) -> f64 {
    groups.iter().map(|g| g.total).sum()
}

/// Total of the group labelled exactly `label`, 0 if there is none.
pub fn category_total(groups: &[AggregatedGroup], label: &str) -> f64 {
    groups
        .iter()
        .find(|g| g.key == label)
        .map(|g| g.total)
        .unwrap_or(0.0)
}

/// Share of all positions held by the category labelled exactly `label`.
pub fn category_share(groups: &[AggregatedGroup], label: &str) -> f64 {
    share(category_total(groups, label), total_of(groups))
}

pub fn remote_share(groups: &[AggregatedGroup]) -> f64 {
    category_share(groups, REMOTE_LABEL)
}

/// The first group, in payload order, carrying one of the on-site labels.
pub fn onsite_group(groups: &[AggregatedGroup]) -> Option<&AggregatedGroup> {
    groups
        .iter()
        .find(|g| ONSITE_LABELS.contains(&g.key.as_str()))
}

/// Headline salary statistics over the valid figures only.
///
/// - `average`: mean of the median salaries.
/// - `min`: lowest positive minimum salary, or the lowest median when no
///   figure carries a minimum.
/// - `max`: highest median salary.
/// - `spread`: the market spread, `max - min`.
pub fn salary_statistics(figures: &[SalaryFigure]) -> StatisticsSummary {
    let medians: Vec<f64> = figures
        .iter()
        .filter(|f| f.is_valid())
        .map(SalaryFigure::median)
        .collect();
    let Some(highest_median) = max_of(&medians) else {
        return StatisticsSummary::default();
    };
    let minimums: Vec<f64> = figures
        .iter()
        .filter(|f| f.is_valid())
        .filter_map(|f| f.min_salary)
        .filter(|m| *m > 0.0)
        .collect();
    let lowest = min_of(&minimums)
        .or_else(|| min_of(&medians))
        .unwrap_or(0.0);
    StatisticsSummary {
        average: average(&medians),
        min: lowest,
        max: highest_median,
        spread: highest_median - lowest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CanonicalRecord;
    use pretty_assertions::assert_eq;

    fn group(key: &str, total: f64) -> AggregatedGroup {
        let mut g = AggregatedGroup::new(key);
        g.push(CanonicalRecord::new(key, total));
        g
    }

    fn figure(min: Option<f64>, median: Option<f64>) -> SalaryFigure {
        SalaryFigure {
            city: "Austin".into(),
            role: "Data scientist".into(),
            min_salary: min,
            median_salary: median,
            ..SalaryFigure::default()
        }
    }

    #[test]
    fn summarize_empty_is_all_zero() {
        assert_eq!(summarize(&[]), StatisticsSummary::default());
    }

    #[test]
    fn summarize_series() {
        let s = summarize(&[4.0, 10.0, 1.0]);
        assert_eq!(s.average, 5.0);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 10.0);
        assert_eq!(s.spread, 9.0);
    }

    #[test]
    fn share_guards_zero_divisor() {
        assert_eq!(share(3.0, 0.0), 0.0);
        assert_eq!(share(1.0, 4.0), 25.0);
    }

    #[test]
    fn average_per_group_rounds() {
        assert_eq!(average_per_group(10.0, 3), 3.0);
        assert_eq!(average_per_group(11.0, 2), 6.0);
        assert_eq!(average_per_group(5.0, 0), 0.0);
    }

    #[test]
    fn remote_share_matches_exact_label() {
        let groups = vec![group("Remote", 40.0), group("Onsite", 60.0)];
        assert!((remote_share(&groups) - 40.0).abs() < 1e-9);
        let lower = vec![group("remote", 40.0), group("Onsite", 60.0)];
        assert_eq!(remote_share(&lower), 0.0);
    }

    #[test]
    fn onsite_takes_first_matching_label() {
        let groups = vec![group("Onsite", 70.0), group("Onsite/Hybrid", 5.0), group("Remote", 25.0)];
        let found = onsite_group(&groups).expect("an on-site group");
        assert_eq!((found.key.as_str(), found.total), ("Onsite", 70.0));
        let hybrid_first = vec![group("Remote", 1.0), group("Onsite/Hybrid", 2.0), group("Onsite", 3.0)];
        assert_eq!(onsite_group(&hybrid_first).map(|g| g.key.as_str()), Some("Onsite/Hybrid"));
        assert!(onsite_group(&[group("Remote", 1.0)]).is_none());
    }

    #[test]
    fn salary_statistics_use_valid_figures_only() {
        let figures = vec![
            figure(Some(80_000.0), Some(100_000.0)),
            figure(Some(60_000.0), Some(140_000.0)),
            figure(Some(10_000.0), None),
            figure(Some(5_000.0), Some(0.0)),
        ];
        let s = salary_statistics(&figures);
        assert_eq!(s.average, 120_000.0);
        assert_eq!(s.min, 60_000.0);
        assert_eq!(s.max, 140_000.0);
        assert_eq!(s.spread, 80_000.0);
    }

    #[test]
    fn salary_minimum_falls_back_to_lowest_median() {
        let figures = vec![figure(None, Some(90_000.0)), figure(Some(0.0), Some(110_000.0))];
        let s = salary_statistics(&figures);
        assert_eq!(s.min, 90_000.0);
        assert_eq!(s.spread, 20_000.0);
    }

    #[test]
    fn salary_statistics_without_valid_figures_are_zero() {
        assert_eq!(salary_statistics(&[]), StatisticsSummary::default());
        assert_eq!(
            salary_statistics(&[figure(Some(1.0), None)]),
            StatisticsSummary::default()
        );
    }
}
