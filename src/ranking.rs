use crate::stats::share;
use crate::types::{AggregatedGroup, RankedEntry};
use std::cmp::Ordering;

/// Rank groups by `metric`, highest first.
///
/// Ties keep their incoming order, so ranking groups straight out of the
/// aggregator breaks ties by first appearance. Ranks are dense `1..=N`.
/// `percentage_of_total` is each group's `total` over the sum of every
/// group's `total`, computed before `limit` truncates the list: a top-K
/// slice shows its share of the whole market, not of the slice.
pub fn rank<F>(groups: Vec<AggregatedGroup>, metric: F, limit: Option<usize>) -> Vec<RankedEntry>
where
    F: Fn(&AggregatedGroup) -> f64,
{
    let total_across_groups: f64 = groups.iter().map(|g| g.total).sum();

    let mut scored: Vec<(f64, AggregatedGroup)> = groups
        .into_iter()
        .map(|g| {
            let m = metric(&g);
            (if m.is_nan() { 0.0 } else { m }, g)
        })
        .collect();
    // `sort_by` is stable.
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    scored
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .enumerate()
        .map(|(idx, (_, group))| {
            let percentage_of_total = share(group.total, total_across_groups).clamp(0.0, 100.0);
            RankedEntry {
                rank: idx + 1,
                group,
                percentage_of_total,
            }
        })
        .collect()
}

/// Rank by group total.
pub fn rank_by_total(groups: Vec<AggregatedGroup>, limit: Option<usize>) -> Vec<RankedEntry> {
    rank(groups, |g| g.total, limit)
}
