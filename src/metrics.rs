use crate::config::{Cause, Classifier};
use crate::types::{
    AvailabilityMetrics, AvailabilityRecord, IncidentMetrics, IncidentRecord, ProblemSiteRow,
    RootCauseCount, TimeLoggedBucket,
};
use chrono::NaiveDate;
use std::collections::HashMap;

pub const TOP_SITES_LIMIT: usize = 10;
/// Bucket label for incidents with no root cause recorded.
pub const BLANK_ROOT_CAUSE: &str = "(blank)";

/// SLA counts over sites that are named. Rows missing either ratio are
/// counted as sites but neither as missed nor as met.
pub fn compute_availability_metrics(data: &[AvailabilityRecord]) -> AvailabilityMetrics {
    let mut metrics = AvailabilityMetrics::default();
    for r in data.iter().filter(|r| r.site.is_some()) {
        metrics.total_sites += 1;
        if let (Some(actual), Some(target)) = (r.actual, r.target) {
            if actual < target {
                metrics.missed_count += 1;
            } else if actual >= target {
                metrics.above_target_count += 1;
            }
        }
    }
    metrics
}

pub fn compute_incident_metrics(
    data: &[IncidentRecord],
    classifier: &Classifier,
) -> IncidentMetrics {
    let mut metrics = IncidentMetrics {
        total: data.len(),
        ..IncidentMetrics::default()
    };
    for r in data {
        match r.root_cause.as_deref().map(|rc| classifier.classify(rc)) {
            Some(Cause::Customer) => metrics.customer_caused += 1,
            Some(Cause::Vendor) => metrics.vendor_caused += 1,
            _ => {}
        }
        match r.status.as_deref() {
            Some("Closed") => metrics.closed += 1,
            Some("Open") => metrics.open += 1,
            _ => {}
        }
    }
    metrics
}

/// Count occurrences per key, keeping keys in order of first appearance,
/// then stable-sort by descending count so ties keep that order.
fn count_desc<'a, I>(keys: I) -> Vec<(&'a str, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for key in keys {
        match index.get(key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key, counts.len());
                counts.push((key, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Sites with the most incidents, ranked from 1, at most ten.
pub fn rank_problematic_sites(data: &[IncidentRecord]) -> Vec<ProblemSiteRow> {
    count_desc(data.iter().filter_map(|r| r.site_name.as_deref()))
        .into_iter()
        .take(TOP_SITES_LIMIT)
        .enumerate()
        .map(|(idx, (site, count))| ProblemSiteRow {
            rank: idx + 1,
            site_name: site.to_string(),
            incidents: count,
        })
        .collect()
}

pub fn count_by_root_cause(data: &[IncidentRecord]) -> Vec<RootCauseCount> {
    count_desc(
        data.iter()
            .map(|r| r.root_cause.as_deref().unwrap_or(BLANK_ROOT_CAUSE)),
    )
    .into_iter()
    .map(|(root_cause, count)| RootCauseCount {
        root_cause: root_cause.to_string(),
        count,
    })
    .collect()
}

/// Incidents per calendar day of `Time Logged`, split by root cause.
///
/// Days ascend; within a day root causes keep their first-seen order.
/// Incidents without a readable log time are skipped.
pub fn time_logged_histogram(data: &[IncidentRecord]) -> Vec<TimeLoggedBucket> {
    let mut cause_order: HashMap<&str, usize> = HashMap::new();
    let mut buckets: HashMap<(NaiveDate, &str), usize> = HashMap::new();
    for r in data {
        let Some(logged) = r.time_logged else {
            continue;
        };
        let cause = r.root_cause.as_deref().unwrap_or(BLANK_ROOT_CAUSE);
        let next = cause_order.len();
        cause_order.entry(cause).or_insert(next);
        *buckets.entry((logged.date(), cause)).or_default() += 1;
    }
    let mut rows: Vec<((NaiveDate, &str), usize)> = buckets.into_iter().collect();
    rows.sort_by_key(|((day, cause), _)| (*day, cause_order[cause]));
    rows.into_iter()
        .map(|((day, cause), count)| TimeLoggedBucket {
            day: day.format("%Y-%m-%d").to_string(),
            root_cause: cause.to_string(),
            count,
        })
        .collect()
}
