//! Aggregation engine: derives the dashboard views from a flat record list.
//!
//! Produces:
//! - **Classification counts**: records per classification
//! - **Topic counts**: records per key topic, most frequent first
//! - **Sentiments over time**: per-day counts per sentiment
//! - **Classifications over time**: per-day counts per classification
//!
//! The two time series are taken verbatim when the backend already
//! aggregated them, and derived from the records otherwise.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::{ClassificationRecord, DashboardPayload, DateBucketMap, NO_TOPIC};

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// A label and how many records carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Everything the dashboard renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardViews {
    pub total_records: usize,
    /// In first-occurrence order.
    pub classification_counts: Vec<LabelCount>,
    /// Count descending; ties in first-occurrence order.
    pub topic_counts: Vec<LabelCount>,
    pub sentiments_over_time: DateBucketMap,
    pub classifications_over_time: DateBucketMap,
}

impl DashboardViews {
    /// True when there is nothing to chart.
    pub fn is_empty(&self) -> bool {
        self.total_records == 0
    }
}

/// One line of a time-series chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesData {
    pub label: String,
    pub data: Vec<u64>,
}

/// Chart-ready form of a [`DateBucketMap`]: ascending date labels and one
/// aligned dataset per requested label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub datasets: Vec<SeriesData>,
}

impl ChartSeries {
    /// Missing (date, label) cells read as 0. Labels present in the map but
    /// not requested are not charted.
    pub fn from_buckets(buckets: &DateBucketMap, labels: &[&str]) -> Self {
        let dates: Vec<String> = buckets.keys().cloned().collect();
        let datasets = labels
            .iter()
            .map(|label| SeriesData {
                label: label.to_string(),
                data: buckets
                    .values()
                    .map(|cells| cells.get(*label).copied().unwrap_or(0))
                    .collect(),
            })
            .collect();

        Self {
            labels: dates,
            datasets,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Derive all four views from a dashboard payload.
///
/// An empty `all_data` yields empty views even if the payload carries
/// series: there is nothing to chart.
pub fn build_views(payload: &DashboardPayload) -> DashboardViews {
    let records = &payload.all_data;
    if records.is_empty() {
        log::info!("no history to aggregate");
        return DashboardViews::default();
    }

    let sentiments_over_time = match &payload.sentiments_over_time {
        Some(series) => series.clone(),
        None => sentiments_over_time(records),
    };
    let classifications_over_time = match &payload.classifications_over_time {
        Some(series) => series.clone(),
        None => classifications_over_time(records),
    };

    DashboardViews {
        total_records: records.len(),
        classification_counts: classification_counts(records),
        topic_counts: topic_counts(records),
        sentiments_over_time,
        classifications_over_time,
    }
}

/// Records per resolved classification ("Desconhecido" when missing).
pub fn classification_counts(records: &[ClassificationRecord]) -> Vec<LabelCount> {
    tally(records.iter().map(|r| r.classification_label()))
}

/// Records per key topic, excluding the "N/A" sentinel.
///
/// Sorted by count descending. The sort is stable, so equal counts keep the
/// order in which their topic first appeared.
pub fn topic_counts(records: &[ClassificationRecord]) -> Vec<LabelCount> {
    let mut counts = tally(
        records
            .iter()
            .map(|r| r.topic_label())
            .filter(|topic| *topic != NO_TOPIC),
    );
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Per-day sentiment counts ("Neutro" when missing).
pub fn sentiments_over_time(records: &[ClassificationRecord]) -> DateBucketMap {
    bucket_by_day(records, ClassificationRecord::sentiment_label)
}

/// Per-day classification counts ("Desconhecido" when missing).
pub fn classifications_over_time(records: &[ClassificationRecord]) -> DateBucketMap {
    bucket_by_day(records, ClassificationRecord::classification_label)
}

/// Group records by UTC day and label.
///
/// Records without a parseable `created_at` are left out of the series;
/// they still count everywhere else.
fn bucket_by_day(
    records: &[ClassificationRecord],
    label_of: impl Fn(&ClassificationRecord) -> &str,
) -> DateBucketMap {
    let mut buckets = DateBucketMap::new();
    let mut undated = 0usize;

    for record in records {
        let Some(day) = record.day_bucket() else {
            undated += 1;
            continue;
        };

        *buckets
            .entry(day.format("%Y-%m-%d").to_string())
            .or_default()
            .entry(label_of(record).to_string())
            .or_default() += 1;
    }

    if undated > 0 {
        log::debug!("{undated} record(s) without a usable created_at left out of the series");
    }

    buckets
}

/// Count labels, preserving first-occurrence order.
fn tally<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<LabelCount> {
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<LabelCount> = Vec::new();

    for label in labels {
        match index.get(label) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(label, counts.len());
                counts.push(LabelCount {
                    label: label.to_string(),
                    count: 1,
                });
            }
        }
    }

    counts
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn rec(
        classification: &str,
        topic: &str,
        sentiment: &str,
        created_at: &str,
    ) -> ClassificationRecord {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        ClassificationRecord {
            classification: opt(classification),
            key_topic: opt(topic),
            sentiment: opt(sentiment),
            created_at: opt(created_at),
            ..Default::default()
        }
    }

    fn sample_records() -> Vec<ClassificationRecord> {
        vec![
            rec("Produtivo", "Pagamento", "Negativo", "2024-03-05T09:00:00Z"),
            rec("Improdutivo", "Felicitação", "Positivo", "2024-03-05T23:59:00Z"),
            rec("Produtivo", "Pagamento", "", "2024-03-06 08:00:00"),
            rec("", "N/A", "Neutro", "ontem"),
            rec("Produtivo", "", "Positivo", ""),
        ]
    }

    #[test]
    fn classification_counts_cover_every_record() {
        let records = sample_records();
        let counts = classification_counts(&records);

        let total: usize = counts.iter().map(|c| c.count).sum();
        assert_eq!(total, records.len());
        assert_eq!(
            counts,
            vec![
                LabelCount { label: "Produtivo".into(), count: 3 },
                LabelCount { label: "Improdutivo".into(), count: 1 },
                LabelCount { label: "Desconhecido".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn topic_counts_exclude_sentinel_and_missing() {
        let counts = topic_counts(&sample_records());
        assert_eq!(
            counts,
            vec![
                LabelCount { label: "Pagamento".into(), count: 2 },
                LabelCount { label: "Felicitação".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn topic_ties_keep_first_occurrence_order() {
        let records: Vec<_> = ["B", "A", "C", "A", "B", "A", "B"]
            .iter()
            .map(|t| rec("Produtivo", t, "", ""))
            .collect();
        let labels: Vec<_> = topic_counts(&records)
            .into_iter()
            .map(|c| (c.label, c.count))
            .collect();
        assert_eq!(
            labels,
            vec![("B".to_string(), 3), ("A".to_string(), 3), ("C".to_string(), 1)]
        );
    }

    #[test]
    fn derived_sentiment_series() {
        let series = sentiments_over_time(&sample_records());

        let mut expected = DateBucketMap::new();
        expected.insert(
            "2024-03-05".into(),
            BTreeMap::from([("Negativo".into(), 1), ("Positivo".into(), 1)]),
        );
        expected.insert("2024-03-06".into(), BTreeMap::from([("Neutro".into(), 1)]));
        assert_eq!(series, expected);
    }

    #[test]
    fn derived_classification_series_skips_undated() {
        let series = classifications_over_time(&sample_records());
        assert_eq!(series.len(), 2);
        assert_eq!(series["2024-03-05"]["Produtivo"], 1);
        assert_eq!(series["2024-03-05"]["Improdutivo"], 1);
        assert_eq!(series["2024-03-06"]["Produtivo"], 1);
        let dated: u64 = series.values().flat_map(|cells| cells.values()).sum();
        assert_eq!(dated, 3);
    }

    #[test]
    fn supplied_series_pass_through() {
        let mut supplied = DateBucketMap::new();
        supplied.insert("2025-01-01".into(), BTreeMap::from([("Positivo".into(), 42)]));

        let payload = DashboardPayload {
            all_data: sample_records(),
            sentiments_over_time: Some(supplied.clone()),
            classifications_over_time: None,
        };
        let views = build_views(&payload);

        assert_eq!(views.sentiments_over_time, supplied);
        assert_eq!(views.classifications_over_time.len(), 2);
        assert_eq!(views.total_records, 5);
    }

    #[test]
    fn empty_payload_yields_empty_views() {
        let mut supplied = DateBucketMap::new();
        supplied.insert("2025-01-01".into(), BTreeMap::from([("Positivo".into(), 1)]));
        let payload = DashboardPayload {
            all_data: Vec::new(),
            sentiments_over_time: Some(supplied),
            classifications_over_time: None,
        };

        let views = build_views(&payload);
        assert!(views.is_empty());
        assert_eq!(views, DashboardViews::default());
    }

    #[test]
    fn chart_series_fill_missing_cells_with_zero() {
        let mut buckets = DateBucketMap::new();
        buckets.insert("2024-03-06".into(), BTreeMap::from([("Produtivo".into(), 2)]));
        buckets.insert(
            "2024-03-05".into(),
            BTreeMap::from([("Improdutivo".into(), 1), ("Desconhecido".into(), 4)]),
        );

        let chart = ChartSeries::from_buckets(&buckets, &["Produtivo", "Improdutivo"]);
        assert_eq!(chart.labels, vec!["2024-03-05", "2024-03-06"]);
        assert_eq!(chart.datasets[0].data, vec![0, 2]);
        assert_eq!(chart.datasets[1].data, vec![1, 0]);
    }
}
