//! Wire and storage types shared by the client, the stores and the
//! aggregation engine.
//!
//! Every field is optional on the wire: the backend omits fields on error
//! items, older history rows lack topics and sentiments, and the local
//! history file may have been written by an earlier version. Accessors on
//! [`ClassificationRecord`] resolve the documented defaults.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Classification used when a record carries none.
pub const UNKNOWN_CLASSIFICATION: &str = "Desconhecido";

/// Sentiment used when a record carries none.
pub const NEUTRAL_SENTIMENT: &str = "Neutro";

/// Topic sentinel meaning "no topic identified".
pub const NO_TOPIC: &str = "N/A";

pub const PRODUCTIVE: &str = "Produtivo";
pub const UNPRODUCTIVE: &str = "Improdutivo";

pub const POSITIVE: &str = "Positivo";
pub const NEGATIVE: &str = "Negativo";

/// Classification labels charted on the classification-over-time series.
pub const CLASSIFICATION_LABELS: [&str; 2] = [PRODUCTIVE, UNPRODUCTIVE];

/// Sentiment labels charted on the sentiment-over-time series.
pub const SENTIMENT_LABELS: [&str; 3] = [POSITIVE, NEGATIVE, NEUTRAL_SENTIMENT];

/// Date (`YYYY-MM-DD`) → label → count.
///
/// An ordered map, so date keys always iterate ascending.
pub type DateBucketMap = BTreeMap<String, BTreeMap<String, u64>>;

// ---------------------------------------------------------------------------
// ClassificationRecord
// ---------------------------------------------------------------------------

/// One analyzed email, as returned by `/history`, embedded in
/// `/dashboard/data`, or persisted in the local history file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    /// ISO 8601 timestamp. Only its calendar date is used for aggregation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_content: Option<String>,
    /// Short preview the `/history` endpoint adds next to the full content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_filename: Option<String>,
}

impl ClassificationRecord {
    /// Classification, or [`UNKNOWN_CLASSIFICATION`] when missing or empty.
    pub fn classification_label(&self) -> &str {
        non_empty(self.classification.as_deref()).unwrap_or(UNKNOWN_CLASSIFICATION)
    }

    /// Sentiment, or [`NEUTRAL_SENTIMENT`] when missing or empty.
    pub fn sentiment_label(&self) -> &str {
        non_empty(self.sentiment.as_deref()).unwrap_or(NEUTRAL_SENTIMENT)
    }

    /// Key topic, or [`NO_TOPIC`] when missing or empty.
    pub fn topic_label(&self) -> &str {
        non_empty(self.key_topic.as_deref()).unwrap_or(NO_TOPIC)
    }

    /// Calendar day (UTC) of `created_at`, or `None` when the timestamp is
    /// missing or cannot be parsed.
    pub fn day_bucket(&self) -> Option<NaiveDate> {
        self.created_at.as_deref().and_then(parse_day_bucket)
    }

    /// Build the history entry for a successful single-item submission.
    ///
    /// `submitted_text` is the pasted text, if any; file submissions record
    /// `Arquivo: <name>` as their content.
    pub fn from_submission(
        result: &ClassifyResult,
        submitted_text: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let email_content = match non_empty(submitted_text) {
            Some(text) => text.to_string(),
            None => format!(
                "Arquivo: {}",
                result.source_filename.as_deref().unwrap_or_default()
            ),
        };

        Self {
            classification: result.classification.clone(),
            sentiment: result.sentiment.clone(),
            key_topic: result.key_topic.clone(),
            confidence_score: result.confidence_score,
            created_at: Some(created_at.to_rfc3339()),
            email_content: Some(email_content),
            email_snippet: None,
            suggested_response: result.suggested_response.clone(),
            source_filename: result.source_filename.clone(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Parse an ISO 8601 timestamp into its UTC calendar date.
///
/// Accepts RFC 3339 (offsets converted to UTC), naive date-times with a `T`
/// or space separator (treated as UTC), and bare `YYYY-MM-DD` dates.
pub fn parse_day_bucket(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc).date_naive());
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts.date());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

// ---------------------------------------------------------------------------
// /classify response
// ---------------------------------------------------------------------------

/// One item of a `/classify` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifyResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_filename: Option<String>,
    /// Per-item processing error reported inside an otherwise successful batch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClassifyResult {
    /// An item is an error item when it carries `error` or has no
    /// classification at all.
    pub fn is_error(&self) -> bool {
        self.error.is_some() || non_empty(self.classification.as_deref()).is_none()
    }
}

/// Body of a successful `/classify` response: one result, or one per file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassifyResponse {
    Batch(Vec<ClassifyResult>),
    Single(ClassifyResult),
}

impl ClassifyResponse {
    /// All items, in response order.
    pub fn items(&self) -> &[ClassifyResult] {
        match self {
            Self::Batch(items) => items,
            Self::Single(item) => std::slice::from_ref(item),
        }
    }

    /// The result when the backend answered with a single, non-error object.
    ///
    /// Batches are never recorded in the local history, even with one item.
    pub fn single_success(&self) -> Option<&ClassifyResult> {
        match self {
            Self::Single(item) if !item.is_error() => Some(item),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// /dashboard/data
// ---------------------------------------------------------------------------

/// Input of the aggregation engine.
///
/// Server-backed deployments return both series pre-aggregated; the local
/// store only ever produces the raw form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardPayload {
    #[serde(default)]
    pub all_data: Vec<ClassificationRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiments_over_time: Option<DateBucketMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifications_over_time: Option<DateBucketMap>,
}

impl DashboardPayload {
    /// Raw payload without any pre-aggregated series.
    pub fn raw(all_data: Vec<ClassificationRecord>) -> Self {
        Self {
            all_data,
            sentiments_over_time: None,
            classifications_over_time: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
