//! Presentation layer.
//!
//! [`html`] produces the markup served by `mailtriage web` and written by
//! `mailtriage dashboard --html`; [`terminal`] produces the colored text the
//! CLI prints. Both share the display defaults defined here.

pub mod html;
pub mod terminal;

use chrono::{DateTime, Local, NaiveDateTime};

/// Source label for pasted text.
pub const PASTED_TEXT_LABEL: &str = "Texto Colado";

/// Shown when a result has no suggested response.
pub const NO_RESPONSE_LABEL: &str = "Nenhuma resposta necessária.";

/// Shown for history entries without a key topic.
pub const NO_SUBJECT_LABEL: &str = "Assunto não identificado";

pub const EMPTY_HISTORY_MESSAGE: &str = "Nenhuma análise foi feita ainda.";
pub const EMPTY_TOPICS_MESSAGE: &str = "Nenhum tópico chave identificado ainda.";
pub const EMPTY_RESULTS_MESSAGE: &str = "A IA não retornou resultados válidos.";
pub const EMPTY_DASHBOARD_MESSAGE: &str = "Nenhum dado de histórico para exibir.";

/// Placeholder for missing result fields.
pub const MISSING_VALUE: &str = "N/A";

/// Pie-chart colors, assigned to classifications by position.
pub const CLASSIFICATION_PALETTE: [&str; 4] = ["#10b981", "#6b7280", "#ef4444", "#f59e0b"];

/// Line color for a known series label. Unknown labels fall outside the
/// palette and get a neutral gray.
pub fn series_color(label: &str) -> &'static str {
    match label {
        "Positivo" => "#10b981",
        "Negativo" => "#ef4444",
        "Neutro" => "#6b7280",
        "Produtivo" => "#3b82f6",
        "Improdutivo" => "#f97316",
        _ => "#9ca3af",
    }
}

/// Confidence as a whole percentage (`0.9` → `"90%"`).
pub fn format_confidence(score: Option<f64>) -> String {
    match score {
        Some(score) if score.is_finite() => format!("{:.0}%", score * 100.0),
        _ => MISSING_VALUE.to_string(),
    }
}

/// Timestamp in Brazilian format (`05/03/2024, 20:59:00`), local time.
///
/// Naive timestamps are shown as written. Unparseable values are returned
/// unchanged.
pub fn format_timestamp(raw: &str) -> String {
    const FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw.trim()) {
        return ts.with_timezone(&Local).format(FORMAT).to_string();
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw.trim(), fmt) {
            return ts.format(FORMAT).to_string();
        }
    }
    raw.to_string()
}

/// CSS class suffix for a classification badge (`category-produtivo`).
pub fn category_class(classification: &str) -> String {
    format!("category-{}", classification.to_lowercase())
}
