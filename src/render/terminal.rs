//! Colored terminal output for the CLI.
//!
//! Functions build strings instead of printing so the CLI decides where the
//! text goes.

use std::fmt::Write;

use colored::{ColoredString, Colorize};

use super::{
    EMPTY_DASHBOARD_MESSAGE, EMPTY_HISTORY_MESSAGE, EMPTY_RESULTS_MESSAGE, EMPTY_TOPICS_MESSAGE,
    MISSING_VALUE, NO_RESPONSE_LABEL, NO_SUBJECT_LABEL, PASTED_TEXT_LABEL, format_confidence,
    format_timestamp,
};
use crate::aggregate::{ChartSeries, DashboardViews};
use crate::model::{
    CLASSIFICATION_LABELS, ClassificationRecord, ClassifyResult, DateBucketMap, SENTIMENT_LABELS,
};

/// Color a classification or sentiment label by its meaning.
pub fn colorize_label(label: &str) -> ColoredString {
    match label {
        "Produtivo" | "Positivo" => label.green(),
        "Improdutivo" | "Negativo" => label.red(),
        "Neutro" => label.dimmed(),
        _ => label.yellow(),
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

pub fn results(items: &[ClassifyResult]) -> String {
    let mut out = String::new();
    if items.is_empty() {
        let _ = writeln!(out, "{}", EMPTY_RESULTS_MESSAGE.red());
        return out;
    }

    let _ = writeln!(out, "{}", "Resultados da Análise".bold().cyan());
    let _ = writeln!(out, "{}", "=".repeat(50));

    for (index, item) in items.iter().enumerate() {
        if let Some(error) = &item.error {
            let _ = writeln!(out, "  {} {}", "Erro de Processamento:".red().bold(), error);
            let _ = writeln!(out);
            continue;
        }
        if item.is_error() {
            let _ = writeln!(
                out,
                "  {}",
                format!(
                    "A IA retornou uma resposta em um formato inesperado para o item {}.",
                    index + 1
                )
                .red()
            );
            let _ = writeln!(out);
            continue;
        }

        let classification = item.classification.as_deref().unwrap_or(MISSING_VALUE);
        let sentiment = item.sentiment.as_deref().unwrap_or(MISSING_VALUE);
        let response = item
            .suggested_response
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or(NO_RESPONSE_LABEL);

        let _ = writeln!(
            out,
            "  {} {}",
            "Item Analisado:".bold(),
            item.source_filename.as_deref().unwrap_or(PASTED_TEXT_LABEL)
        );
        let _ = writeln!(out, "    {:<20} {}", "Classificação", colorize_label(classification));
        let _ = writeln!(
            out,
            "    {:<20} {}",
            "Nível de Confiança",
            format_confidence(item.confidence_score)
        );
        let _ = writeln!(
            out,
            "    {:<20} {}",
            "Tópico Chave",
            item.key_topic.as_deref().unwrap_or(MISSING_VALUE)
        );
        let _ = writeln!(out, "    {:<20} {}", "Sentimento", colorize_label(sentiment));
        let _ = writeln!(out, "    {}", "Resposta Sugerida:".bold());
        for line in response.lines() {
            let _ = writeln!(out, "      {line}");
        }
        let _ = writeln!(out);
    }

    out
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// History table, at most `limit` rows.
pub fn history(records: &[ClassificationRecord], limit: usize) -> String {
    let mut out = String::new();
    if records.is_empty() {
        let _ = writeln!(out, "{}", EMPTY_HISTORY_MESSAGE.yellow());
        return out;
    }

    let _ = writeln!(out, "{}", "Histórico de Análises".bold().cyan());
    let _ = writeln!(out, "{}", "=".repeat(72));
    let _ = writeln!(out, "  {:<22} {:<14} Assunto", "Data", "Classificação");
    let _ = writeln!(out, "  {}", "-".repeat(70));

    for (i, record) in records.iter().take(limit).enumerate() {
        let date = record
            .created_at
            .as_deref()
            .map(format_timestamp)
            .unwrap_or_default();
        let classification = record.classification_label();
        let topic = record
            .key_topic
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(NO_SUBJECT_LABEL);

        // Pad before coloring so ANSI codes don't skew the columns.
        let line = format!(
            "  {:<22} {} {}",
            truncate(&date, 22),
            colorize_label(&format!("{:<14}", truncate(classification, 14))),
            truncate(topic, 32),
        );
        if i % 2 == 0 {
            let _ = writeln!(out, "{line}");
        } else {
            let _ = writeln!(out, "{}", line.dimmed());
        }
    }

    if records.len() > limit {
        let _ = writeln!(
            out,
            "  {}",
            format!("… e mais {} análise(s)", records.len() - limit).dimmed()
        );
    }

    out
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

pub fn dashboard(views: &DashboardViews) -> String {
    let mut out = String::new();
    if views.is_empty() {
        let _ = writeln!(out, "{}", EMPTY_DASHBOARD_MESSAGE.yellow());
        return out;
    }

    let _ = writeln!(out, "{}", "Dashboard de Classificação".bold().cyan());
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out, "  {} {}", "E-mails analisados:".bold(), views.total_records);
    let _ = writeln!(out);

    let _ = writeln!(out, "{}", "Classificações".bold().cyan());
    for entry in &views.classification_counts {
        let pct = entry.count as f64 / views.total_records as f64 * 100.0;
        let _ = writeln!(
            out,
            "  {} {:>6} ({:.0}%)",
            colorize_label(&format!("{:<20}", truncate(&entry.label, 20))),
            entry.count,
            pct
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "{}", "Tópicos Frequentes".bold().cyan());
    if views.topic_counts.is_empty() {
        let _ = writeln!(out, "  {}", EMPTY_TOPICS_MESSAGE.dimmed());
    }
    for entry in views.topic_counts.iter().take(15) {
        let _ = writeln!(out, "  {:<40} {:>6}", truncate(&entry.label, 40), entry.count);
    }
    let _ = writeln!(out);

    write_series(
        &mut out,
        "Sentimento ao Longo do Tempo",
        &views.sentiments_over_time,
        &SENTIMENT_LABELS,
    );
    write_series(
        &mut out,
        "Classificações ao Longo do Tempo",
        &views.classifications_over_time,
        &CLASSIFICATION_LABELS,
    );

    out
}

fn write_series(out: &mut String, title: &str, buckets: &DateBucketMap, labels: &[&str]) {
    let _ = writeln!(out, "{}", title.bold().cyan());
    if buckets.is_empty() {
        let _ = writeln!(out, "  {}", "sem datas válidas".dimmed());
        let _ = writeln!(out);
        return;
    }

    let chart = ChartSeries::from_buckets(buckets, labels);
    let mut header = format!("  {:<12}", "Data");
    for label in labels {
        let _ = write!(header, " {label:>12}");
    }
    let _ = writeln!(out, "{header}");
    let _ = writeln!(out, "  {}", "-".repeat(12 + 13 * labels.len()));

    for (row, date) in chart.labels.iter().enumerate() {
        let mut line = format!("  {date:<12}");
        for dataset in &chart.datasets {
            let _ = write!(line, " {:>12}", dataset.data[row]);
        }
        let _ = writeln!(out, "{line}");
    }
    let _ = writeln!(out);
}

/// Truncate to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::build_views;
    use crate::model::DashboardPayload;

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("ação", 4), "ação");
        assert_eq!(truncate("solicitação", 5), "soli…");
    }

    #[test]
    fn results_show_card_fields() {
        let text = results(&[ClassifyResult {
            classification: Some("Produtivo".to_string()),
            confidence_score: Some(0.9),
            key_topic: Some("Greeting".to_string()),
            sentiment: Some("Positivo".to_string()),
            suggested_response: Some("Hi!".to_string()),
            ..Default::default()
        }]);
        assert!(text.contains("Texto Colado"));
        assert!(text.contains("Produtivo"));
        assert!(text.contains("90%"));
        assert!(text.contains("Greeting"));
        assert!(text.contains("Hi!"));
    }

    #[test]
    fn history_limits_rows() {
        let records: Vec<_> = (0..5)
            .map(|i| ClassificationRecord {
                classification: Some("Produtivo".to_string()),
                key_topic: Some(format!("Tópico {i}")),
                ..Default::default()
            })
            .collect();
        let text = history(&records, 3);
        assert!(text.contains("Tópico 2"));
        assert!(!text.contains("Tópico 3"));
        assert!(text.contains("mais 2 análise(s)"));
    }

    #[test]
    fn dashboard_lists_series_rows() {
        let payload = DashboardPayload::raw(vec![
            ClassificationRecord {
                classification: Some("Produtivo".to_string()),
                sentiment: Some("Positivo".to_string()),
                key_topic: Some("Pagamento".to_string()),
                created_at: Some("2024-03-05T10:00:00Z".to_string()),
                ..Default::default()
            },
        ]);
        let text = dashboard(&build_views(&payload));
        assert!(text.contains("Pagamento"));
        assert!(text.contains("2024-03-05"));
    }

    #[test]
    fn empty_dashboard_prints_notice() {
        assert!(dashboard(&DashboardViews::default()).contains(EMPTY_DASHBOARD_MESSAGE));
    }
}
