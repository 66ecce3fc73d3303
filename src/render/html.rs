//! HTML markup for results, history and the dashboard.
//!
//! Every interpolated value goes through [`escape`]. Pages are
//! self-contained apart from Chart.js, which the dashboard loads from a CDN.

use std::fmt::Write;

use serde_json::json;

use super::{
    CLASSIFICATION_PALETTE, EMPTY_DASHBOARD_MESSAGE, EMPTY_HISTORY_MESSAGE, EMPTY_RESULTS_MESSAGE,
    EMPTY_TOPICS_MESSAGE, MISSING_VALUE, NO_RESPONSE_LABEL, NO_SUBJECT_LABEL, PASTED_TEXT_LABEL,
    category_class, format_confidence, format_timestamp, series_color,
};
use crate::aggregate::{ChartSeries, DashboardViews, LabelCount};
use crate::model::{
    CLASSIFICATION_LABELS, ClassificationRecord, ClassifyResult, DateBucketMap, SENTIMENT_LABELS,
};

/// Escape text for use in element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape, then keep line breaks visible.
fn escape_multiline(text: &str) -> String {
    escape(text).replace('\n', "<br>")
}

fn error_block(message: &str) -> String {
    format!("<div class=\"error-message\">{message}</div>")
}

// ---------------------------------------------------------------------------
// Classification results
// ---------------------------------------------------------------------------

/// Markup for a `/classify` response: one card per item.
///
/// Error items become inline error blocks; the rest of the batch still
/// renders.
pub fn results(items: &[ClassifyResult]) -> String {
    if items.is_empty() {
        return error_block(EMPTY_RESULTS_MESSAGE);
    }

    let mut out = String::from("<h2>Resultados da Análise</h2>\n");
    for (index, item) in items.iter().enumerate() {
        out.push_str(&result_item(index, item));
        out.push('\n');
    }
    out
}

fn result_item(index: usize, item: &ClassifyResult) -> String {
    if let Some(error) = &item.error {
        return error_block(&format!(
            "<strong>Erro de Processamento:</strong> {}",
            escape(error)
        ));
    }
    if item.is_error() {
        return error_block(&format!(
            "A IA retornou uma resposta em um formato inesperado para o item {}.",
            index + 1
        ));
    }

    let classification = item.classification.as_deref().unwrap_or(MISSING_VALUE);
    let source = item.source_filename.as_deref().unwrap_or(PASTED_TEXT_LABEL);
    let response = item
        .suggested_response
        .as_deref()
        .filter(|r| !r.is_empty())
        .unwrap_or(NO_RESPONSE_LABEL);

    let mut out = String::new();
    let _ = writeln!(out, "<div class=\"analysis-result-card\">");
    let _ = writeln!(
        out,
        "  <h3 class=\"analysis-result-title\">Item Analisado: {}</h3>",
        escape(source)
    );
    let _ = writeln!(out, "  <div class=\"results-grid\">");
    let _ = writeln!(
        out,
        "    <div class=\"result-item\"><strong>Classificação</strong><span class=\"history-category {}\">{}</span></div>",
        escape(&category_class(classification)),
        escape(classification)
    );
    for (label, value) in [
        ("Nível de Confiança", format_confidence(item.confidence_score)),
        ("Tópico Chave", display_or_missing(item.key_topic.as_deref())),
        ("Sentimento", display_or_missing(item.sentiment.as_deref())),
    ] {
        let _ = writeln!(
            out,
            "    <div class=\"result-item\"><strong>{label}</strong><span>{}</span></div>",
            escape(&value)
        );
    }
    let _ = writeln!(out, "  </div>");
    let _ = writeln!(out, "  <div class=\"result-item-response\">");
    let _ = writeln!(out, "    <strong>Resposta Sugerida:</strong>");
    let _ = writeln!(
        out,
        "    <p class=\"suggested-response-text\">{}</p>",
        escape_multiline(response)
    );
    let _ = writeln!(out, "  </div>");
    let _ = write!(out, "</div>");
    out
}

fn display_or_missing(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(MISSING_VALUE)
        .to_string()
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Markup for the history list, most recent first.
pub fn history(records: &[ClassificationRecord]) -> String {
    if records.is_empty() {
        return format!("<p>{EMPTY_HISTORY_MESSAGE}</p>");
    }

    let mut out = String::new();
    for record in records {
        let classification = record.classification_label();
        let topic = record
            .key_topic
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(NO_SUBJECT_LABEL);
        let date = record
            .created_at
            .as_deref()
            .map(format_timestamp)
            .unwrap_or_default();

        let _ = writeln!(out, "<div class=\"history-item\">");
        let _ = writeln!(
            out,
            "  <div class=\"history-header\"><span class=\"history-category {}\">{}</span><span class=\"history-date\">{}</span></div>",
            escape(&category_class(classification)),
            escape(classification),
            escape(&date)
        );
        let _ = writeln!(
            out,
            "  <p class=\"history-content\"><strong>Assunto:</strong> {}</p>",
            escape(topic)
        );
        let _ = writeln!(
            out,
            "  <p class=\"history-content\"><strong>E-mail Analisado:</strong><br>{}</p>",
            escape_multiline(record.email_content.as_deref().unwrap_or_default())
        );
        let _ = writeln!(
            out,
            "  <p class=\"history-content\"><strong>Resposta Sugerida:</strong><br>{}</p>",
            escape_multiline(record.suggested_response.as_deref().unwrap_or_default())
        );
        let _ = writeln!(out, "</div>");
    }
    out
}

/// Standalone history page.
pub fn history_page(records: &[ClassificationRecord]) -> String {
    page(
        "Histórico de Análises",
        &format!("<section id=\"history-list\">\n{}</section>", history(records)),
        "",
    )
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Topic frequency list items.
pub fn topics(topics: &[LabelCount]) -> String {
    if topics.is_empty() {
        return format!("<li>{EMPTY_TOPICS_MESSAGE}</li>");
    }

    topics
        .iter()
        .map(|t| {
            format!(
                "<li><span class=\"topic-name\">{}</span><span class=\"topic-count\">{}</span></li>",
                escape(&t.label),
                t.count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Chart.js inputs for the three charts.
pub fn chart_data(views: &DashboardViews) -> serde_json::Value {
    let series = |buckets: &DateBucketMap, labels: &[&str]| {
        let chart = ChartSeries::from_buckets(buckets, labels);
        json!({
            "labels": chart.labels,
            "datasets": chart.datasets.iter().map(|d| json!({
                "label": d.label,
                "data": d.data,
                "color": series_color(&d.label),
            })).collect::<Vec<_>>(),
        })
    };

    json!({
        "classification": {
            "labels": views.classification_counts.iter().map(|c| &c.label).collect::<Vec<_>>(),
            "data": views.classification_counts.iter().map(|c| c.count).collect::<Vec<_>>(),
            "colors": (0..views.classification_counts.len())
                .map(|i| CLASSIFICATION_PALETTE[i % CLASSIFICATION_PALETTE.len()])
                .collect::<Vec<_>>(),
        },
        "sentiment": series(&views.sentiments_over_time, &SENTIMENT_LABELS),
        "classification_trend": series(&views.classifications_over_time, &CLASSIFICATION_LABELS),
    })
}

/// Full dashboard page. With no records, only a notice is rendered and no
/// chart script is emitted.
pub fn dashboard_page(views: &DashboardViews) -> String {
    if views.is_empty() {
        return page(
            "Dashboard",
            &format!("<p class=\"empty\">{EMPTY_DASHBOARD_MESSAGE}</p>"),
            "",
        );
    }

    let body = format!(
        r#"<p class="summary">{total} e-mails analisados</p>
<div class="grid">
  <section><h2>Classificações</h2><canvas id="classificationChart"></canvas></section>
  <section><h2>Tópicos Frequentes</h2><ul id="topics-list">
{topics}
  </ul></section>
  <section><h2>Sentimento ao Longo do Tempo</h2><canvas id="sentimentOverTimeChart"></canvas></section>
  <section><h2>Classificações ao Longo do Tempo</h2><canvas id="classificationOverTimeChart"></canvas></section>
</div>"#,
        total = views.total_records,
        topics = topics(&views.topic_counts),
    );

    // "</" would close the script element early.
    let data = chart_data(views).to_string().replace("</", "<\\/");
    let script = fill(CHART_SCRIPT, &[("__DASHBOARD_DATA__", data.as_str())]);

    page("Dashboard", &body, &script)
}

fn page(title: &str, body: &str, script: &str) -> String {
    let title = escape(title);
    fill(
        PAGE_TEMPLATE,
        &[
            ("__TITLE__", title.as_str()),
            ("__BODY__", body),
            ("__SCRIPT__", script),
        ],
    )
}

/// Substitute placeholders in a single pass over `template`. Inserted values
/// are never scanned again, so user text containing a placeholder name is
/// kept verbatim.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    loop {
        let next = values
            .iter()
            .filter_map(|&(name, value)| rest.find(name).map(|at| (at, name, value)))
            .min_by_key(|&(at, _, _)| at);
        let Some((at, name, value)) = next else {
            out.push_str(rest);
            return out;
        };
        out.push_str(&rest[..at]);
        out.push_str(value);
        rest = &rest[at + name.len()..];
    }
}

const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>__TITLE__ · mailtriage</title>
<style>
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif; margin: 0; background: #f9fafb; color: #111827; }
main { max-width: 1100px; margin: 0 auto; padding: 24px; }
nav a { margin-right: 16px; color: #2563eb; text-decoration: none; }
.grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(420px, 1fr)); gap: 24px; }
section { background: #fff; border: 1px solid #e5e7eb; border-radius: 8px; padding: 16px; }
#topics-list { list-style: none; padding: 0; }
#topics-list li { display: flex; justify-content: space-between; padding: 6px 0; border-bottom: 1px solid #f3f4f6; }
.topic-count { font-weight: 600; }
.history-item { background: #fff; border: 1px solid #e5e7eb; border-radius: 8px; padding: 12px 16px; margin-bottom: 12px; }
.history-header { display: flex; gap: 12px; align-items: center; }
.history-category { padding: 2px 8px; border-radius: 999px; font-size: 12px; font-weight: 600; background: #e5e7eb; }
.category-produtivo { background: #d1fae5; color: #065f46; }
.category-improdutivo { background: #fee2e2; color: #991b1b; }
.history-date { color: #6b7280; font-size: 13px; }
.error-message { background: #fee2e2; color: #991b1b; padding: 12px; border-radius: 8px; margin-bottom: 16px; }
</style>
</head>
<body>
<main>
<nav><a href="/">Dashboard</a><a href="/history">Histórico</a></nav>
<h1>__TITLE__</h1>
__BODY__
</main>
__SCRIPT__
</body>
</html>
"##;

const CHART_SCRIPT: &str = r##"<script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
<script>
const DATA = __DASHBOARD_DATA__;
function lineChart(id, series) {
  new Chart(document.getElementById(id), {
    type: "line",
    data: {
      labels: series.labels,
      datasets: series.datasets.map((d) => ({
        label: d.label, data: d.data, borderColor: d.color,
        backgroundColor: d.color + "1a", fill: true, tension: 0.3,
      })),
    },
    options: {
      responsive: true,
      scales: {
        x: { title: { display: true, text: "Data" } },
        y: { beginAtZero: true, title: { display: true, text: "Número de E-mails" } },
      },
    },
  });
}
new Chart(document.getElementById("classificationChart"), {
  type: "pie",
  data: {
    labels: DATA.classification.labels,
    datasets: [{ label: "Classificações", data: DATA.classification.data,
                 backgroundColor: DATA.classification.colors, hoverOffset: 4 }],
  },
  options: { responsive: true, plugins: { legend: { position: "top" } } },
});
lineChart("sentimentOverTimeChart", DATA.sentiment);
lineChart("classificationOverTimeChart", DATA.classification_trend);
</script>"##;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
