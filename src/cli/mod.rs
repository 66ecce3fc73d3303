//! CLI command implementations for mailtriage.
//!
//! Provides subcommand handlers for:
//! - `mailtriage classify`: submit text or files for classification
//! - `mailtriage history`: list recent classifications
//! - `mailtriage dashboard`: aggregated views, optionally as an HTML page
//! - `mailtriage env`: show the resolved deployment and history store
//! - `mailtriage web`: serve the dashboard locally
//! - `mailtriage config show|init`: configuration management

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use crate::aggregate::{self, ChartSeries, DashboardViews};
use crate::config::{self, TriageConfig};
use crate::context::AppContext;
use crate::logging::ActivityLog;
use crate::model::{CLASSIFICATION_LABELS, ClassificationRecord, ClassifyResult, SENTIMENT_LABELS};
use crate::render::{html, terminal};
use crate::store::{self, HistoryStore};
use crate::submit::{FlowState, SubmissionFlow, SubmissionInput, SubmissionView};
use crate::web;

/// Rows shown by `mailtriage history` in table format.
const HISTORY_TABLE_ROWS: usize = 50;

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// mailtriage classify
// ---------------------------------------------------------------------------

/// Terminal rendition of the submission view: results on stdout, loading
/// indicator and errors on stderr.
#[derive(Debug, Default)]
pub struct TerminalView {
    loading: bool,
    failed: bool,
}

impl TerminalView {
    pub fn failed(&self) -> bool {
        self.failed
    }
}

impl SubmissionView for TerminalView {
    fn hide_results(&mut self) {}

    fn clear_error(&mut self) {
        self.failed = false;
    }

    fn show_loading(&mut self) {
        self.loading = true;
        eprint!("{}", "Analisando e-mail...".dimmed());
        let _ = std::io::stderr().flush();
    }

    fn hide_loading(&mut self) {
        if self.loading {
            self.loading = false;
            eprint!("\r\x1b[2K");
        }
    }

    fn show_error(&mut self, message: &str) {
        self.failed = true;
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }

    fn show_results(&mut self, results: &[ClassifyResult]) {
        print!("{}", terminal::results(results));
    }

    fn show_history(&mut self, records: &[ClassificationRecord]) {
        println!(
            "{}",
            format!("Histórico: {} análise(s) registrada(s).", records.len()).dimmed()
        );
    }

    fn on_state(&mut self, state: FlowState) {
        log::trace!("submission state: {state:?}");
    }
}

/// Submit pasted text or files and print the results.
pub fn run_classify(config: TriageConfig, text: Option<String>, files: Vec<PathBuf>) -> Result<()> {
    let (ctx, client) = AppContext::initialize(config);
    let store = store::for_context(&ctx, client.clone())?;

    let prepared = SubmissionInput::from_cli(text.as_deref(), &files);
    let mut flow = SubmissionFlow::new(&ctx, &client, store.as_ref(), TerminalView::default());

    if flow.submit_prepared(prepared).is_err() {
        // The view already printed the error.
        std::process::exit(1);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// mailtriage history
// ---------------------------------------------------------------------------

/// List the active store's history.
pub fn run_history(config: TriageConfig, format: OutputFormat) -> Result<()> {
    let store = open_store(config)?;
    let records = store.load();

    match format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&records).context("failed to serialize history")?;
            println!("{json}");
        }
        OutputFormat::Csv => print!("{}", history_csv(&records)?),
        OutputFormat::Table => print!("{}", terminal::history(&records, HISTORY_TABLE_ROWS)),
    }

    Ok(())
}

const HISTORY_CSV_HEADER: [&str; 8] = [
    "created_at",
    "classification",
    "confidence_score",
    "key_topic",
    "sentiment",
    "source_filename",
    "email_content",
    "suggested_response",
];

/// History as CSV, one row per record.
pub fn history_csv(records: &[ClassificationRecord]) -> Result<String> {
    let mut writer = csv_writer();
    writer.write_record(HISTORY_CSV_HEADER)?;
    for r in records {
        let confidence = r.confidence_score.map(|c| format!("{c:.2}")).unwrap_or_default();
        writer.write_record([
            r.created_at.as_deref().unwrap_or_default(),
            r.classification.as_deref().unwrap_or_default(),
            confidence.as_str(),
            r.key_topic.as_deref().unwrap_or_default(),
            r.sentiment.as_deref().unwrap_or_default(),
            r.source_filename.as_deref().unwrap_or_default(),
            r.email_content.as_deref().unwrap_or_default(),
            r.suggested_response.as_deref().unwrap_or_default(),
        ])?;
    }
    finish_csv(writer)
}

// ---------------------------------------------------------------------------
// mailtriage dashboard
// ---------------------------------------------------------------------------

/// Show the aggregated dashboard views, optionally writing the HTML page.
pub fn run_dashboard(
    config: TriageConfig,
    format: OutputFormat,
    html_path: Option<&Path>,
) -> Result<()> {
    let store = open_store(config)?;
    let payload = store.dashboard()?;
    let views = aggregate::build_views(&payload);

    if let Some(path) = html_path {
        fs::write(path, html::dashboard_page(&views))
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("{} Dashboard written to {}", "✓".green().bold(), path.display());
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&views).context("failed to serialize dashboard")?;
            println!("{json}");
        }
        OutputFormat::Csv => print!("{}", dashboard_csv(&views)?),
        OutputFormat::Table => print!("{}", terminal::dashboard(&views)),
    }

    Ok(())
}

/// Dashboard views as long-form CSV: `view,date,label,count`.
pub fn dashboard_csv(views: &DashboardViews) -> Result<String> {
    let mut writer = csv_writer();
    writer.write_record(["view", "date", "label", "count"])?;
    let counts = [
        ("classification", &views.classification_counts),
        ("topic", &views.topic_counts),
    ];
    for (name, entries) in counts {
        for entry in entries {
            let count = entry.count.to_string();
            writer.write_record([name, "", entry.label.as_str(), count.as_str()])?;
        }
    }

    let series = [
        ("sentiment", &views.sentiments_over_time, &SENTIMENT_LABELS[..]),
        (
            "classification_trend",
            &views.classifications_over_time,
            &CLASSIFICATION_LABELS[..],
        ),
    ];
    for (name, buckets, labels) in series {
        let chart = ChartSeries::from_buckets(buckets, labels);
        for (row, date) in chart.labels.iter().enumerate() {
            for dataset in &chart.datasets {
                let count = dataset.data[row].to_string();
                writer.write_record([name, date.as_str(), dataset.label.as_str(), count.as_str()])?;
            }
        }
    }
    finish_csv(writer)
}

// ---------------------------------------------------------------------------
// mailtriage env
// ---------------------------------------------------------------------------

/// Show the resolved deployment, history store and file locations.
pub fn run_env(config: TriageConfig) -> Result<()> {
    println!("{}", "mailtriage Environment".bold().cyan());
    println!("{}", "=".repeat(40));

    let mode = config.environment.deployment;
    let local_history = config::local_history_path(&config);
    let activity = ActivityLog::from_config(&config);
    let (ctx, client) = AppContext::initialize(config);

    print_env_item("Backend", true, client.base_url());
    print_env_item("Deployment mode", true, &mode.to_string());
    print_env_item("Deployment", true, &ctx.deployment.to_string());

    let store = store::for_context(&ctx, client)?;
    let history_detail = if ctx.deployment.is_serverless() {
        local_history
            .map(|p| format!("local ({})", p.display()))
            .unwrap_or_else(|| "local (no home directory)".to_string())
    } else {
        "remote (backend database)".to_string()
    };
    print_env_item("History store", true, &history_detail);
    print_env_item("History entries", true, &store.load().len().to_string());

    match activity {
        Some(log) => print_env_item("Activity log", true, &log.path().display().to_string()),
        None => print_env_item("Activity log", false, "disabled"),
    }

    let global_exists = config::global_config_file().is_some_and(|p| p.exists());
    print_env_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.mailtriage/config.toml found"
        } else {
            "not found (run `mailtriage config init` to create)"
        },
    );

    Ok(())
}

fn print_env_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<20} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// mailtriage web
// ---------------------------------------------------------------------------

/// Serve the dashboard until interrupted.
pub fn run_web(config: TriageConfig, addr: Option<String>) -> Result<()> {
    let addr = addr.unwrap_or_else(|| config.web.addr.clone());
    let store = open_store(config)?;
    web::serve(&addr, store.as_ref())
}

// ---------------------------------------------------------------------------
// mailtriage config show | init
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show(config: &TriageConfig) -> Result<()> {
    let toml_str = config::show_effective_config(config)?;
    println!("{}", "Effective mailtriage Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file().is_some_and(|p| p.exists());
    let project_exists = config::project_config_file().is_some_and(|p| p.exists());
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source(global_exists, "~/.mailtriage/config.toml");
    print_source(project_exists, ".mailtriage.toml");
    println!(
        "  {} {}",
        "·".dimmed(),
        "MAILTRIAGE_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(exists: bool, name: &str) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.mailtriage/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!(
        "  {}",
        "Edit the file to point mailtriage at your backend.".dimmed()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn open_store(config: TriageConfig) -> Result<Box<dyn HistoryStore>> {
    let (ctx, client) = AppContext::initialize(config);
    store::for_context(&ctx, client)
}

fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| e.into_error())
        .context("failed to flush CSV output")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DashboardPayload;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(
            OutputFormat::from_str_opt(Some("unknown")),
            OutputFormat::Table
        );
    }

    #[test]
    fn test_history_csv_quotes_embedded_delimiters() {
        let content = "Diz \"olá\", por favor\nlinha 2";
        let exported = history_csv(&[ClassificationRecord {
            email_content: Some(content.into()),
            key_topic: Some("Suporte".into()),
            ..Default::default()
        }])
        .unwrap();
        assert!(exported.contains("\"Diz \"\"olá\"\", por favor\nlinha 2\""));

        let mut reader = csv::Reader::from_reader(exported.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][3], "Suporte");
        assert_eq!(&rows[0][6], content);
    }

    #[test]
    fn test_history_csv() {
        let csv = history_csv(&[ClassificationRecord {
            classification: Some("Produtivo".into()),
            confidence_score: Some(0.9),
            email_content: Some("Olá, tudo bem?".into()),
            ..Default::default()
        }])
        .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("created_at,classification"));
        assert_eq!(lines[1], ",Produtivo,0.90,,,,\"Olá, tudo bem?\",");
    }

    #[test]
    fn test_dashboard_csv() {
        let views = aggregate::build_views(&DashboardPayload::raw(vec![ClassificationRecord {
            classification: Some("Produtivo".into()),
            sentiment: Some("Positivo".into()),
            key_topic: Some("Suporte".into()),
            created_at: Some("2024-03-05T10:00:00Z".into()),
            ..Default::default()
        }]));
        let csv = dashboard_csv(&views).unwrap();
        assert!(csv.contains("classification,,Produtivo,1\n"));
        assert!(csv.contains("topic,,Suporte,1\n"));
        assert!(csv.contains("sentiment,2024-03-05,Positivo,1\n"));
        assert!(csv.contains("sentiment,2024-03-05,Negativo,0\n"));
        assert!(csv.contains("classification_trend,2024-03-05,Produtivo,1\n"));
    }

    #[test]
    fn test_terminal_view_tracks_failure() {
        let mut view = TerminalView::default();
        view.show_error("Ocorreu um erro no servidor.");
        assert!(view.failed());
        view.clear_error();
        assert!(!view.failed());
    }
}
