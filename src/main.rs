use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use mailtriage::{cli, config, logging};

#[derive(Debug, Parser)]
#[command(name = "mailtriage")]
#[command(about = "Classify emails and browse the classification history")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Submit email text or files for classification
    Classify {
        /// Email text to classify
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,
        /// Email file(s) to upload (.txt, .pdf); repeatable
        #[arg(long, num_args = 1..)]
        file: Vec<PathBuf>,
    },
    /// List the classification history
    History {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show classification distribution, topics and trends
    Dashboard {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Write the dashboard as an HTML page instead
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// Show the detected deployment and active history store
    Env,
    /// Serve the dashboard on a local address
    Web {
        /// Listen address (default from config: 127.0.0.1:9747)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default config to ~/.mailtriage/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let app = App::parse();
    let cfg = config::load();
    logging::init(&cfg.logging.level);

    match app.command {
        Commands::Classify { text, file } => cli::run_classify(cfg, text, file),
        Commands::History { format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_history(cfg, fmt)
        }
        Commands::Dashboard { format, html } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_dashboard(cfg, fmt, html.as_deref())
        }
        Commands::Env => cli::run_env(cfg),
        Commands::Web { addr } => cli::run_web(cfg, addr),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(&cfg),
            ConfigAction::Init { force } => cli::run_config_init(force),
        },
    }
}
