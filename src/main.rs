//! LawLord CLI entry point.
//!
//! Provides `serve`, `chat`, and `catalog` subcommands for running the HTTP
//! intake API, interviewing from the terminal, or listing the case types the
//! assistant can classify.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use lawlord::config::Config;
use lawlord::credentials::load_credentials;
use lawlord::intake::{IntakeEngine, SessionPhase, SessionStore};
use lawlord::knowledge::KnowledgeCatalog;
use lawlord::oracle::Oracle;
use lawlord::providers::router::ModelRouter;
use lawlord::{logging, server};

/// LawLord: conversational legal intake assistant.
#[derive(Parser)]
#[command(name = "lawlord", version, about)]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Run the HTTP intake API.
    Serve {
        /// Address to listen on, overriding the config file.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run one intake interview on stdin/stdout.
    Chat,
    /// List known case types and their fact schedules.
    Catalog,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { bind } => handle_serve(bind).await,
        Command::Chat => handle_chat().await,
        Command::Catalog => handle_catalog(),
    }
}

/// Load config and credentials, then assemble the engine.
fn build_engine(config: &Config) -> anyhow::Result<IntakeEngine> {
    let env_file = config.env_file()?;
    let credentials = load_credentials(&env_file)
        .with_context(|| format!("failed to load credentials from {}", env_file.display()))?;

    let router = ModelRouter::from_config(&config.models, &config.oracle, &credentials)
        .context("failed to configure model providers")?;
    info!(models = ?router.available_specs(), "model router ready");

    let oracle = Oracle::new(Arc::new(router), config.oracle.clone());
    Ok(IntakeEngine::new(
        Arc::new(SessionStore::new()),
        Arc::new(KnowledgeCatalog::builtin()),
        oracle,
        config,
    ))
}

/// Run the HTTP API until interrupted.
async fn handle_serve(bind: Option<String>) -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = logging::init_production(&config.logs_dir()?)?;

    let engine = build_engine(&config)?;
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    info!(firm = %config.firm.name, bind = %bind, "starting intake server");

    server::serve(engine, &bind, config.server.session_idle_minutes).await
}

/// Interview one caller on the terminal.
async fn handle_chat() -> anyhow::Result<()> {
    logging::init_cli();
    let config = Config::load().context("failed to load configuration")?;
    let engine = build_engine(&config)?;

    let (session_id, greeting) = engine.start().await;
    let mut stdout = std::io::stdout();
    writeln!(stdout, "{greeting}\n")?;

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read from stdin")?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        let result = engine.process_message(&session_id, text).await?;
        writeln!(stdout, "\n{}\n", result.message)?;

        let session = engine.snapshot(&session_id).await?;
        if session.phase() == SessionPhase::Complete {
            break;
        }
    }

    match engine.report(&session_id).await? {
        Some(report) => {
            let rendered =
                serde_json::to_string_pretty(&report).context("failed to render report")?;
            writeln!(stdout, "{rendered}")?;
        }
        None => writeln!(stdout, "Interview ended before a report was generated.")?,
    }
    Ok(())
}

/// Print the built-in catalog without contacting any provider.
fn handle_catalog() -> anyhow::Result<()> {
    let catalog = KnowledgeCatalog::builtin();
    let mut stdout = std::io::stdout();

    for knowledge in catalog.iter() {
        writeln!(
            stdout,
            "{} ({}): {}",
            knowledge.case_type, knowledge.jurisdiction, knowledge.display_name
        )?;
        for fact in &knowledge.facts {
            let follow_up = if fact.is_follow_up() { " (follow-up)" } else { "" };
            writeln!(
                stdout,
                "  [priority {}] {}{follow_up}: {}",
                fact.priority, fact.key, fact.question
            )?;
        }
        writeln!(stdout)?;
    }
    Ok(())
}
