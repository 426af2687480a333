mod cli;
mod display;

use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use chrono::Utc;
use clap::Parser;
use clauselens_client::{ApiClient, DemoService, load_upload};
use clauselens_core::{AssistService, DocumentService, NormalizedInsight};
use clauselens_workflow::{PROGRESS_INTERVAL, WorkflowController};
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;

use crate::cli::{Cli, Commands, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(log_level(cli.verbose));
    info!("clauselens v{}", env!("CARGO_PKG_VERSION"));

    let settings = cli.settings;
    if settings.demo {
        info!("demo mode: using canned responses");
        return run(cli.command, DemoService::new(settings.max_file_size), &settings).await;
    }

    let client = ApiClient::with_timeout(
        settings.api_url.clone(),
        Duration::from_secs(settings.timeout_secs),
    )?;
    run(cli.command, client, &settings).await
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn init_tracing(level: LevelFilter) {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        warn!("tracing subscriber already set; skipping re-initialization");
    }
}

async fn run<S>(command: Commands, service: S, settings: &Settings) -> anyhow::Result<()>
where
    S: DocumentService + AssistService + 'static,
{
    match command {
        Commands::Health => {
            let health = service.health().await?;
            println!("status: {}", health.status);
            for (key, value) in &health.details {
                println!("  {key}: {value}");
            }
            if !health.is_healthy() {
                bail!("backend reported status {:?}", health.status);
            }
        }
        Commands::Upload { file, text } => {
            let controller = WorkflowController::new(service);
            upload(&controller, &file, settings).await?;
            if let Some(document) = controller.snapshot().document() {
                display::print_document(document, text)?;
            }
        }
        Commands::Analyze(args) => {
            let controller = WorkflowController::new(service);
            if args.combined {
                let file = load_upload(&args.file, settings.max_file_size).await?;
                controller.submit_upload_and_analyze(file).await?;
            } else {
                upload(&controller, &args.file, settings).await?;
                controller.start_analysis().await?;
            }
            let snapshot = controller.snapshot();
            let insight = snapshot
                .visible_insight()
                .context("analysis finished without a result")?;
            print_insight(insight, args.json)?;
        }
        Commands::Ask { file, question } => {
            let controller = WorkflowController::new(service);
            upload(&controller, &file, settings).await?;
            ask(&controller, &question).await?;
            if let Some(answer) = &controller.snapshot().question().answer {
                println!("{answer}");
            }
        }
        Commands::Explain { clause, context } => {
            println!("{}", service.explain(&clause, &context).await?);
        }
        Commands::Summarize { file } => {
            let file = load_upload(&file, settings.max_file_size).await?;
            let extraction = service.upload(&file).await?;
            println!("{}", service.summarize(&extraction.text).await?);
        }
    }
    Ok(())
}

async fn upload<S: DocumentService + 'static>(
    controller: &WorkflowController<S>,
    path: &Path,
    settings: &Settings,
) -> anyhow::Result<()> {
    let file = load_upload(path, settings.max_file_size).await?;
    controller.submit_upload(file).await?;
    Ok(())
}

/// Ask through the controller, echoing its progress indicator on a terminal.
async fn ask<S: DocumentService + 'static>(
    controller: &WorkflowController<S>,
    question: &str,
) -> anyhow::Result<()> {
    let interactive = std::io::stderr().is_terminal();
    let watcher = interactive.then(|| {
        let controller = controller.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(PROGRESS_INTERVAL);
            loop {
                ticker.tick().await;
                let percent = controller.snapshot().question().progress.percent();
                eprint!("\rThinking... {percent:>3}%");
            }
        })
    });

    let result = controller.ask_question(question).await;
    if let Some(watcher) = watcher {
        watcher.abort();
        eprint!("\r{:20}\r", "");
    }
    result?;
    Ok(())
}

fn print_insight(insight: &NormalizedInsight, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(insight)?);
        Ok(())
    } else {
        display::print_insight_card(insight, Utc::now())
    }
}
