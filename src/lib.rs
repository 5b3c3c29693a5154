pub mod analysis;
pub mod chart;
pub mod cli;
pub mod coerce;
pub mod columns;
pub mod config;
pub mod data;
pub mod dataset;
pub mod dispatch;
pub mod error;
pub mod frequency;
pub mod io_utils;
pub mod loader;
pub mod preview;
pub mod server;
pub mod service;
pub mod stats;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};
use serde::Serialize;

use crate::{
    chart::ChartRequest,
    cli::{AnalyzeArgs, Cli, Commands, PreviewArgs, ServeArgs, VisualizeArgs},
    config::ServiceConfig,
    dispatch::Outcome,
    service::{AnalyzeRequest, PreviewRequest, VisualizeRequest},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("datashare", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Preview(args) => handle_preview(&args),
        Commands::Visualize(args) => handle_visualize(&args),
        Commands::Analyze(args) => handle_analyze(&args),
        Commands::Serve(args) => handle_serve(&args),
    }
}

fn handle_preview(args: &PreviewArgs) -> Result<()> {
    let request = PreviewRequest {
        file_path: args.input.input.display().to_string(),
        file_type: args.input.resolved_type(),
        rows: Some(args.rows),
    };
    let outcome = service::preview(&request, args.rows)?;
    match outcome {
        Outcome::Preview(payload) if args.table => {
            print!("{}", table::render_preview(&payload));
            Ok(())
        }
        other => print_json(&other),
    }
}

fn handle_visualize(args: &VisualizeArgs) -> Result<()> {
    let request = VisualizeRequest {
        file_path: args.input.input.display().to_string(),
        file_type: args.input.resolved_type(),
        chart: ChartRequest {
            chart_type: args.chart.clone(),
            x_column: args.x_column.clone(),
            y_column: args.y_column.clone(),
            color_column: args.color_column.clone(),
            title: args.title.clone(),
        },
    };
    print_json(&service::visualize(&request)?)
}

fn handle_analyze(args: &AnalyzeArgs) -> Result<()> {
    let request = AnalyzeRequest {
        file_path: args.input.input.display().to_string(),
        file_type: args.input.resolved_type(),
        analysis_type: args.analysis.clone(),
    };
    print_json(&service::analyze(&request)?)
}

fn handle_serve(args: &ServeArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::default(),
    };
    let config = config.with_overrides(args.host.clone(), args.port, args.workers)?;
    info!(
        "Allowing cross-origin requests from {}",
        config.allowed_origins.join(", ")
    );
    actix_web::rt::System::new()
        .block_on(server::serve(config))
        .context("Running HTTP server")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Serializing response")?;
    println!("{rendered}");
    Ok(())
}
