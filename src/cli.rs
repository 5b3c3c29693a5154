use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Preview, chart, and summarize tabular data files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the first rows of a file with inferred column types
    Preview(PreviewArgs),
    /// Build a Vega-Lite chart specification from a file
    Visualize(VisualizeArgs),
    /// Compute descriptive statistics, correlations, or missing value counts
    Analyze(AnalyzeArgs),
    /// Serve the preview, visualize, and analyze operations over HTTP
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input data file
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// File type (csv, xlsx, xls, json, txt); defaults to the file extension
    #[arg(short = 't', long = "type")]
    pub file_type: Option<String>,
}

impl InputArgs {
    pub fn resolved_type(&self) -> String {
        self.file_type.clone().unwrap_or_else(|| {
            self.input
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or_default()
                .to_string()
        })
    }
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Number of rows to show
    #[arg(long, default_value_t = 100, allow_negative_numbers = true)]
    pub rows: i64,
    /// Print an aligned text table instead of JSON
    #[arg(long)]
    pub table: bool,
}

#[derive(Debug, Args)]
pub struct VisualizeArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Chart kind (histogram, scatter, line, bar, box, heatmap)
    #[arg(short = 'c', long = "chart")]
    pub chart: String,
    /// Column for the X axis
    #[arg(short = 'x', long = "x-column")]
    pub x_column: Option<String>,
    /// Column for the Y axis
    #[arg(short = 'y', long = "y-column")]
    pub y_column: Option<String>,
    /// Column used to color marks (scatter and line)
    #[arg(long = "color")]
    pub color_column: Option<String>,
    /// Chart title
    #[arg(long)]
    pub title: Option<String>,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Analysis kind (describe, correlation, missing_values)
    #[arg(short = 'a', long = "analysis")]
    pub analysis: String,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// YAML file with service settings
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Address to bind (overrides the config file)
    #[arg(long)]
    pub host: Option<String>,
    /// Port to bind (overrides the config file)
    #[arg(short = 'p', long)]
    pub port: Option<u16>,
    /// Number of HTTP workers (overrides the config file)
    #[arg(long)]
    pub workers: Option<usize>,
}
