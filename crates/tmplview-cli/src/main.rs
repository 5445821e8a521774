//! tmplview CLI: render Handlebars views and layouts from the command line.
//!
//! Two commands: `render` writes one view (optionally inside a layout), and `bench` compares
//! repeated renders with and without the parsed-template cache.

mod commands;
mod helpers;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tmplview",
    about = "Render Handlebars views and layouts with an optional parsed-template cache",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to tmplview.config.json (ignored if it does not exist)
    #[arg(long, global = true, default_value = tmplview_core::config::CONFIG_FILE)]
    config: PathBuf,

    /// Directory templates are resolved against (overrides the config file)
    #[arg(long, global = true, env = "TMPLVIEW_BASE_PATH")]
    base_path: Option<PathBuf>,

    /// Enable the parsed-template cache (overrides the config file)
    #[arg(long, global = true)]
    cache: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a view, optionally inside a layout
    Render {
        /// View path, relative to the base path
        path: String,

        /// Layout path, relative to the base path
        #[arg(long, short)]
        layout: Option<String>,

        /// JSON file with the render data (default: empty object)
        #[arg(long, short)]
        data: Option<PathBuf>,

        /// Write the output to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Compare render throughput with and without caching
    Bench {
        /// View path, relative to the base path
        path: String,

        /// Layout path, relative to the base path
        #[arg(long, short)]
        layout: Option<String>,

        /// JSON file with the render data (default: empty object)
        #[arg(long, short)]
        data: Option<PathBuf>,

        /// Total renders per run
        #[arg(long, short = 'n', default_value = "1000")]
        iterations: u32,

        /// Worker threads sharing one manager
        #[arg(long, short = 'j', default_value = "4")]
        concurrency: usize,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = commands::load_config(&cli.config, cli.base_path.as_deref(), cli.cache)?;
    tracing::info!(
        base_path = %config.base_path.display(),
        caching = config.caching,
        "resolved configuration"
    );

    match cli.command {
        Commands::Render {
            path,
            layout,
            data,
            output,
        } => {
            commands::render::run(
                &config,
                &path,
                layout.as_deref(),
                data.as_deref(),
                output.as_deref(),
            )?;
        }
        Commands::Bench {
            path,
            layout,
            data,
            iterations,
            concurrency,
        } => {
            commands::bench::run(
                &config,
                &path,
                layout.as_deref(),
                data.as_deref(),
                iterations,
                concurrency,
            )
            .await?;
        }
    }

    Ok(())
}
