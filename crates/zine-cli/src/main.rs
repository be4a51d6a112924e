//! Zine CLI - Headless preview and validation for particle scopes

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{render, simulate, themes, validate, ScopeSource};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "zine")]
#[command(about = "Decorative particle scopes, driven headless", long_about = None)]
#[command(version)]
struct Cli {
    /// Log scope lifecycle events (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List built-in themes
    Themes {
        /// Print the named preset as TOML
        #[arg(long)]
        show: Option<String>,
    },

    /// Check a scope config file against its documented ranges
    Validate {
        /// Path to a TOML scope config
        config: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Run a scope for a number of frames with scripted input and print stats
    Simulate {
        #[command(flatten)]
        source: SourceArgs,

        /// Number of frames to run
        #[arg(long, default_value = "600")]
        frames: u32,

        /// Drive overlay nodes instead of a canvas
        #[arg(long)]
        dom: bool,
    },

    /// Run a scope against the CPU rasteriser and write the last frame as PNG
    Render {
        #[command(flatten)]
        source: SourceArgs,

        /// Output image path
        #[arg(short, long, default_value = "zine.png")]
        output: String,

        /// Number of frames to run before capturing
        #[arg(long, default_value = "240")]
        frames: u32,
    },
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Built-in theme to start from
    #[arg(long)]
    theme: Option<String>,

    /// TOML config file (its keys override the theme)
    #[arg(long)]
    config: Option<String>,

    /// Viewport width in pixels (render: 1 to 65535)
    #[arg(long, default_value = "640")]
    width: u32,

    /// Viewport height in pixels (render: 1 to 65535)
    #[arg(long, default_value = "360")]
    height: u32,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

impl From<SourceArgs> for ScopeSource {
    fn from(args: SourceArgs) -> Self {
        ScopeSource {
            theme: args.theme,
            config: args.config,
            width: args.width,
            height: args.height,
            seed: args.seed,
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Themes { show } => themes::run(show.as_deref()),
        Commands::Validate { config, format } => validate::run(&config, &format),
        Commands::Simulate { source, frames, dom } => simulate::run(simulate::SimulateArgs {
            source: source.into(),
            frames,
            dom,
        }),
        Commands::Render {
            source,
            output,
            frames,
        } => render::run(render::RenderArgs {
            source: source.into(),
            output,
            frames,
        }),
    }
}
