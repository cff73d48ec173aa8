//! jquereact CLI - convert jQuery code into React function components.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "jquereact")]
#[command(about = "Convert jQuery code into React function components")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to jquereact.toml config file
    #[arg(short, long, default_value = config::CONFIG_FILE)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a default jquereact.toml
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        yes: bool,
    },

    /// Convert one file and print the component
    Convert {
        /// Source file (.js, .jsx, .html)
        file: PathBuf,

        /// Component name (derived from the file name by default)
        #[arg(short, long)]
        name: Option<String>,

        /// Transformation options as JSON
        #[arg(long)]
        options: Option<String>,

        /// Skip whitespace normalization
        #[arg(long)]
        no_format: bool,
    },

    /// Convert every matching file
    Transform {
        /// Directories, files or glob patterns (defaults to config)
        inputs: Vec<String>,

        /// Output directory (defaults to config or "src/components")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Transformation options as JSON
        #[arg(long)]
        options: Option<String>,

        /// Skip whitespace normalization
        #[arg(long)]
        no_format: bool,

        /// Convert without writing files
        #[arg(long)]
        dry_run: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert files again whenever they change
    Watch {
        /// Directories to watch (defaults to config)
        dirs: Vec<String>,

        /// Output directory (defaults to config or "src/components")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Transformation options as JSON
        #[arg(long)]
        options: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Components and reports go to stdout
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes).await?;
        }
        Commands::Convert {
            file,
            name,
            options,
            no_format,
        } => {
            let config = config::ConfigFile::load(&cli.config)?;
            let options = config::parse_options(options.as_deref())?;
            commands::convert::run(&config, file, name, options, !no_format).await?;
        }
        Commands::Transform {
            inputs,
            output,
            options,
            no_format,
            dry_run,
            json,
        } => {
            let config = config::ConfigFile::load(&cli.config)?;
            let overrides = config::Overrides {
                inputs,
                output,
                options: config::parse_options(options.as_deref())?,
                dry_run,
            };
            commands::transform::run(&config, overrides, !no_format, json).await?;
        }
        Commands::Watch {
            dirs,
            output,
            options,
        } => {
            let config = config::ConfigFile::load(&cli.config)?;
            let overrides = config::Overrides {
                inputs: dirs,
                output,
                options: config::parse_options(options.as_deref())?,
                dry_run: false,
            };
            commands::watch::run(&config, overrides).await?;
        }
    }

    Ok(())
}
