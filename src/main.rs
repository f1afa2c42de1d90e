use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::EnvFilter;

use nippu::{BuildOptions, Mode, Pipeline, PipelineError};

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Variant {
    Production,
    Debug,
}

#[derive(Parser, Debug)]
#[command(name = "nippu", version, about = "Manifest-driven asset pipeline")]
struct Args {
    /// Path to the pipeline manifest.
    #[arg(long, default_value = "pipeline.toml")]
    manifest: Utf8PathBuf,

    /// Directory containing the source assets.
    #[arg(long, default_value = "assets")]
    source_root: Utf8PathBuf,

    /// Directory artifacts are written to.
    #[arg(long, default_value = "dist")]
    dest_root: Utf8PathBuf,

    /// Build variant: `production` enables compression, `debug` selects the
    /// development variant of the bundle transform.
    #[arg(long = "type", value_enum)]
    variant: Option<Variant>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build every task in the manifest.
    RunAll,
    /// Build the one task responsible for a single changed file.
    Build {
        /// Changed file, relative to the project root.
        #[arg(long)]
        file: Option<String>,
    },
    /// Watch the source tree and rebuild tasks as files change.
    Watch,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", style("Error:").red());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), PipelineError> {
    let mode = match args.variant {
        Some(Variant::Production) => Mode::Production,
        Some(Variant::Debug) => Mode::Debug,
        None => Mode::Dev,
    };

    let options = BuildOptions {
        mode,
        source_root: args.source_root,
        dest_root: args.dest_root,
        ..BuildOptions::default()
    };

    let pipeline = Pipeline::load(&args.manifest, options)?;

    match args.command.unwrap_or(Command::RunAll) {
        Command::RunAll => pipeline.run_all()?,
        Command::Build { file: None } => {
            eprintln!("{} --file FILE", style("Need argument:").red());
        }
        Command::Build { file: Some(file) } => {
            pipeline.build_file(&file)?;
        }
        Command::Watch => pipeline.watch()?,
    }

    Ok(())
}
