use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use constforge::document::FileSource;
use constforge::settings::{ENV_PREFIX, ENV_SEPARATOR};
use constforge::{Error, Generator, Settings};

const DEFAULT_SETTINGS_FILE: &str = "constforge.toml";

/// Generate typed constants for several languages from one configuration document
#[derive(Parser, Debug)]
#[command(name = "constforge", version)]
#[command(about = "Generate typed constants from layered configuration documents", long_about = None)]
struct Args {
    /// Root configuration document
    #[arg(value_name = "FILE")]
    config: PathBuf,

    /// Directory generated files are written to (overrides settings)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Settings file; defaults to ./constforge.toml when present
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(Error::Resolution(diagnostics)) => {
            for error in &diagnostics {
                eprintln!("error: {error}");
            }
            eprintln!(
                "{} error(s); no files were generated for {}",
                diagnostics.len(),
                args.config.display()
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every target was generated.
fn run(args: &Args) -> Result<bool, Error> {
    let builder = match &args.settings {
        Some(path) => Settings::builder().with_file(path, true),
        None => Settings::builder().with_file(DEFAULT_SETTINGS_FILE, false),
    };
    let mut settings = builder.with_env(ENV_PREFIX, ENV_SEPARATOR).build()?;
    if let Some(output) = &args.output {
        settings.output.directory = output.clone();
    }
    debug!(?settings, "loaded settings");

    let source = FileSource;
    let report = Generator::new(&source)
        .with_settings(settings)
        .generate(&args.config)?;

    for path in &report.written {
        println!("{}", path.display());
    }
    for failure in &report.failures {
        eprintln!("error: {}: {}", failure.language, failure.error);
    }
    Ok(report.is_success())
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default = if verbose { "constforge=debug" } else { "constforge=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
