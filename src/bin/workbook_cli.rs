//! Workbook CLI - Bridge interface for the web app
//!
//! Commands: validate, compile, proof, summary
//! Outputs JSON to stdout, logs to stderr
//! Returns non-zero on validation failure

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use workbook_core::{
    compile_seeded, pipeline::load_book, text_proof, CompilationPipeline, CompileOptions,
    FailureMode, GeneratedBook, PipelineError,
};

#[derive(Parser)]
#[command(name = "workbook-cli")]
#[command(about = "Workbook CLI - Workbook Layout Compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the book JSON (`-` for stdin)
    #[arg(short, long, global = true, default_value = "-")]
    book: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Block,
    Warn,
    Log,
}

impl From<Mode> for FailureMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Block => FailureMode::Block,
            Mode::Warn => FailureMode::Warn,
            Mode::Log => FailureMode::Log,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a book
    Validate {
        #[arg(long, value_enum, default_value = "block")]
        failure_mode: Mode,
    },

    /// Compile a book into a paginated document manifest
    Compile {
        /// Seed for the matching shuffle
        #[arg(short, long)]
        seed: Option<u64>,

        #[arg(long, value_enum, default_value = "block")]
        failure_mode: Mode,

        /// Write the manifest here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a plain-text proof of the page stream
    Proof {
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
    },

    /// Print the book summary
    Summary,
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("workbook_core=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => error!(error = %e, "failed to encode output"),
    }
}

/// Validation failures exit with 2 like `validate`; anything else is a
/// plain failure.
fn compile_failure_code(error: &PipelineError) -> u8 {
    match error {
        PipelineError::ValidationFailed(_) => 2,
        PipelineError::Io(_) | PipelineError::Serialization(_) => 1,
    }
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let book: GeneratedBook = match load_book(&cli.book) {
        Ok(b) => b,
        Err(e) => {
            print_json(&serde_json::json!({ "success": false, "error": e.to_string() }));
            return ExitCode::FAILURE;
        }
    };

    let pipeline = CompilationPipeline::new();

    match cli.command {
        Commands::Validate { failure_mode } => {
            let result = pipeline.validate_book(&book, failure_mode.into());
            print_json(&serde_json::json!(result));
            if result.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2) // Validation failure
            }
        }

        Commands::Compile { seed, failure_mode, output } => {
            let options = CompileOptions { seed, failure_mode: failure_mode.into() };
            let compiled = match pipeline.compile_book(&book, &options) {
                Ok(c) => c,
                Err(e) => {
                    print_json(&serde_json::json!({ "success": false, "error": e.to_string() }));
                    return ExitCode::from(compile_failure_code(&e));
                }
            };

            let manifest = serde_json::json!({ "success": true, "compiled": compiled });
            match output {
                Some(path) => {
                    let written = serde_json::to_vec_pretty(&manifest)
                        .map_err(std::io::Error::from)
                        .and_then(|bytes| fs::write(&path, bytes));
                    if let Err(e) = written {
                        error!(path = %path.display(), error = %e, "failed to write manifest");
                        return ExitCode::FAILURE;
                    }
                    print_json(&serde_json::json!({
                        "success": true,
                        "output": path,
                        "fileName": compiled.file_name,
                    }));
                }
                None => print_json(&manifest),
            }
            ExitCode::SUCCESS
        }

        Commands::Proof { seed } => {
            print!("{}", text_proof(&compile_seeded(&book, seed)));
            ExitCode::SUCCESS
        }

        Commands::Summary => {
            print_json(&serde_json::json!({
                "summary": book.summary(),
                "plannedSections": book.config.planned_section_count(),
                "trimSize": book.config.trim_size.as_str(),
            }));
            ExitCode::SUCCESS
        }
    }
}
