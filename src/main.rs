use clap::Parser;
use env_logger::Env;
use log::{debug, info};
use std::path::PathBuf;
use std::process::ExitCode;

use pdf_recipe_import::{import_pdf, ImportError, ImportOverrides, ProviderKind};

/// Extract a structured recipe from a PDF with an LLM.
///
/// Credentials are read from OPENAI_API_KEY, ANTHROPIC_API_KEY, or
/// OLLAMA_URL and OLLAMA_MODEL, optionally via a .env file.
#[derive(Parser, Debug)]
#[command(name = "pdf-recipe-import", version, about)]
struct Cli {
    /// Path to the recipe PDF
    pdf: PathBuf,

    /// Use Anthropic instead of OpenAI
    #[arg(long, conflicts_with = "ollama")]
    anthropic: bool,

    /// Use a local Ollama server instead of OpenAI
    #[arg(long)]
    ollama: bool,

    /// Write the result to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the provider's model
    #[arg(long)]
    model: Option<String>,

    /// Send only the text layer, without embedded images
    #[arg(long)]
    no_images: bool,
}

fn main() -> ExitCode {
    // A missing .env is fine; variables may already be exported.
    let dotenv = dotenvy::dotenv();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Ok(path) = dotenv {
        debug!("Loaded environment from {}", path.display());
    }

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn run(cli: Cli) -> Result<(), ImportError> {
    let kind = ProviderKind::from_flags(cli.anthropic, cli.ollama)?;
    let overrides = ImportOverrides {
        model: cli.model,
        text_only: cli.no_images,
    };
    let rendered = import_pdf(&cli.pdf, kind, &overrides)?.render();

    match cli.output {
        Some(path) => {
            std::fs::write(&path, format!("{}\n", rendered))?;
            info!("Wrote recipe to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
