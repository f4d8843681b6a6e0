use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use spendtalk_core::{clarity_score, clarity_suggestions, describe_date, normalize_transcript, parse_date};
use spendtalk_interpret::{GeminiCategorizer, GeminiConfig, TransactionInterpreter};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod auth;
mod batch;
mod config;
mod labels;
mod state;

use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "spendtalk",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SPENDTALK_BUILD_SHA"), ")"),
    about = "Turn Vietnamese/English spending messages into structured transactions"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct InputOpts {
    /// Message language: vi or en (default: from config)
    #[arg(long)]
    lang: Option<String>,

    /// Reference date YYYY-MM-DD (default: today in the configured timezone)
    #[arg(long)]
    date: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interpret one message
    Interpret {
        text: String,

        /// Treat the text as a speech-to-text transcript
        #[arg(long)]
        voice: bool,

        /// Keyword rules only, never call Gemini
        #[arg(long)]
        offline: bool,

        /// Print the transaction record as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        opts: InputOpts,
    },

    /// Show which date a message refers to
    Date {
        text: String,

        #[command(flatten)]
        opts: InputOpts,
    },

    /// Normalize a voice transcript and score its clarity
    Normalize {
        text: String,

        /// Message language: vi or en (default: from config)
        #[arg(long)]
        lang: Option<String>,
    },

    /// Interpret every row of a CSV (`text[,voice]`) into transaction records
    Batch {
        #[arg(long)]
        input: PathBuf,

        /// Output CSV (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,

        #[arg(long)]
        offline: bool,

        #[command(flatten)]
        opts: InputOpts,
    },

    /// Manage ~/.spendtalk/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Store API credentials in ~/.spendtalk/auth.json
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Paste a Gemini API key (GEMINI_API_KEY overrides it)
    PasteGeminiKey,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Interpret { text, voice, offline, json, opts } => {
            let cfg = config::load_config()?;
            let language = cfg.language(opts.lang.as_deref())?;
            let reference = cfg.reference_date(opts.date.as_deref())?;
            let interpreter = build_interpreter(&cfg, offline)?;

            let t = interpreter.interpret(&text, voice, language, reference);
            if json {
                println!("{}", serde_json::to_string_pretty(&t)?);
            } else {
                println!("{}", labels::render(&t, reference));
                if voice {
                    for s in clarity_suggestions(&text, language) {
                        println!("  • {s}");
                    }
                }
            }
        }

        Command::Date { text, opts } => {
            let cfg = config::load_config()?;
            let language = cfg.language(opts.lang.as_deref())?;
            let reference = cfg.reference_date(opts.date.as_deref())?;

            let date = parse_date(&text, language, reference);
            println!("{date} ({})", describe_date(date, reference, language));
        }

        Command::Normalize { text, lang } => {
            let cfg = config::load_config()?;
            let language = cfg.language(lang.as_deref())?;

            println!("{}", normalize_transcript(&text, language));
            println!("clarity: {:.2}", clarity_score(&text));
            for s in clarity_suggestions(&text, language) {
                println!("  • {s}");
            }
        }

        Command::Batch { input, output, offline, opts } => {
            let cfg = config::load_config()?;
            let language = cfg.language(opts.lang.as_deref())?;
            let reference = cfg.reference_date(opts.date.as_deref())?;
            let interpreter = build_interpreter(&cfg, offline)?;

            let reader = File::open(&input).with_context(|| format!("open {}", input.display()))?;
            let summary = match &output {
                Some(p) => {
                    let writer = File::create(p).with_context(|| format!("create {}", p.display()))?;
                    batch::run_batch(reader, writer, &interpreter, language, reference)?
                }
                None => batch::run_batch(reader, io::stdout().lock(), &interpreter, language, reference)?,
            };

            eprintln!(
                "Interpreted {} rows from {} ({} empty rows skipped)",
                summary.rows,
                input.display(),
                summary.skipped
            );
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },

        Command::Auth { command } => match command {
            AuthCommand::PasteGeminiKey => auth::gemini_paste_key()?,
        },
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` overrides
/// the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn build_interpreter(cfg: &Config, offline: bool) -> Result<TransactionInterpreter> {
    let interpreter = TransactionInterpreter::new().with_default_amount(cfg.interpret.default_amount);
    if offline || !cfg.gemini.enabled {
        return Ok(interpreter);
    }

    match auth::gemini_api_key()? {
        Some(api_key) => {
            let gemini = GeminiCategorizer::new(GeminiConfig {
                api_key,
                model: cfg.gemini.model.clone(),
                base_url: cfg.gemini.base_url.clone(),
                timeout: cfg.gemini_timeout(),
            });
            Ok(interpreter.with_external(Box::new(gemini)))
        }
        None => {
            info!("no Gemini API key configured, using keyword rules");
            Ok(interpreter)
        }
    }
}
