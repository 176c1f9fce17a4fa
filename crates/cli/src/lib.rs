pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "agrichat",
    about = "AgriChat operator CLI",
    long_about = "Inspect configuration, check service readiness, and run the chat pipeline from a terminal.",
    after_help = "Examples:\n  agrichat doctor --json\n  agrichat extract \"yield for 5 hectares of wheat\"\n  agrichat normalize --file reply.md\n  agrichat ask \"best soil for rice?\" --language hi"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config and check that the prediction service is reachable")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Run yield intent detection and parameter extraction on a message")]
    Extract {
        #[arg(help = "Farmer message to analyse")]
        message: String,
    },
    #[command(about = "Normalize a model reply read from a file or standard input")]
    Normalize {
        #[arg(long, help = "Read the reply from this file instead of stdin")]
        file: Option<PathBuf>,
    },
    #[command(about = "Send one message through the full chat pipeline")]
    Ask {
        #[arg(help = "Farmer message")]
        message: String,
        #[arg(long, help = "Response language code (en, te, hi, ta, kn, mr)")]
        language: Option<String>,
        #[arg(long, help = "Skip the yield prediction lookup")]
        no_predict: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Extract { message } => commands::extract::run(&message),
        Command::Normalize { file } => commands::normalize::run(file.as_deref()),
        Command::Ask { message, language, no_predict } => {
            commands::ask::run(&message, language.as_deref(), !no_predict)
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Diagnostics go to stderr so command output on stdout stays parseable.
fn init_logging() {
    let filter =
        EnvFilter::try_from_env("AGRICHAT_LOG_FILTER").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .compact()
        .try_init();
}
