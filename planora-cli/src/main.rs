mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

use planora_client::{ClientConfig, Environment, Locale, PlanoraClient};

/// Command-line client for the Planora project-management backend.
#[derive(Debug, Parser)]
#[command(name = "planora", version, about)]
struct Args {
    /// Talk to the staging deployment instead of production.
    #[arg(long, global = true)]
    staging: bool,

    /// Explicit API base URL (overrides the environment host).
    #[arg(long, global = true, env = "PLANORA_API_URL")]
    api_url: Option<Url>,

    /// Display locale used for endpoint resolution.
    #[arg(long, global = true, env = "PLANORA_LOCALE", default_value = "en")]
    locale: Locale,

    /// Session state file (defaults to .planora-session.json).
    #[arg(long, global = true, env = "PLANORA_STATE_FILE")]
    state_file: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and persist the session for later invocations.
    Login {
        email: String,
        /// Password; falls back to the PLANORA_PASSWORD environment variable.
        #[arg(long, env = "PLANORA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log out and discard the persisted session.
    Logout,
    /// Show the currently authenticated user.
    Whoami,
    /// Project operations.
    Projects {
        #[command(subcommand)]
        command: commands::ProjectsCommand,
    },
    /// User operations.
    Users {
        #[command(subcommand)]
        command: commands::UsersCommand,
    },
    /// Dashboard statistics.
    Stats,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("planora=debug,planora_client=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("planora=info,planora_client=warn"))
    };

    fmt().with_env_filter(filter).with_target(false).init();
}

fn build_client(args: &Args) -> planora_client::Result<PlanoraClient> {
    // PLANORA_ENV / PLANORA_UPLOAD_URL come from the environment; the flags
    // below override what they share with clap's own env handling.
    let mut config = ClientConfig::from_env()?;
    if args.staging {
        config.environment = Environment::Staging;
    }
    config.set_locale(args.locale);
    if let Some(url) = &args.api_url {
        config.api_url_override = Some(url.clone());
    }

    let state_file = args
        .state_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(".planora-session.json"));

    PlanoraClient::with_state_file(config, state_file)
}

#[tokio::main]
async fn main() {
    // Best-effort; a missing .env file is fine.
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        if e.requires_login() {
            eprintln!("Run `planora login <email>` to start a new session.");
        }
        process::exit(1);
    }
}

async fn run(args: Args) -> planora_client::Result<()> {
    let client = build_client(&args)?;

    match &args.command {
        Command::Login { email, password } => commands::login(&client, email, password).await,
        Command::Logout => commands::logout(&client).await,
        Command::Whoami => commands::whoami(&client),
        Command::Projects { command } => commands::projects(&client, command).await,
        Command::Users { command } => commands::users(&client, command).await,
        Command::Stats => commands::stats(&client).await,
    }
}
