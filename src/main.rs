use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::*;
use dotenvy::dotenv;
use tracing::debug;

use fleet_admin::client::ApiClient;
use fleet_admin::commands;
use fleet_admin::config::EnvironmentConfig;
use fleet_admin::state::{FileSessionStore, SessionHandle};
use fleet_admin::utils::errors::{AppError, AppResult};

#[derive(Parser)]
#[command(name = "fleet-admin")]
#[command(about = "Trucking back-office client: loads, drivers, equipment and brokers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login(commands::auth::LoginArgs),

    /// Create a user account
    Register(commands::auth::RegisterArgs),

    /// Forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// List a resource, with optional search and status filter
    List(commands::records::ListArgs),

    /// Show one record
    Show(commands::records::ShowArgs),

    /// Create a record from a JSON form file
    Create(commands::records::CreateArgs),

    /// Update a record from a JSON form file
    Update(commands::records::UpdateArgs),

    /// Delete a record
    Delete(commands::records::DeleteArgs),

    /// Status counts and charts across the fleet
    Dashboard(commands::dashboard::DashboardArgs),

    /// Load stage workflow
    Load(commands::load::LoadArgs),

    /// Driver pay and expenses, truck expenses
    Ledger(commands::ledger::LedgerArgs),
}

async fn run(cli: Cli, config: EnvironmentConfig) -> AppResult<()> {
    let store = Arc::new(FileSessionStore::new(config.session_file.clone()));
    let session = SessionHandle::open(store)?;
    let client = ApiClient::new(config, session)?;

    match cli.command {
        Commands::Login(args) => commands::auth::login(&client, args).await,
        Commands::Register(args) => commands::auth::register(&client, args).await,
        Commands::Logout => commands::auth::logout(&client).await,
        Commands::Whoami => commands::auth::whoami(&client).await,
        Commands::List(args) => commands::records::list(&client, args).await,
        Commands::Show(args) => commands::records::show(&client, args).await,
        Commands::Create(args) => commands::records::create(&client, args).await,
        Commands::Update(args) => commands::records::update(&client, args).await,
        Commands::Delete(args) => commands::records::delete(&client, args).await,
        Commands::Dashboard(args) => commands::dashboard::execute(&client, args).await,
        Commands::Load(args) => commands::load::execute(&client, args).await,
        Commands::Ledger(args) => commands::ledger::execute(&client, args).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    let cli = Cli::parse();

    let config = match EnvironmentConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "❌".red(), e);
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    debug!("🌐 API {} ({})", config.api_base_url, config.environment);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::SessionExpired) => {
            eprintln!(
                "{} session expired, run `fleet-admin login` again",
                "🔒".yellow()
            );
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("{} {}", "❌".red(), e);
            ExitCode::FAILURE
        }
    }
}
