//! Telegram Manager CLI - main entry point
//!
//! Lists the account's chats and leaves groups and channels in bulk.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::BufReader;
use tracing::{error, warn};

use telegram_manager::config::{log_filter, ENV_FILE, SESSION_NAME};
use telegram_manager::controller::render_buckets;
use telegram_manager::session::{lock_file, session_file};
use telegram_manager::telegram::{self, TelegramPlatform};
use telegram_manager::{Controller, Credentials, Error, SessionLock, TelegramManager};

#[derive(Parser)]
#[command(name = "telegram_manager")]
#[command(about = "List your Telegram chats and leave groups and channels in bulk", long_about = None)]
#[command(version)]
struct Cli {
    /// File with API_ID, API_HASH and PHONE_NUMBER
    #[arg(long, default_value = ENV_FILE)]
    env_file: PathBuf,

    /// Session name; the login is kept in <NAME>.session
    #[arg(long, env = "TELEGRAM_SESSION", default_value = SESSION_NAME)]
    session: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive menu (default)
    Interactive,

    /// Print all dialogs grouped by type and exit
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ListFormat::Text)]
        format: ListFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ListFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so the menu on stdout stays readable
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(log_filter())
        .init();

    let cli = Cli::parse();

    let credentials = match Credentials::from_env_file(&cli.env_file) {
        Ok(credentials) => credentials,
        Err(err) => {
            eprintln!("Error: {}", err);
            eprintln!("{}", err.remediation());
            std::process::exit(1);
        }
    };

    let mut lock = match SessionLock::acquire(lock_file(&cli.session)) {
        Ok(lock) => lock,
        // The busy-session notice is printed by acquire itself
        Err(Error::SessionLocked) => std::process::exit(1),
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };

    let manager = match telegram::connect(&credentials, &cli.session).await {
        Ok(manager) => manager,
        Err(err) => {
            report_startup_failure(&err, &cli.session);
            lock.release();
            std::process::exit(1);
        }
    };

    let code = match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => run_interactive(manager).await,
        Commands::List { format } => run_list(manager, format).await,
    };

    lock.release();
    // The stdin reader may still be parked on a blocking read, so leave
    // without waiting for the runtime to wind down.
    std::process::exit(code);
}

async fn run_interactive(manager: TelegramManager<TelegramPlatform>) -> i32 {
    println!("Connected to Telegram!");

    let input = BufReader::new(tokio::io::stdin());
    let controller = Controller::new(manager, input, io::stdout());

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    match controller.run_until(shutdown).await {
        Ok(_) => 0,
        Err(err) => {
            error!("Interactive session failed: {}", err);
            1
        }
    }
}

async fn run_list(mut manager: TelegramManager<TelegramPlatform>, format: ListFormat) -> i32 {
    let result = print_dialogs(&manager, format).await;
    manager.disconnect().await;

    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("Error: {}", err);
            1
        }
    }
}

async fn print_dialogs(
    manager: &TelegramManager<TelegramPlatform>,
    format: ListFormat,
) -> telegram_manager::Result<()> {
    let buckets = manager.list_dialogs().await?;
    let mut stdout = io::stdout().lock();

    match format {
        ListFormat::Text => render_buckets(&mut stdout, &buckets)?,
        ListFormat::Json => {
            serde_json::to_writer_pretty(&mut stdout, &buckets.summary())?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

fn report_startup_failure(err: &Error, session: &str) {
    eprintln!("Error starting the Telegram client: {}", err);
    eprintln!("Try one of these solutions:");
    eprintln!("1. Check that API_ID and API_HASH match your app on https://my.telegram.org/apps");
    eprintln!(
        "2. Delete {} and sign in again",
        session_file(session).display()
    );
    eprintln!("3. Check your network connection and retry");
}
