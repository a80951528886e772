use clap::Parser;
use ledger_highlights::args::{Args, Command};
use ledger_highlights::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with {} error: {e}", e.error_type());
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().ledger_home().path();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args).await?.print(),

        Command::SignIn(sign_in_args) => {
            let config = Config::load(home).await?;
            commands::sign_in(&config, sign_in_args).await?.print()
        }

        Command::SignOut => commands::sign_out(&Config::load(home).await?)
            .await?
            .print(),

        Command::Register(register_args) => {
            let config = Config::load(home).await?;
            commands::register(&config, register_args).await?.print()
        }

        Command::List => commands::list(&Config::load(home).await?).await?.print(),

        Command::Dashboard => commands::dashboard(&Config::load(home).await?)
            .await?
            .print(),

        Command::Resume(resume_args) => {
            let config = Config::load(home).await?;
            commands::resume(&config, resume_args).await?.print()
        }

        Command::Categories => commands::categories().await?.print(),
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                "ledger_highlights",
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
