mod app;
mod auth;
mod cli;
mod context;
mod db;
mod entities;
mod error;
mod model;
mod stats;
mod web;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::cli::{Cli, Command};
use crate::error::AppError;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let db_path = db::resolve_db_path(&cli.data_dir);
    db::ensure_parent_dir(&db_path)?;
    let mut lock = db::open_lock(&db_path)?;
    let _guard = lock.write()?;

    let conn = db::connect(&db_path).await?;
    db::ensure_schema(&conn).await?;
    let app = App::new(conn);

    match cli.command {
        Command::Serve(serve) => {
            let state = web::AppState::new(app);
            let router = web::create_router(state);
            let listener = tokio::net::TcpListener::bind(serve.bind).await?;
            tracing::info!(addr = %serve.bind, "listening");
            axum::serve(listener, router).await?;
        }
        Command::CreateUser(args) => {
            let display_name = args
                .display_name
                .clone()
                .unwrap_or_else(|| args.username.clone());
            let account = app
                .create_account(&args.username, &display_name, &args.password)
                .await?;
            println!("Created user #{} ({})", account.id, account.username);
        }
        Command::DeleteUser(args) => {
            let account = app.account_by_username(&args.username).await?;
            app.delete_account(account.id).await?;
            println!("Deleted user {}", args.username);
        }
    }
    Ok(())
}
