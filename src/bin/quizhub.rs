use std::{fs::create_dir_all, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use quizhub::db;
use quizhub::server::app::{run_server, AppState, UploadDir};
use quizhub::telemetry::init_tracing;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(default_value = "serve")]
    runner: Runner,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Runner {
    Serve,
    Migrate,
}

fn dir_from_env(var: &str) -> anyhow::Result<PathBuf> {
    let dir = PathBuf::from(
        dotenv::var(var).with_context(|| format!("Variable {var} should be set"))?,
    );
    if !dir.exists() {
        create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    if !dir.is_dir() {
        anyhow::bail!("Variable {var} should be a directory or not exist");
    }
    Ok(dir)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    dotenv::dotenv().ok();

    let path = dotenv::var("DB_PATH").context("DB_PATH must be set")?;
    let pool = db::establish_connection(&path).await?;

    tracing::info!("Running db migrations...");
    db::run_migrations(&pool).await?;

    match cli.runner {
        Runner::Migrate => {}
        Runner::Serve => {
            let upload_dir = dir_from_env("UPLOAD_DIR")?;
            let static_dir = dir_from_env("STATIC_DIR")?;
            let state = AppState {
                pool,
                upload_dir: UploadDir(upload_dir),
                static_dir,
            };
            run_server(state).await?;
        }
    }
    Ok(())
}
