//! Migration CLI tool.
//!
//! `DATABASE_URL` selects the target; run `migration --help` for commands.

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // The CLI installs its own tracing subscriber.
    cli::run_cli(migration::Migrator).await;
}
