use sea_orm_migration::prelude::*;

use cargolink_chat_migration::Migrator;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
