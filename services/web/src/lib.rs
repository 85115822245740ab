mod cli;
mod infra;
mod render;
mod routes;
mod server;

use ethicic_site::SiteError;

pub async fn run() -> Result<(), SiteError> {
    cli::run().await
}
