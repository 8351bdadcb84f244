mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use pim_avaliador::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
