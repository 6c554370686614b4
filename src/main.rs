use clap::Parser;
use ndfd_forecast::cli::{run, Cli};
use ndfd_forecast::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
