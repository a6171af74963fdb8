use azure_cost_export::azure::{ArmClient, IdentityToken};
use azure_cost_export::logging::init_logging;
use azure_cost_export::output::print_summary;
use azure_cost_export::{run_export, Cli};
use clap::Parser;
use std::error::Error;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logging(&cli.log_config)?;
    //
    log::info!("#Start main()");

    let config = cli.into_config(chrono::Local::now().date_naive())?;
    let token = IdentityToken::from_environment()?;
    let client = ArmClient::new(&config.management_url, Arc::new(token))?;

    let summary = run_export(&client, &config).await?;
    print_summary(&summary);

    Ok(())
}
// cargo watch -x 'fmt' -x 'run'  // 'run -- --start-date 2023-09-01 --end-date 2023-09-30'
