use anyhow::{Context, Result};
use nutri_ledger::calendar::today;
use nutri_ledger::cli::parse_args;
use nutri_ledger::commands::execute;
use nutri_ledger::config::Settings;
use nutri_ledger::logging::init_logging;
use nutri_ledger::state::{JsonFileStorage, Tracker};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok(); // Load .env so NUTRI_LEDGER__* overrides can live there

    let cli_args = parse_args();

    let mut settings = Settings::load(cli_args.config.clone()).context("Failed to load configuration")?;
    if let Some(data_file) = cli_args.data_file.clone() {
        settings.storage.data_file = data_file;
    }
    init_logging(&settings.logging)?;

    let storage = JsonFileStorage::new(&settings.storage.data_file);
    let mut tracker = Tracker::open(storage, settings.colors).with_context(|| {
        format!(
            "Failed to open state document '{}'",
            settings.storage.data_file.display()
        )
    })?;

    let output = execute(cli_args.command, &mut tracker, today(), cli_args.json).await?;
    println!("{}", output);
    Ok(())
}
