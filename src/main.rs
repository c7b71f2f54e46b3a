use anyhow::Result;
use tracing::info;

mod catalog;
mod config;
mod database;
mod error;
mod export;
mod extractor;
#[cfg(test)]
mod fixtures;
mod models;
mod normalizer;
mod scrapers;
mod source;
mod traits;
mod walker;

use catalog::CatalogPipeline;
use config::Config;
use database::Database;
use source::HttpPageSource;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    info!("Starting kyou.id catalog harvest");

    let config = Config::from_env()?;
    if config.database_url.starts_with("sqlite:database/") {
        std::fs::create_dir_all("database")?;
    }

    let layout = scrapers::kyou::layout(&config.base_url);
    let pipeline = CatalogPipeline::new(layout, config.pipeline.clone())?;
    let mut source = HttpPageSource::new()?;
    let database = Database::new(&config.database_url, config.base_policy).await?;

    let summary = pipeline.run(&mut source, &database).await?;
    info!(
        "Run complete: {} discovered, {} extracted, {} skipped, {} filtered out, {} persisted",
        summary.discovered,
        summary.extracted,
        summary.skipped,
        summary.filtered_out,
        summary.persisted
    );

    if summary.persisted > 0 {
        for row in database.ranked_aggregates().await?.iter().take(10) {
            info!(
                "{} / {}: total {:?}, series average {:?}",
                row.series,
                row.character,
                row.wishlist_total,
                row.average_wishlist
            );
        }
    }

    Ok(())
}
