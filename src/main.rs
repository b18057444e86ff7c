//! Mediadesk - admin list screens from the command line

use anyhow::{Context, Result};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mediadesk::{
    config::Config,
    services::ManagementScreen,
    source::HttpRecordSource,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mediadesk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded, API at {}", config.api.base_url);

    let definition = config.screen.definition(&config.list);
    let source = HttpRecordSource::for_screen(&config.api, &definition)
        .context("Failed to create API client")?;
    let screen = ManagementScreen::new(definition, source)?;

    let loaded = screen
        .open()
        .await
        .with_context(|| format!("Failed to load {}", screen.title()))?;
    tracing::info!("{}: {} records", screen.title(), loaded);

    let controller = screen.controller();
    if let Ok(search) = std::env::var("MEDIADESK_SEARCH") {
        controller.set_filter_value("search", search);
        controller.flush_search();
    }

    let page = controller.visible_page();
    match page.range() {
        Some((first, last)) => tracing::info!(
            "Showing {}-{} of {} ({} total), page {}/{}",
            first,
            last,
            page.total_filtered,
            page.total_raw,
            page.current_page,
            page.total_pages
        ),
        None => tracing::info!("No records match ({} total)", page.total_raw),
    }

    for record in &page.records {
        println!("{}", serde_json::to_string(record)?);
    }

    screen.unmount();
    Ok(())
}
