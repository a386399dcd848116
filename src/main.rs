use anyhow::Context;
use estate_search::config::Config;
use estate_search::fetchers::{ApiFetcher, ListingsFetcher, MemoryFetcher};
use estate_search::filters::{FilterSync, MemoryRouter};
use estate_search::pagination::{page_window, PageItem};
use estate_search::search::SearchSession;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🏠 Estate Search");
    info!("================");

    let config = Config::load();

    // Usage: estate-search [query string] [page]
    let mut args = std::env::args().skip(1);
    let query = args.next().unwrap_or_default();
    let page = args.next().and_then(|p| p.parse::<u32>().ok());

    let fetcher: Box<dyn ListingsFetcher> = match &config.api_url {
        Some(url) => Box::new(ApiFetcher::from_config(url, &config)?),
        None => {
            let fetcher = MemoryFetcher::sample(config.page_size);
            info!("🔍 Searching {} sample listings", fetcher.len());
            Box::new(fetcher)
        }
    };

    let sync = FilterSync::with_policy(MemoryRouter::new(query), config.guard_policy);
    let mut session = SearchSession::new(sync, fetcher);
    if let Some(page) = page {
        session.set_page(page);
    }

    let results = session.refresh().await?;

    info!("✅ Found {} listings", results.total);
    println!();
    for (i, listing) in results.listings.iter().enumerate() {
        println!("{}. {} ({} kr)", i + 1, listing.title, listing.price);
        println!("   {}", listing.address);
        println!(
            "   {} bedrooms, {} bathrooms, {} kvm",
            listing.bedrooms, listing.bathrooms, listing.area
        );
        if !listing.amenities.is_empty() {
            let amenities: Vec<&str> = listing.amenities.iter().map(|a| a.key()).collect();
            println!("   Amenities: {}", amenities.join(", "));
        }
        println!("   URL: {}", listing.url);
        println!();
    }

    let window: Vec<String> = page_window(results.page, results.total_pages(), 1)
        .into_iter()
        .map(|item| match item {
            PageItem::Page(n) if n == results.page => format!("[{n}]"),
            PageItem::Page(n) => n.to_string(),
            PageItem::Ellipsis => "…".to_string(),
        })
        .collect();
    if !window.is_empty() {
        println!("Pages: {}", window.join(" "));
    }

    if let Some(path) = &config.output {
        let json = serde_json::to_string_pretty(&results)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("💾 Saved results to {}", path.display());
    }

    Ok(())
}
