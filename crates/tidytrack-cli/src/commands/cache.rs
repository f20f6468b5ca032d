use anyhow::Result;
use std::sync::Arc;
use tidytrack_infrastructure::AppConfig;
use tidytrack_offline::{
    HttpFetcher, LocalClients, MemoryCacheStorage, OfflineCache, OfflineConfig, Request,
};

fn offline_config(config: &AppConfig) -> OfflineConfig {
    let mut offline = OfflineConfig::default();
    if let Some(version) = &config.offline.cache_version {
        offline.cache_version = version.clone();
    }
    if let Some(assets) = &config.offline.static_assets {
        offline.static_assets = assets.clone();
    }
    offline
}

pub async fn check(config: &AppConfig, base_url: &str, paths: &[String]) -> Result<()> {
    let cache = OfflineCache::new(
        offline_config(config),
        Arc::new(HttpFetcher::new(base_url)?),
        Arc::new(MemoryCacheStorage::new()),
        Arc::new(LocalClients::new()),
    );

    match cache.start().await {
        Ok(()) => println!(
            "Installed {} ({} assets)",
            cache.config().cache_version,
            cache.config().static_assets.len()
        ),
        Err(e) => println!("Install failed, continuing uncached: {}", e),
    }

    for path in paths {
        let request = Request::get(path.as_str());
        let strategy = cache.strategy_for(&request);
        match cache.handle(&request).await {
            Ok(response) => println!(
                "{:<24} {:<24} {} ({} bytes)",
                path,
                strategy.as_str(),
                response.status,
                response.body.len()
            ),
            Err(e) => println!("{:<24} {:<24} error: {}", path, strategy.as_str(), e),
        }
    }
    Ok(())
}
