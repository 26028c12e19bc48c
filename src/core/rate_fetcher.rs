//! USD→NPR rate lookup with cache and default fallback

use crate::core::config::DEFAULT_NPR_RATE;
use crate::core::currency::{
    CurrencyRateProvider, RateAttempt, RateResult, RateSource, is_usable_rate,
};
use crate::store::rate_cache::RateCache;
use tracing::{info, warn};

/// Walks the configured providers in order and never fails.
///
/// The first provider returning a usable rate wins and is written through to
/// the cache. With every provider down the cached value is used, and without
/// one the compiled-in default.
pub struct RateFetcher {
    providers: Vec<Box<dyn CurrencyRateProvider>>,
    cache: RateCache,
    default_rate: f64,
}

impl RateFetcher {
    pub fn new(
        providers: Vec<Box<dyn CurrencyRateProvider>>,
        cache: RateCache,
        default_rate: f64,
    ) -> Self {
        let default_rate = if is_usable_rate(default_rate) {
            default_rate
        } else {
            warn!(
                "Configured default rate {} is unusable; using {}",
                default_rate, DEFAULT_NPR_RATE
            );
            DEFAULT_NPR_RATE
        };
        RateFetcher {
            providers,
            cache,
            default_rate,
        }
    }

    pub async fn fetch(&self) -> RateResult {
        for provider in &self.providers {
            match provider.attempt().await {
                RateAttempt::Rate(value) if is_usable_rate(value) => {
                    info!("USD->NPR rate {} from {}", value, provider.name());
                    self.cache.write(value);
                    return RateResult {
                        value,
                        source: RateSource::Live,
                    };
                }
                RateAttempt::Rate(value) => {
                    warn!("Discarding unusable rate {} from {}", value, provider.name());
                }
                RateAttempt::Fail(reason) => {
                    warn!("Rate provider {} failed: {}", provider.name(), reason);
                }
            }
        }

        if let Some(value) = self.cache.read() {
            warn!("All rate providers failed; using cached rate {}", value);
            return RateResult {
                value,
                source: RateSource::Cache,
            };
        }

        warn!(
            "All rate providers failed and no cached rate; using default {}",
            self.default_rate
        );
        RateResult {
            value: self.default_rate,
            source: RateSource::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct ScriptedProvider {
        outcome: RateAttempt,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CurrencyRateProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn attempt(&self) -> RateAttempt {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn scripted(
        outcomes: Vec<RateAttempt>,
    ) -> (Vec<Box<dyn CurrencyRateProvider>>, Vec<Arc<AtomicUsize>>) {
        let counters: Vec<_> = outcomes.iter().map(|_| Arc::new(AtomicUsize::new(0))).collect();
        let providers = outcomes
            .into_iter()
            .zip(&counters)
            .map(|(outcome, calls)| {
                Box::new(ScriptedProvider {
                    outcome,
                    calls: Arc::clone(calls),
                }) as Box<dyn CurrencyRateProvider>
            })
            .collect();
        (providers, counters)
    }

    #[tokio::test]
    async fn test_first_success_stops_cascade() {
        let dir = TempDir::new().unwrap();
        let cache = RateCache::new(dir.path().join("rate.txt"));
        let (providers, calls) = scripted(vec![
            RateAttempt::Fail("down".into()),
            RateAttempt::Rate(131.0),
            RateAttempt::Rate(150.0),
        ]);

        let fetcher = RateFetcher::new(providers, cache.clone(), 140.0);
        let result = fetcher.fetch().await;

        assert_eq!(result.value, 131.0);
        assert_eq!(result.source, RateSource::Live);
        assert_eq!(cache.read(), Some(131.0));
        let counts: Vec<_> = calls.iter().map(|c| c.load(Ordering::SeqCst)).collect();
        assert_eq!(counts, vec![1, 1, 0]);
    }

    #[tokio::test]
    async fn test_unusable_rate_advances_cascade() {
        let dir = TempDir::new().unwrap();
        let cache = RateCache::new(dir.path().join("rate.txt"));
        let (providers, _) = scripted(vec![RateAttempt::Rate(-1.0), RateAttempt::Rate(132.5)]);

        let result = RateFetcher::new(providers, cache, 140.0).fetch().await;
        assert_eq!(result.value, 132.5);
        assert_eq!(result.source, RateSource::Live);
    }

    #[tokio::test]
    async fn test_exhaustion_uses_cache_without_rewriting_it() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rate.txt");
        std::fs::write(&path, "129.25").unwrap();
        let (providers, _) = scripted(vec![RateAttempt::Fail("timeout".into()); 3]);

        let result = RateFetcher::new(providers, RateCache::new(&path), 140.0)
            .fetch()
            .await;

        assert_eq!(result.value, 129.25);
        assert_eq!(result.source, RateSource::Cache);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "129.25");
    }

    #[tokio::test]
    async fn test_exhaustion_without_cache_uses_default() {
        let dir = TempDir::new().unwrap();
        let cache = RateCache::new(dir.path().join("rate.txt"));
        let (providers, _) = scripted(vec![RateAttempt::Fail("timeout".into()); 3]);

        let result = RateFetcher::new(providers, cache.clone(), 140.0).fetch().await;

        assert_eq!(result.value, 140.0);
        assert_eq!(result.source, RateSource::Default);
        assert_eq!(cache.read(), None);
    }

    #[tokio::test]
    async fn test_unusable_default_is_replaced() {
        let dir = TempDir::new().unwrap();
        let cache = RateCache::new(dir.path().join("rate.txt"));
        let result = RateFetcher::new(Vec::new(), cache, 0.0).fetch().await;
        assert_eq!(result.value, DEFAULT_NPR_RATE);
        assert_eq!(result.source, RateSource::Default);
    }

    #[tokio::test]
    async fn test_no_providers_configured() {
        let dir = TempDir::new().unwrap();
        let cache = RateCache::new(dir.path().join("rate.txt"));
        let result = RateFetcher::new(Vec::new(), cache, 140.0).fetch().await;
        assert_eq!(result.source, RateSource::Default);
    }
}
