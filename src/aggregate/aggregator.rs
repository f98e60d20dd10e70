//! Sequential fetch orchestration and per-platform result store.

use crate::models::{Platform, PlatformResult};
use crate::sources::SourceFetcher;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::info;

/// Pause between two consecutive platform fetches.
pub const FETCH_PAUSE: Duration = Duration::from_secs(2);

/// Fetch results keyed by platform, iterated in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedResults {
    results: BTreeMap<Platform, PlatformResult>,
}

impl AggregatedResults {
    /// Store a platform result, replacing any previous one.
    pub fn insert(&mut self, result: PlatformResult) {
        self.results.insert(result.platform, result);
    }

    pub fn get(&self, platform: Platform) -> Option<&PlatformResult> {
        self.results.get(&platform)
    }

    /// Results in display order.
    pub fn iter(&self) -> impl Iterator<Item = &PlatformResult> {
        self.results.values()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Item count per platform, in display order.
    pub fn counts(&self) -> Vec<(Platform, usize)> {
        self.iter().map(|r| (r.platform, r.len())).collect()
    }

    /// One line per platform, e.g. `  知乎: 15 条`.
    pub fn summary_lines(&self) -> Vec<String> {
        self.counts()
            .into_iter()
            .map(|(platform, count)| format!("  {}: {} 条", platform, count))
            .collect()
    }
}

impl FromIterator<PlatformResult> for AggregatedResults {
    fn from_iter<I: IntoIterator<Item = PlatformResult>>(iter: I) -> Self {
        let mut aggregated = Self::default();
        for result in iter {
            aggregated.insert(result);
        }
        aggregated
    }
}

/// Runs every platform fetch one after another with a fixed pause.
pub struct Aggregator {
    fetcher: SourceFetcher,
    pause: Duration,
}

impl Aggregator {
    pub fn new(fetcher: SourceFetcher) -> Self {
        Self {
            fetcher,
            pause: FETCH_PAUSE,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Fetch all platforms in order. Always yields one entry per platform.
    pub async fn fetch_all(&self) -> AggregatedResults {
        let mut aggregated = AggregatedResults::default();

        for (idx, platform) in Platform::ALL.into_iter().enumerate() {
            if idx > 0 {
                tokio::time::sleep(self.pause).await;
            }

            println!("🚀 Fetching {}...", platform);
            let outcome = self.fetcher.fetch(platform).await;

            if outcome.success {
                println!("✅ {}: {} items", platform, outcome.result.len());
            } else {
                println!("❌ {}: fetch failed", platform);
            }

            aggregated.insert(outcome.result);
        }

        for (platform, count) in aggregated.counts() {
            info!(platform = platform.label(), items = count, "fetch summary");
        }

        aggregated
    }
}
