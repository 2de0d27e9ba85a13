//! Bounded-concurrency link checker
//!
//! Every sampled link gets exactly one HEAD probe. At most
//! `max_concurrent` probes are in flight at a time, gated by a semaphore the
//! same way page fetches are gated elsewhere. Each probe resolves to working
//! or broken; nothing here can fail the audit.

use crate::audit::fetcher::probe;
use reqwest::Client;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Outcome counts of one link check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkCheckSummary {
    pub working: usize,
    pub broken: usize,
}

impl LinkCheckSummary {
    pub fn total(&self) -> usize {
        self.working + self.broken
    }
}

/// Checks `urls` with HEAD probes on `client`
///
/// A link is working iff its probe answers with a status in `[200, 400)`;
/// timeouts, connection errors and every other status count as broken.
pub async fn check_links(
    client: &Client,
    urls: Vec<Url>,
    max_concurrent: usize,
    timeout: Duration,
) -> LinkCheckSummary {
    let client = client.clone();
    check_links_with(urls, max_concurrent, move |url| {
        let client = client.clone();
        async move {
            probe(&client, &url, timeout)
                .await
                .map_or(false, |response| response.is_working())
        }
    })
    .await
}

/// Runs `probe_fn` over `urls` with at most `max_concurrent` calls in flight
///
/// `probe_fn` resolves to `true` for a working link. A probe task that
/// panics is counted as broken.
pub async fn check_links_with<F, Fut>(
    urls: Vec<Url>,
    max_concurrent: usize,
    probe_fn: F,
) -> LinkCheckSummary
where
    F: Fn(Url) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    let mut summary = LinkCheckSummary::default();
    if urls.is_empty() {
        return summary;
    }

    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let probe_fn = Arc::new(probe_fn);
    let mut tasks = JoinSet::new();

    for url in urls {
        let semaphore = Arc::clone(&semaphore);
        let probe_fn = Arc::clone(&probe_fn);
        tasks.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return false;
            };
            tracing::trace!("Checking link {}", url);
            probe_fn(url).await
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(true) => summary.working += 1,
            Ok(false) => summary.broken += 1,
            Err(e) => {
                tracing::warn!("Link check task failed: {}", e);
                summary.broken += 1;
            }
        }
    }

    tracing::debug!(
        "Link check finished: {} working, {} broken",
        summary.working,
        summary.broken
    );

    summary
}
