// ── Connection selection ──
//
// Picks the active host from an ordered candidate list. All candidates are
// probed concurrently; the earliest candidate in list order that answers
// its health endpoint with 2xx wins, regardless of which answered first.

use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join_all;
use playvault_api::SdkContext;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::CoreError;
use crate::events::{ConnectionFailed, ConnectionSelected, topics};

/// Default health endpoint probed on each candidate.
pub const DEFAULT_HEALTH_PATH: &str = "/health";

/// Probe `candidates` and install the first healthy one as the active host.
///
/// Publishes `connection.selected` on success. When nothing answers,
/// publishes `connection.failed`, leaves the session untouched and returns
/// [`CoreError::NoReachableHost`].
pub async fn select_host(
    context: &SdkContext,
    http: &reqwest::Client,
    candidates: &[Url],
    health_path: &str,
) -> Result<Url, CoreError> {
    if candidates.is_empty() {
        return Err(CoreError::NoHostsConfigured);
    }

    let started = Instant::now();
    let results = join_all(
        candidates
            .iter()
            .map(|host| probe(http, host, health_path)),
    )
    .await;

    let mut attempts = Vec::with_capacity(candidates.len());
    for (host, result) in candidates.iter().zip(results) {
        match result {
            Ok(()) => {
                let elapsed = started.elapsed();
                info!(host = %host, elapsed_ms = elapsed.as_millis(), "connection selected");
                context.session().set_active_host(host.clone());
                context.bus().publish(
                    topics::CONNECTION_SELECTED,
                    &Arc::new(ConnectionSelected {
                        host: host.clone(),
                        elapsed,
                    }),
                );
                return Ok(host.clone());
            }
            Err(reason) => {
                debug!(host = %host, %reason, "health probe failed");
                attempts.push((host.clone(), reason));
            }
        }
    }

    warn!(candidates = candidates.len(), "no reachable host");
    context.bus().publish(
        topics::CONNECTION_FAILED,
        &Arc::new(ConnectionFailed { attempts }),
    );
    Err(CoreError::NoReachableHost {
        candidates: candidates.iter().map(ToString::to_string).collect(),
    })
}

async fn probe(http: &reqwest::Client, host: &Url, health_path: &str) -> Result<(), String> {
    let url = format!(
        "{}/{}",
        host.as_str().trim_end_matches('/'),
        health_path.trim_start_matches('/')
    );
    match http.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => Ok(()),
        Ok(resp) => Err(format!("HTTP {}", resp.status().as_u16())),
        Err(e) => Err(e.to_string()),
    }
}
