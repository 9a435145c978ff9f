use std::time::Duration;
use tokio::net::lookup_host;
use tokio::time::timeout;
use tracing::debug;
use url::Url;

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

// An unparseable url counts as connected so the request itself fails on it.
pub async fn is_connected(request_url: &str) -> bool {
    let Ok(url) = Url::parse(request_url) else {
        return true;
    };
    let Some(host) = url.host_str() else {
        return true;
    };
    let port = url.port_or_known_default().unwrap_or(443);

    match timeout(PROBE_TIMEOUT, lookup_host((host, port))).await {
        Ok(Ok(mut addrs)) => addrs.next().is_some(),
        Ok(Err(err)) => {
            debug!(host, error = %err, "host lookup failed");
            false
        }
        Err(_) => {
            debug!(host, "host lookup timed out");
            false
        }
    }
}
