//! Egress proxy selection
//!
//! Every request draws a proxy independently and uniformly from the pool.
//! There is no stickiness, no exhaustion tracking and no health checking.

use rand::seq::IndexedRandom;

/// Picks a proxy for one request
///
/// Returns `None` for an empty pool, meaning a direct connection.
pub fn select_proxy(pool: &[String]) -> Option<&str> {
    pool.choose(&mut rand::rng()).map(String::as_str)
}

/// Turns a pool entry (`host:port`) into a proxy URL reqwest accepts
pub(crate) fn proxy_url(proxy: &str) -> String {
    if proxy.contains("://") {
        proxy.to_string()
    } else {
        format!("http://{}", proxy)
    }
}
