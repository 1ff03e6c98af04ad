//! Page fetching for the command line. Detection itself never does I/O.

use std::time::Duration;

use once_cell::sync::Lazy;
use ureq::ResponseExt;

use crate::error::Result;

/// Default HTTP request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; jobscout/0.1)";

/// Shared HTTP agent for connection pooling
static HTTP_AGENT: Lazy<ureq::Agent> = Lazy::new(|| {
    ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)))
        .build()
        .into()
});

/// Raw HTML fetched over HTTP
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,
    pub html: String,
}

/// GET a page. Client-rendered boards may return a shell without the posting;
/// save the rendered page from a browser for those.
pub fn fetch_html(url: &str) -> Result<FetchedPage> {
    let response = HTTP_AGENT.get(url).header("User-Agent", USER_AGENT).call()?;
    let final_url = response.get_uri().to_string();
    let html = response.into_body().read_to_string()?;

    Ok(FetchedPage {
        url: final_url,
        html,
    })
}
