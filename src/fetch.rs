use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::cache::HttpCache;

/// One HTTP response as stored and replayed: status, headers, raw body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl PageResponse {
    /// Body decoded as UTF-8, lossily. The documentation sites serve UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Blocking GET against a single URL. Production talks HTTP; tests
/// substitute a scripted transport.
pub trait Transport {
    fn get(&self, url: &Url) -> Result<PageResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &Url) -> Result<PageResponse> {
        (**self).get(url)
    }
}

pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("pydocs_scraper/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &Url) -> Result<PageResponse> {
        let response = self.client.get(url.clone()).send()?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes()?.to_vec();
        Ok(PageResponse {
            status,
            headers,
            body,
        })
    }
}

/// Cache-first page retrieval with transport-fault isolation: a failed
/// fetch is logged and returned as `None`, and callers treat that as
/// "skip this page, continue the batch".
pub struct CachedFetcher<T> {
    transport: T,
    cache: HttpCache,
}

impl<T: Transport> CachedFetcher<T> {
    pub fn new(transport: T, cache: HttpCache) -> Self {
        Self { transport, cache }
    }

    pub fn cache(&self) -> &HttpCache {
        &self.cache
    }

    pub fn fetch(&self, url: &Url) -> Option<PageResponse> {
        match self.cache.get("GET", url.as_str()) {
            Ok(Some(hit)) => {
                debug!("cache hit for {}", url);
                return Some(hit);
            }
            Ok(None) => {}
            Err(e) => warn!("cache read failed for {}: {}", url, e),
        }

        match self.transport.get(url) {
            Ok(response) => {
                if let Err(e) = self.cache.put("GET", url.as_str(), &response) {
                    warn!("cache write failed for {}: {}", url, e);
                }
                Some(response)
            }
            Err(e) => {
                warn!("failed to fetch {}: {}", url, e);
                None
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use url::Url;

    use super::testing::ScriptedTransport;
    use super::*;

    const PAGE: &str = "https://example.test/page";

    #[test]
    fn second_fetch_is_served_from_cache() {
        let transport = ScriptedTransport::new().page(PAGE, "<html>body</html>");
        let fetcher = CachedFetcher::new(&transport, HttpCache::in_memory().unwrap());
        let url = Url::parse(PAGE).unwrap();

        let first = fetcher.fetch(&url).unwrap();
        let second = fetcher.fetch(&url).unwrap();

        assert_eq!(first, second);
        assert_eq!(transport.calls_to(PAGE), 1);
    }

    #[test]
    fn clear_forces_a_refetch() {
        let transport = ScriptedTransport::new().page(PAGE, "<html>body</html>");
        let fetcher = CachedFetcher::new(&transport, HttpCache::in_memory().unwrap());
        let url = Url::parse(PAGE).unwrap();

        fetcher.fetch(&url).unwrap();
        fetcher.cache().clear().unwrap();
        fetcher.fetch(&url).unwrap();

        assert_eq!(transport.calls_to(PAGE), 2);
    }

    #[test]
    fn transport_fault_is_absorbed_and_not_cached() {
        let transport = ScriptedTransport::new().failing(PAGE);
        let fetcher = CachedFetcher::new(&transport, HttpCache::in_memory().unwrap());
        let url = Url::parse(PAGE).unwrap();

        assert!(fetcher.fetch(&url).is_none());
        // A fault leaves nothing behind, so the next call tries again.
        assert!(fetcher.fetch(&url).is_none());
        assert_eq!(transport.calls_to(PAGE), 2);
    }
}
