use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use scraper::Html;
use url::Url;

use crate::constants::MAIN_DOC_URL;
use crate::dom::{find_tag, select_all, text_of};
use crate::error::ScrapeError;
use crate::fetch::{CachedFetcher, Transport};
use crate::report::Report;

static VERSION_STATUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Python (?P<version>\d\.\d+) \((?P<status>.*)\)").unwrap());

/// Read the version/status list from the main page sidebar.
pub fn collect<T: Transport>(fetcher: &CachedFetcher<T>) -> Result<Option<Report>> {
    let main_url = Url::parse(MAIN_DOC_URL)?;
    let Some(page) = fetcher.fetch(&main_url) else {
        return Ok(None);
    };

    let doc = Html::parse_document(&page.text());
    let sidebar = find_tag(doc.root_element(), "div.sphinxsidebarwrapper")?;

    // The sidebar holds several link lists; only the one carrying the
    // "All versions" entry enumerates every release. Without it there is
    // no sensible partial result.
    let mut version_links = None;
    for list in select_all(sidebar, "ul")? {
        if text_of(list).contains("All versions") {
            version_links = Some(select_all(list, "a")?);
            break;
        }
    }
    let Some(links) = version_links else {
        return Err(ScrapeError::VersionListNotFound.into());
    };

    let mut report = Report::new(["Documentation link", "Version", "Status"]);
    for link in links {
        let href = link.value().attr("href").unwrap_or_default();
        let (version, status) = split_version_status(&text_of(link));
        report.push(vec![href.to_string(), version, status]);
    }

    Ok(Some(report))
}

/// "Python 3.11 (stable)" → ("3.11", "stable"); anything else is taken
/// verbatim as the version, with an empty status.
fn split_version_status(text: &str) -> (String, String) {
    match VERSION_STATUS_RE.captures(text) {
        Some(caps) => (caps["version"].to_string(), caps["status"].to_string()),
        None => (text.to_string(), String::new()),
    }
}
