use anyhow::Result;
use scraper::Html;
use url::Url;

use crate::constants::MAIN_DOC_URL;
use crate::dom::find_tag;
use crate::fetch::{CachedFetcher, Transport};

/// The pdf-a4 documentation archive: final URL segment plus raw bytes.
/// Writing to disk is the caller's concern.
pub struct Archive {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub fn collect<T: Transport>(fetcher: &CachedFetcher<T>) -> Result<Option<Archive>> {
    let downloads_url = Url::parse(MAIN_DOC_URL)?.join("download.html")?;
    let Some(page) = fetcher.fetch(&downloads_url) else {
        return Ok(None);
    };

    let doc = Html::parse_document(&page.text());
    let main_region = find_tag(doc.root_element(), "div[role=\"main\"]")?;
    let table = find_tag(main_region, "table.docutils")?;
    let archive_link = find_tag(table, "a[href$=\"pdf-a4.zip\"]")?;

    let href = archive_link.value().attr("href").unwrap_or_default();
    let archive_url = downloads_url.join(href)?;
    let filename = archive_filename(&archive_url);

    let Some(archive) = fetcher.fetch(&archive_url) else {
        return Ok(None);
    };

    Ok(Some(Archive {
        filename,
        bytes: archive.body,
    }))
}

fn archive_filename(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use crate::cache::HttpCache;
    use crate::fetch::testing::ScriptedTransport;

    use super::*;

    const DOWNLOAD_URL: &str = "https://docs.python.org/3/download.html";

    const DOWNLOAD_PAGE: &str = "<html><body><div role=\"main\">\
        <table class=\"docutils\">\
        <tr><td><a href=\"archives/python-3.11-docs-pdf-letter.zip\">letter</a></td></tr>\
        <tr><td><a href=\"archives/python-3.11-docs-pdf-a4.zip\">a4</a></td></tr>\
        </table>\
        </div></body></html>";

    fn fetcher(transport: &ScriptedTransport) -> CachedFetcher<&ScriptedTransport> {
        CachedFetcher::new(transport, HttpCache::in_memory().unwrap())
    }

    #[test]
    fn filename_is_the_final_path_segment() {
        let url =
            Url::parse("https://docs.python.org/3/release/3.11/python-3.11-docs-pdf-a4.zip")
                .unwrap();
        assert_eq!(archive_filename(&url), "python-3.11-docs-pdf-a4.zip");
    }

    #[test]
    fn resolves_the_a4_archive_and_returns_its_bytes() {
        let transport = ScriptedTransport::new()
            .page(DOWNLOAD_URL, DOWNLOAD_PAGE)
            .page(
                "https://docs.python.org/3/archives/python-3.11-docs-pdf-a4.zip",
                "ZIPBYTES",
            );
        let archive = collect(&fetcher(&transport)).unwrap().unwrap();

        assert_eq!(archive.filename, "python-3.11-docs-pdf-a4.zip");
        assert_eq!(archive.bytes, b"ZIPBYTES");
    }

    #[test]
    fn unreachable_archive_yields_none() {
        let transport = ScriptedTransport::new()
            .page(DOWNLOAD_URL, DOWNLOAD_PAGE)
            .failing("https://docs.python.org/3/archives/python-3.11-docs-pdf-a4.zip");
        assert!(collect(&fetcher(&transport)).unwrap().is_none());
    }
}
