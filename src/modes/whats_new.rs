use anyhow::Result;
use scraper::{ElementRef, Html};
use tracing::warn;
use url::Url;

use crate::constants::MAIN_DOC_URL;
use crate::dom::{collapse_ws, find_tag, select_all, text_of};
use crate::error::ScrapeError;
use crate::fetch::{CachedFetcher, Transport};
use crate::report::Report;

use super::progress_bar;

/// Walk the "What's New" index and the article behind each entry.
/// `None` means the index page itself could not be fetched.
pub fn collect<T: Transport>(fetcher: &CachedFetcher<T>) -> Result<Option<Report>> {
    let whats_new_url = Url::parse(MAIN_DOC_URL)?.join("whatsnew/")?;
    let Some(page) = fetcher.fetch(&whats_new_url) else {
        return Ok(None);
    };

    let doc = Html::parse_document(&page.text());
    let main_section = find_tag(doc.root_element(), "section#what-s-new-in-python")?;
    let toc = find_tag(main_section, "div.toctree-wrapper")?;
    let entries = select_all(toc, "li.toctree-l1")?;

    let mut report = Report::new(["Article link", "Title", "Editor, Author"]);
    let pb = progress_bar(entries.len());
    for entry in entries {
        pb.inc(1);
        match article_row(fetcher, &whats_new_url, entry) {
            Ok(Some(row)) => report.push(row),
            // Article unreachable: this entry is skipped, the batch goes on.
            Ok(None) => {}
            Err(e @ ScrapeError::StructuralMismatch { .. }) => {
                warn!("skipping release-notes entry: {}", e);
            }
            Err(e) => return Err(e.into()),
        }
    }
    pb.finish_and_clear();

    Ok(Some(report))
}

fn article_row<T: Transport>(
    fetcher: &CachedFetcher<T>,
    base: &Url,
    entry: ElementRef,
) -> Result<Option<Vec<String>>, ScrapeError> {
    let link = find_tag(entry, "a")?;
    let href = link.value().attr("href").unwrap_or_default();
    let article_url = base.join(href)?;

    let Some(page) = fetcher.fetch(&article_url) else {
        return Ok(None);
    };
    let doc = Html::parse_document(&page.text());
    let title = find_tag(doc.root_element(), "h1")?;
    let editors = find_tag(doc.root_element(), "dl")?;

    Ok(Some(vec![
        article_url.to_string(),
        text_of(title),
        collapse_ws(&text_of(editors)),
    ]))
}
