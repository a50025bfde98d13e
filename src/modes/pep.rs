use anyhow::Result;
use scraper::{ElementRef, Html};
use tracing::{info, warn};
use url::Url;

use crate::constants::{expected_statuses, PEP_ZERO_URL};
use crate::dom::{find_tag, select_all, text_of, FieldList};
use crate::error::ScrapeError;
use crate::fetch::{CachedFetcher, Transport};
use crate::report::Report;

use super::progress_bar;

/// Status occurrence counts in first-encountered order, with an explicit
/// increment-or-insert so no entry exists before it is seen.
struct StatusHistogram {
    counts: Vec<(String, usize)>,
}

impl StatusHistogram {
    fn new() -> Self {
        Self { counts: Vec::new() }
    }

    fn bump(&mut self, status: &str) {
        match self.counts.iter_mut().find(|(s, _)| s == status) {
            Some((_, n)) => *n += 1,
            None => self.counts.push((status.to_string(), 1)),
        }
    }

    fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}

struct Mismatch {
    link: String,
    status: String,
    expected: &'static [&'static str],
}

/// Everything learned from one index row's detail page.
struct PepRow {
    preview_code: String,
    link: String,
    status: String,
}

struct Reconciliation {
    histogram: StatusHistogram,
    mismatches: Vec<Mismatch>,
}

/// Cross-validate the index's preview status against each detail page's
/// authoritative Status field and aggregate the outcome.
pub fn collect<T: Transport>(fetcher: &CachedFetcher<T>) -> Result<Option<Report>> {
    let index_url = Url::parse(PEP_ZERO_URL)?;
    let Some(page) = fetcher.fetch(&index_url) else {
        return Ok(None);
    };

    let doc = Html::parse_document(&page.text());
    let index = find_tag(doc.root_element(), "section#numerical-index")?;
    let table = find_tag(index, "table.pep-zero-table")?;
    let body = find_tag(table, "tbody")?;
    let rows = select_all(body, "tr")?;

    let outcome = reconcile(fetcher, &index_url, &rows)?;
    report_mismatches(&outcome.mismatches);

    let mut report = Report::new(["Status", "Count"]);
    for (status, count) in &outcome.histogram.counts {
        report.push(vec![status.clone(), count.to_string()]);
    }
    report.push(vec![
        "Total:".to_string(),
        outcome.histogram.total().to_string(),
    ]);
    Ok(Some(report))
}

fn reconcile<T: Transport>(
    fetcher: &CachedFetcher<T>,
    base: &Url,
    rows: &[ElementRef],
) -> Result<Reconciliation> {
    let mut histogram = StatusHistogram::new();
    let mut mismatches: Vec<Mismatch> = Vec::new();

    let pb = progress_bar(rows.len());
    for row in rows {
        pb.inc(1);
        let extracted = match pep_row(fetcher, base, *row) {
            Ok(Some(extracted)) => extracted,
            // Detail page unreachable: the row counts for nothing.
            Ok(None) => continue,
            Err(e @ ScrapeError::StructuralMismatch { .. }) => {
                warn!("skipping index row: {}", e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        histogram.bump(&extracted.status);

        let expected = expected_statuses(&extracted.preview_code)
            .ok_or_else(|| ScrapeError::UnknownStatusCode(extracted.preview_code.clone()))?;
        if !expected.contains(&extracted.status.as_str()) {
            mismatches.push(Mismatch {
                link: extracted.link,
                status: extracted.status,
                expected,
            });
        }
    }
    pb.finish_and_clear();

    Ok(Reconciliation {
        histogram,
        mismatches,
    })
}

fn pep_row<T: Transport>(
    fetcher: &CachedFetcher<T>,
    base: &Url,
    row: ElementRef,
) -> Result<Option<PepRow>, ScrapeError> {
    // First column: a type glyph followed by the status code; only the
    // code is significant.
    let first_cell = find_tag(row, "td")?;
    let preview_code: String = text_of(first_cell).chars().skip(1).collect();

    let link = find_tag(row, "a")?;
    let href = link.value().attr("href").unwrap_or_default();
    let detail_url = base.join(href)?;

    let Some(page) = fetcher.fetch(&detail_url) else {
        return Ok(None);
    };
    let doc = Html::parse_document(&page.text());
    let content = find_tag(doc.root_element(), "section#pep-content")?;
    let fields = FieldList::parse(find_tag(content, "dl.rfc2822")?);
    let status = fields.require("Status")?.to_string();

    Ok(Some(PepRow {
        preview_code,
        link: detail_url.to_string(),
        status,
    }))
}

/// One aggregated block per run, never one log line per mismatch.
fn report_mismatches(mismatches: &[Mismatch]) {
    if mismatches.is_empty() {
        return;
    }
    let mut block = String::from("Mismatched statuses:");
    for m in mismatches {
        block.push_str(&format!(
            "\n{}\nCard status: {}\nExpected statuses: {:?}",
            m.link, m.status, m.expected
        ));
    }
    info!("{}", block);
}
