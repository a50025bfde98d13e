use scraper::{ElementRef, Selector};

use crate::error::ScrapeError;

/// First descendant matching `css`, or a `StructuralMismatch` carrying the
/// attempted selector. Use this wherever the page layout is assumed:
/// absence means the site changed shape and must surface at the lookup,
/// not as a confusing failure three steps later.
pub fn find_tag<'a>(scope: ElementRef<'a>, css: &str) -> Result<ElementRef<'a>, ScrapeError> {
    find_tag_opt(scope, css)?.ok_or_else(|| ScrapeError::StructuralMismatch {
        selector: css.to_string(),
    })
}

/// Lookup that may legitimately come up empty.
pub fn find_tag_opt<'a>(
    scope: ElementRef<'a>,
    css: &str,
) -> Result<Option<ElementRef<'a>>, ScrapeError> {
    let selector = parse_selector(css)?;
    Ok(scope.select(&selector).next())
}

/// Every descendant matching `css`, in document order.
pub fn select_all<'a>(
    scope: ElementRef<'a>,
    css: &str,
) -> Result<Vec<ElementRef<'a>>, ScrapeError> {
    let selector = parse_selector(css)?;
    Ok(scope.select(&selector).collect())
}

fn parse_selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|_| ScrapeError::BadSelector(css.to_string()))
}

/// Concatenated descendant text, trimmed.
pub fn text_of(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Flatten every run of whitespace (newlines included) into one space.
pub fn collapse_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A definition list parsed once into ordered (label, value) pairs.
/// Labels lose their trailing colon; values keep their text verbatim.
/// Replaces sibling-hopping from a matched text node with a plain lookup.
pub struct FieldList {
    pairs: Vec<(String, String)>,
}

impl FieldList {
    pub fn parse(dl: ElementRef) -> Self {
        let mut pairs = Vec::new();
        let mut label: Option<String> = None;
        for child in dl.children().filter_map(ElementRef::wrap) {
            match child.value().name() {
                "dt" => {
                    let text = text_of(child);
                    label = Some(text.trim_end_matches(':').trim_end().to_string());
                }
                "dd" => {
                    if let Some(label) = label.take() {
                        pairs.push((label, text_of(child)));
                    }
                }
                _ => {}
            }
        }
        Self { pairs }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    /// Like `get`, but the label is part of the page's assumed shape.
    pub fn require(&self, label: &str) -> Result<&str, ScrapeError> {
        self.get(label)
            .ok_or_else(|| ScrapeError::StructuralMismatch {
                selector: format!("dt `{label}`"),
            })
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::*;

    #[test]
    fn find_tag_returns_first_match() {
        let doc = Html::parse_document("<div><p>one</p><p>two</p></div>");
        let p = find_tag(doc.root_element(), "p").unwrap();
        assert_eq!(text_of(p), "one");
    }

    #[test]
    fn missing_element_is_a_structural_mismatch() {
        let doc = Html::parse_document("<div><p>one</p></div>");
        let err = find_tag(doc.root_element(), "table.docutils").unwrap_err();
        assert!(
            matches!(&err, ScrapeError::StructuralMismatch { selector } if selector == "table.docutils")
        );
    }

    #[test]
    fn optional_lookup_may_be_absent() {
        let doc = Html::parse_document("<div></div>");
        assert!(find_tag_opt(doc.root_element(), "ul").unwrap().is_none());
    }

    #[test]
    fn select_all_keeps_document_order() {
        let doc = Html::parse_document("<ul><li>a</li><li>b</li><li>c</li></ul>");
        let items = select_all(doc.root_element(), "li").unwrap();
        let texts: Vec<String> = items.into_iter().map(text_of).collect();
        assert_eq!(texts, ["a", "b", "c"]);
    }

    #[test]
    fn collapse_ws_flattens_newlines() {
        assert_eq!(collapse_ws("Editor:\n  A. Editor\nAuthor: B."), "Editor: A. Editor Author: B.");
    }

    #[test]
    fn field_list_pairs_in_order_with_colon_stripped() {
        let doc = Html::parse_document(
            "<dl class=\"rfc2822\">\
             <dt>Author<span>:</span></dt><dd>Guido</dd>\
             <dt>Status:</dt><dd>Final</dd>\
             </dl>",
        );
        let dl = find_tag(doc.root_element(), "dl.rfc2822").unwrap();
        let fields = FieldList::parse(dl);
        assert_eq!(
            fields.pairs(),
            &[
                ("Author".to_string(), "Guido".to_string()),
                ("Status".to_string(), "Final".to_string()),
            ]
        );
        assert_eq!(fields.get("Status"), Some("Final"));
    }

    #[test]
    fn required_field_failure_names_the_label() {
        let doc = Html::parse_document("<dl><dt>Author:</dt><dd>Guido</dd></dl>");
        let fields = FieldList::parse(find_tag(doc.root_element(), "dl").unwrap());
        let err = fields.require("Status").unwrap_err();
        assert!(
            matches!(&err, ScrapeError::StructuralMismatch { selector } if selector.contains("Status"))
        );
    }
}
