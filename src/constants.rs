pub const MAIN_DOC_URL: &str = "https://docs.python.org/3/";
pub const PEP_ZERO_URL: &str = "https://peps.python.org/";

pub const CACHE_PATH: &str = "data/http_cache.sqlite";
pub const DOWNLOADS_DIR: &str = "downloads";
pub const RESULTS_DIR: &str = "results";

/// Authoritative statuses considered consistent with a preview code from
/// the PEP numerical index. The empty code is an index row whose first
/// column carries only the type glyph. `None` means the table is stale
/// and the caller must fail, not guess.
pub fn expected_statuses(code: &str) -> Option<&'static [&'static str]> {
    Some(match code {
        "A" => &["Active", "Accepted"],
        "D" => &["Deferred"],
        "F" => &["Final"],
        "P" => &["Provisional"],
        "R" => &["Rejected"],
        "S" => &["Superseded"],
        "W" => &["Withdrawn"],
        "" => &["Draft", "Active"],
        _ => return None,
    })
}
