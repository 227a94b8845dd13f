// src/query.rs

use serde::{Deserialize, Serialize};

/// Paging window forwarded to the backend list call.
///
/// Pages are 1-based. `page = 0` is accepted and read by backends as the
/// first page; `limit = 0` means "no limit".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationParams {
    pub limit: u64,
    pub page: u64,
}

impl PaginationParams {
    /// Number of records to skip for this window.
    pub fn offset(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Applies the window to an already ordered sequence.
    pub fn window<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let iter = items.into_iter().skip(self.offset() as usize);
        if self.limit == 0 {
            iter.collect()
        } else {
            iter.take(self.limit as usize).collect()
        }
    }
}

/// Defaults and bounds applied while parsing `page` / `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationPolicy {
    pub default_limit: u64,
    pub default_page: u64,
    pub max_limit: u64,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            default_limit: 10,
            default_page: 1,
            max_limit: 100,
        }
    }
}

/// Parses `page` and `limit` out of raw query pairs.
///
/// Every malformed parameter is reported, not just the first one. Keys other
/// than `page` and `limit` are ignored; for repeated keys the first value wins.
pub fn parse_pagination(
    pairs: &[(String, String)],
    policy: &PaginationPolicy,
) -> Result<PaginationParams, Vec<String>> {
    let mut params = PaginationParams {
        limit: policy.default_limit,
        page: policy.default_page,
    };
    let mut errors = Vec::new();
    let mut seen_page = false;
    let mut seen_limit = false;

    for (key, value) in pairs {
        match key.as_str() {
            "page" if !seen_page => {
                seen_page = true;
                match parse_count(value) {
                    Some(page) => params.page = page,
                    None => errors.push(format!(
                        "invalid `page` param {:?}: expected a non-negative integer",
                        value
                    )),
                }
            }
            "limit" if !seen_limit => {
                seen_limit = true;
                match parse_count(value) {
                    Some(limit) if limit > policy.max_limit => errors.push(format!(
                        "invalid `limit` param {:?}: must not exceed {}",
                        value, policy.max_limit
                    )),
                    Some(limit) => params.limit = limit,
                    None => errors.push(format!(
                        "invalid `limit` param {:?}: expected a non-negative integer",
                        value
                    )),
                }
            }
            _ => {}
        }
    }

    if errors.is_empty() {
        Ok(params)
    } else {
        Err(errors)
    }
}

fn parse_count(raw: &str) -> Option<u64> {
    // u64's FromStr takes a leading '+', which is not a count.
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
