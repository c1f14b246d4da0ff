// crates/serve/src/paginate.rs

//! Sorting, slicing and the opaque page cursor.
//!
//! A cursor is `base64("arrayconnection:<offset>")`. `endCursor` encodes the
//! offset of the first item *after* the page, so it can be passed straight
//! back as `after`. Anything that doesn't decode is offset 0.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use domain::item::NormalizedItem;
use domain::page::PageInfo;
use std::cmp::Ordering;

const CURSOR_PREFIX: &str = "arrayconnection:";

pub fn encode_cursor(offset: usize) -> String {
    STANDARD.encode(format!("{CURSOR_PREFIX}{offset}"))
}

pub fn decode_cursor(cursor: Option<&str>) -> usize {
    cursor
        .and_then(|c| STANDARD.decode(c.trim()).ok())
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .and_then(|s| s.strip_prefix(CURSOR_PREFIX)?.parse::<usize>().ok())
        .unwrap_or(0)
}

/// `first` clamped to `1..=max_first`.
pub fn clamp_first(first: Option<usize>, max_first: usize) -> usize {
    let max_first = max_first.max(1);
    first.unwrap_or(max_first).clamp(1, max_first)
}

/// Publish date descending, identity ascending on ties.
pub fn compare(a: &NormalizedItem, b: &NormalizedItem) -> Ordering {
    b.published_at
        .cmp(&a.published_at)
        .then_with(|| a.id.cmp(&b.id))
}

pub fn sort_items(items: &mut [NormalizedItem]) {
    items.sort_by(compare);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<NormalizedItem>,
    pub page_info: PageInfo,
    pub total: usize,
}

/// Slice an already sorted and filtered collection. `first` must already be
/// clamped.
pub fn paginate(sorted: Vec<NormalizedItem>, after: Option<&str>, first: usize) -> Page {
    let total = sorted.len();
    let offset = decode_cursor(after);

    let items: Vec<NormalizedItem> = sorted.into_iter().skip(offset).take(first).collect();
    let returned = items.len();

    Page {
        page_info: PageInfo {
            has_next_page: offset + returned < total,
            end_cursor: (returned > 0).then(|| encode_cursor(offset + returned)),
            truncated: false,
        },
        items,
        total,
    }
}
