// crates/domain/src/text.rs

//! Text normalization for free-text matching.
//!
//! - `strip_markup`: rich text → plain text (tags dropped, entities decoded, whitespace collapsed)
//! - `fold`: lowercase + diacritic stripping + whitespace collapse; the form every needle
//!   and haystack is compared in
//! - `slugify`: fold + non-alphanumerics → `-`
//! - [`TextCache`]: identity → folded body text, filled lazily

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static SCRIPT_OR_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>").unwrap()
});

static TAG_OR_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->|<[^>]*>").unwrap());

/// Strip markup from rich text and collapse whitespace.
///
/// Script and style blocks are removed with their content; every other tag is
/// replaced by a space so adjacent block elements don't glue words together.
pub fn strip_markup(html: &str) -> String {
    let without_blocks = SCRIPT_OR_STYLE.replace_all(html, " ");
    let without_tags = TAG_OR_COMMENT.replace_all(&without_blocks, " ");
    let decoded = html_escape::decode_html_entities(&without_tags);
    collapse_whitespace(&decoded)
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase, strip diacritics and collapse whitespace.
pub fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars().flat_map(char::to_lowercase) {
        match fold_char(ch) {
            Folded::Keep => out.push(ch),
            Folded::Drop => {}
            Folded::One(c) => out.push(c),
            Folded::Two(s) => out.push_str(s),
        }
    }
    collapse_whitespace(&out)
}

/// Fold and reduce to `[a-z0-9-]`.
///
/// - "METAL"        → "metal"
/// - "Metal Roof"   → "metal-roof"
/// - " Sarasota "   → "sarasota"
/// - "Café & Co."   → "cafe-co"
pub fn slugify(text: &str) -> String {
    let folded = fold(text);
    let mut out = String::with_capacity(folded.len());
    let mut pending_dash = false;

    for ch in folded.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        } else {
            pending_dash = true;
        }
    }

    out
}

enum Folded {
    Keep,
    Drop,
    One(char),
    Two(&'static str),
}

/// Latin-1 and Latin Extended-A letters with diacritics, plus combining marks.
/// Input is already lowercase.
fn fold_char(ch: char) -> Folded {
    use Folded::*;

    match ch {
        '\u{0300}'..='\u{036f}' => Drop,
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => One('a'),
        'æ' => Two("ae"),
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => One('c'),
        'ð' | 'ď' | 'đ' => One('d'),
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => One('e'),
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => One('g'),
        'ĥ' | 'ħ' => One('h'),
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => One('i'),
        'ĵ' => One('j'),
        'ķ' => One('k'),
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => One('l'),
        'ñ' | 'ń' | 'ņ' | 'ň' => One('n'),
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => One('o'),
        'œ' => Two("oe"),
        'ŕ' | 'ŗ' | 'ř' => One('r'),
        'ś' | 'ŝ' | 'ş' | 'š' => One('s'),
        'ß' => Two("ss"),
        'ţ' | 'ť' | 'ŧ' => One('t'),
        'þ' => Two("th"),
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => One('u'),
        'ŵ' => One('w'),
        'ý' | 'ÿ' | 'ŷ' => One('y'),
        'ź' | 'ż' | 'ž' => One('z'),
        _ => Keep,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Normalized-text arena
// ─────────────────────────────────────────────────────────────────────────────

/// Folded body text keyed by item identity.
///
/// Entries are filled the first time an item's body has to be consulted and
/// reused on every later evaluation. The server scopes one cache to a request;
/// the synchronizer scopes one to a mount.
#[derive(Debug, Default)]
pub struct TextCache {
    entries: HashMap<String, String>,
}

impl TextCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folded text for `identity`, computing it from `fill` on first use.
    pub fn get_or_fill<F>(&mut self, identity: &str, fill: F) -> &str
    where
        F: FnOnce() -> String,
    {
        if !self.entries.contains_key(identity) {
            let folded = fold(&fill());
            self.entries.insert(identity.to_owned(), folded);
        }
        self.entries[identity].as_str()
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.entries.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
