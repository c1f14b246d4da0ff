// crates/client/src/selector.rs

//! Compound selectors.
//!
//! Supported: `tag`, `#id`, `.class`, `[attr]`, `[attr=value]`,
//! `[attr="value"]`, any combination of those without whitespace, and
//! comma-separated lists of them. `*` matches any element. Combinators are
//! not supported.

use crate::SyncError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrTest {
    Present(String),
    Equals(String, String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Compound>,
}

/// What a selector needs to know about an element.
pub trait ElementView {
    fn tag_name(&self) -> &str;
    fn attribute(&self, name: &str) -> Option<&str>;
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SyncError> {
        let invalid = |reason: &str| SyncError::InvalidSelector {
            selector: source.to_owned(),
            reason: reason.to_owned(),
        };

        let mut alternatives = Vec::new();
        for part in source.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(invalid("empty selector"));
            }
            if part.chars().any(char::is_whitespace) && !part.contains('[') {
                return Err(invalid("combinators are not supported"));
            }
            alternatives.push(parse_compound(part).map_err(|r| invalid(&r))?);
        }

        Ok(Self {
            source: source.to_owned(),
            alternatives,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, el: &impl ElementView) -> bool {
        self.alternatives.iter().any(|c| c.matches(el))
    }
}

impl Compound {
    fn matches(&self, el: &impl ElementView) -> bool {
        if let Some(tag) = &self.tag {
            if !el.tag_name().eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.attribute("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class = el.attribute("class").unwrap_or("");
            if !self
                .classes
                .iter()
                .all(|c| class.split_whitespace().any(|have| have == c))
            {
                return false;
            }
        }
        self.attrs.iter().all(|test| match test {
            AttrTest::Present(name) => el.attribute(name).is_some(),
            AttrTest::Equals(name, value) => el.attribute(name) == Some(value.as_str()),
        })
    }
}

fn is_ident(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(input: &str) -> Result<Compound, String> {
    let mut out = Compound::default();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    let ident = |i: &mut usize| -> String {
        let start = *i;
        while *i < chars.len() && is_ident(chars[*i]) {
            *i += 1;
        }
        chars[start..*i].iter().collect()
    };

    if i < chars.len() && chars[i] == '*' {
        i += 1;
    } else if i < chars.len() && is_ident(chars[i]) {
        out.tag = Some(ident(&mut i).to_ascii_lowercase());
    }

    while i < chars.len() {
        match chars[i] {
            '#' => {
                i += 1;
                let id = ident(&mut i);
                if id.is_empty() {
                    return Err("empty id".into());
                }
                out.id = Some(id);
            }
            '.' => {
                i += 1;
                let class = ident(&mut i);
                if class.is_empty() {
                    return Err("empty class".into());
                }
                out.classes.push(class);
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|c| *c == ']')
                    .map(|p| i + p)
                    .ok_or("unterminated attribute selector")?;
                let body: String = chars[i + 1..close].iter().collect();
                out.attrs.push(parse_attr(&body)?);
                i = close + 1;
            }
            c => return Err(format!("unexpected `{c}`")),
        }
    }

    Ok(out)
}

fn parse_attr(body: &str) -> Result<AttrTest, String> {
    let (name, value) = match body.split_once('=') {
        Some((n, v)) => (n.trim(), Some(v.trim())),
        None => (body.trim(), None),
    };

    if name.is_empty() || !name.chars().all(is_ident) {
        return Err(format!("bad attribute name `{name}`"));
    }
    let name = name.to_ascii_lowercase();

    match value {
        None => Ok(AttrTest::Present(name)),
        Some(v) => {
            let unquoted = v
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| v.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(v);
            Ok(AttrTest::Equals(name, unquoted.to_owned()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct El {
        tag: &'static str,
        attrs: Vec<(&'static str, &'static str)>,
    }

    impl ElementView for El {
        fn tag_name(&self) -> &str {
            self.tag
        }

        fn attribute(&self, name: &str) -> Option<&str> {
            self.attrs.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
        }
    }

    fn button() -> El {
        El {
            tag: "button",
            attrs: vec![
                ("class", "chip facet"),
                ("data-facet", "bucket"),
                ("data-value", "accolades"),
                ("id", "b1"),
            ],
        }
    }

    #[test]
    fn compound_parts_all_have_to_match() {
        let el = button();
        assert!(Selector::parse("button").unwrap().matches(&el));
        assert!(Selector::parse("BUTTON.facet#b1").unwrap().matches(&el));
        assert!(Selector::parse("[data-facet][data-value]").unwrap().matches(&el));
        assert!(Selector::parse(r#"[data-facet="bucket"]"#).unwrap().matches(&el));
        assert!(Selector::parse("[data-facet=bucket].chip").unwrap().matches(&el));
        assert!(!Selector::parse("[data-facet=material_type]").unwrap().matches(&el));
        assert!(!Selector::parse("a.facet").unwrap().matches(&el));
        assert!(!Selector::parse(".missing").unwrap().matches(&el));
    }

    #[test]
    fn lists_match_any_alternative() {
        let sel = Selector::parse("article, button.chip").unwrap();
        assert!(sel.matches(&button()));
        assert!(Selector::parse("*").unwrap().matches(&button()));
    }

    #[test]
    fn bad_selectors_are_rejected() {
        for bad in ["", "div > p", "div p", "[unterminated", "#", "a,", "[=x]"] {
            assert!(
                matches!(Selector::parse(bad), Err(SyncError::InvalidSelector { .. })),
                "{bad}"
            );
        }
    }
}
