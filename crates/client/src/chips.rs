// crates/client/src/chips.rs

//! Removable chips for the current selections.

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::fmt::Write as _;

/// Matches a rendered chip.
pub const CHIP_SELECTOR: &str = "[data-chip][data-value]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip {
    pub taxonomy: String,
    pub slug: String,
    pub label: String,
}

pub fn render_chips(chips: &[Chip]) -> String {
    let mut out = String::new();
    for chip in chips {
        let _ = write!(
            out,
            r#"<button type="button" class="discovery-chip" data-chip="{}" data-value="{}" aria-label="Remove {}">{}</button>"#,
            attr(&chip.taxonomy),
            attr(&chip.slug),
            attr(&chip.label),
            text(&chip.label),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_button_per_chip() {
        let html = render_chips(&[
            Chip {
                taxonomy: "bucket".into(),
                slug: "accolades".into(),
                label: "Accolades".into(),
            },
            Chip {
                taxonomy: "material_type".into(),
                slug: "metal".into(),
                label: "Metal & Steel".into(),
            },
        ]);

        assert_eq!(html.matches("<button").count(), 2);
        assert!(html.contains(r#"data-chip="bucket" data-value="accolades""#));
        assert!(html.contains(">Metal &amp; Steel</button>"));
    }

    #[test]
    fn no_chips_no_markup() {
        assert_eq!(render_chips(&[]), "");
    }
}
