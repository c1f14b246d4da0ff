// crates/serve/src/render.rs

//! Item-card and facet-control markup.
//!
//! This is the DOM contract the client synchronizer reads back:
//!
//! ```text
//! <article data-id="video:a" data-title="…" data-bucket="accolades|…"
//!          data-search-template="search-video_3a_a">
//!   …visible card…
//!   <template id="search-video_3a_a">tag names, excerpt and body text</template>
//! </article>
//!
//! <button type="button" data-facet="bucket" data-value="accolades"
//!         aria-pressed="false" data-count="3">Accolades</button>
//! ```

use domain::facet::FacetGroup;
use domain::item::NormalizedItem;
use domain::query::FilterQuery;
use domain::taxonomy::{data_attribute, TAG_SEPARATOR};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::fmt::Write as _;

/// Id of the `<template>` holding an item's searchable text.
///
/// ASCII letters, digits and `-` are kept; every other character, `_`
/// included, becomes `_<hex>_`, so distinct identities never share an id.
pub fn template_id(item_id: &str) -> String {
    let mut id = String::from("search-");
    for c in item_id.chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            id.push(c);
        } else {
            let _ = write!(id, "_{:x}_", u32::from(c));
        }
    }
    id
}

/// One `<article>` per item. `taxonomies` lists the `data-*` tag attributes
/// to emit; taxonomies an item doesn't carry are left off.
pub fn render_cards(items: &[NormalizedItem], taxonomies: &[&str]) -> String {
    let mut out = String::new();
    for item in items {
        render_card(&mut out, item, taxonomies);
    }
    out
}

fn render_card(out: &mut String, item: &NormalizedItem, taxonomies: &[&str]) {
    let template = template_id(&item.id);

    let _ = write!(
        out,
        r#"<article class="discovery-item" data-id="{}" data-title="{}" data-published="{}""#,
        attr(&item.id),
        attr(&item.title),
        item.published_at.format("%Y-%m-%d"),
    );

    for taxonomy in taxonomies {
        let slugs: Vec<&str> = item.tag_slugs(taxonomy).collect();
        if slugs.is_empty() {
            continue;
        }
        let joined = slugs.join(&TAG_SEPARATOR.to_string());
        let _ = write!(out, r#" {}="{}""#, data_attribute(taxonomy), attr(&joined));
    }

    let _ = write!(out, r#" data-search-template="{}">"#, attr(&template));

    let _ = write!(out, r#"<h3 class="discovery-item__title">{}</h3>"#, text(&item.title));
    if !item.excerpt_text.is_empty() {
        let _ = write!(
            out,
            r#"<p class="discovery-item__excerpt">{}</p>"#,
            text(&item.excerpt_text)
        );
    }
    if let Some(video) = &item.video {
        let _ = write!(
            out,
            r#"<div class="discovery-item__video" data-embed="{}"></div>"#,
            attr(&video.embed_url())
        );
    }

    let names: Vec<&str> = item
        .tags
        .values()
        .flat_map(|m| m.values().map(String::as_str))
        .collect();
    let searchable = [names.join(" "), item.excerpt_text.clone(), item.body_text.clone()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let _ = write!(
        out,
        r#"<template id="{}">{}</template></article>"#,
        attr(&template),
        text(&searchable)
    );
}

/// Toggle buttons for every facet bucket, pressed where `query` selects them.
pub fn render_facets(groups: &[FacetGroup], query: &FilterQuery) -> String {
    let mut out = String::new();
    for group in groups {
        let _ = write!(
            out,
            r#"<fieldset class="discovery-facet" data-facet-group="{}">"#,
            attr(&group.taxonomy)
        );
        for bucket in &group.buckets {
            let pressed = query.is_selected(&group.taxonomy, &bucket.slug);
            let _ = write!(
                out,
                r#"<button type="button" data-facet="{}" data-value="{}" aria-pressed="{}" data-count="{}">{}</button>"#,
                attr(&group.taxonomy),
                attr(&bucket.slug),
                pressed,
                bucket.count,
                text(&bucket.name),
            );
        }
        out.push_str("</fieldset>");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use domain::facet::FacetBucket;
    use domain::item::{PoolKind, VideoPlatform, VideoRef};
    use domain::taxonomy::{TagMap, BUCKET, MATERIAL_TYPE};
    use std::collections::HashSet;

    fn item() -> NormalizedItem {
        let mut tags = TagMap::new();
        tags.entry(BUCKET.into())
            .or_default()
            .insert("roofing-project".into(), "Roofing Projects".into());
        let material = tags.entry(MATERIAL_TYPE.into()).or_default();
        material.insert("metal".into(), "Metal".into());
        material.insert("tile".into(), "Tile".into());

        NormalizedItem {
            id: "project:a-b".into(),
            slug: "a-b".into(),
            title: r#"Roof "A" & Co"#.into(),
            published_at: Utc.with_ymd_and_hms(2024, 2, 3, 0, 0, 0).unwrap(),
            source_pool: PoolKind::Project,
            excerpt_text: "Short".into(),
            body_text: "Long <body>".into(),
            tags,
            video: Some(VideoRef {
                platform: VideoPlatform::Vimeo,
                id: "42".into(),
            }),
        }
    }

    #[test]
    fn card_carries_the_data_contract() {
        let html = render_cards(&[item()], &[BUCKET, MATERIAL_TYPE, "service_area"]);

        assert!(html.contains(r#"data-id="project:a-b""#));
        assert!(html.contains(r#"data-title="Roof &quot;A&quot; &amp; Co""#));
        assert!(html.contains(r#"data-bucket="roofing-project""#));
        assert!(html.contains(r#"data-material-type="metal|tile""#));
        assert!(!html.contains("data-service-area"));
        assert!(html.contains(r#"data-search-template="search-project_3a_a-b""#));
        assert!(html.contains(
            r#"<template id="search-project_3a_a-b">Roofing Projects Metal Tile Short Long &lt;body&gt;</template>"#
        ));
        assert!(html.contains("https://player.vimeo.com/video/42"));
    }

    #[test]
    fn template_ids_keep_identities_apart() {
        let ids: HashSet<String> = ["video:a_b", "video:a.b", "video:a-b", "video:a_2e_b"]
            .iter()
            .map(|id| template_id(id))
            .collect();
        assert_eq!(ids.len(), 4);
        assert_eq!(template_id("video:a-b"), "search-video_3a_a-b");
    }

    #[test]
    fn facet_buttons_reflect_selection_and_counts() {
        let groups = vec![FacetGroup {
            taxonomy: MATERIAL_TYPE.into(),
            buckets: vec![
                FacetBucket {
                    slug: "metal".into(),
                    name: "Metal".into(),
                    count: 3,
                },
                FacetBucket {
                    slug: "tile".into(),
                    name: "Tile".into(),
                    count: 0,
                },
            ],
        }];
        let query = FilterQuery::new().with_selection(MATERIAL_TYPE, ["metal"]);

        let html = render_facets(&groups, &query);
        assert!(html.contains(
            r#"data-facet="material_type" data-value="metal" aria-pressed="true" data-count="3">Metal</button>"#
        ));
        assert!(html.contains(r#"data-value="tile" aria-pressed="false" data-count="0""#));
    }
}
