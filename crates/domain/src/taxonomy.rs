// crates/domain/src/taxonomy.rs

use std::collections::BTreeMap;

/// Name of a filterable dimension (`bucket`, `material_type`, ...).
pub type TaxonomyKey = String;

/// Per-taxonomy tags carried by an item: `taxonomy → (slug → display name)`.
pub type TagMap = BTreeMap<TaxonomyKey, BTreeMap<String, String>>;

pub const BUCKET: &str = "bucket";
pub const MATERIAL_TYPE: &str = "material_type";
pub const SERVICE_AREA: &str = "service_area";
pub const VIDEO_CATEGORY: &str = "video_category";
pub const CATEGORY: &str = "category";

/// The only bucket whose items carry material and service-area tags.
pub const ROOFING_PROJECT: &str = "roofing-project";

/// Separator between slugs in a `data-*` tag attribute.
pub const TAG_SEPARATOR: char = '|';

/// `data-*` attribute carrying `taxonomy`'s slugs on a rendered item:
/// `material_type` → `data-material-type`.
pub fn data_attribute(taxonomy: &str) -> String {
    format!("data-{}", taxonomy.replace('_', "-"))
}
