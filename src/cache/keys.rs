//! Cache key builders for the markup and stylesheet namespaces.
//!
//! The formats are shared with callers that pre-compute keys, so the
//! prefixes, the `_` separator and the `none` sentinel must not change.

const MARKUP_PREFIX: &str = "markup";
const STYLESHEET_PREFIX: &str = "stylesheet";
const SEPARATOR: &str = "_";
const NO_CUSTOMIZATIONS: &str = "none";

/// `markup_<templateId>_<dataHash>_<customizationsHash|none>`
pub fn markup_key(template_id: &str, data_hash: &str, customizations_hash: Option<&str>) -> String {
    [
        MARKUP_PREFIX,
        template_id,
        data_hash,
        customizations_hash.unwrap_or(NO_CUSTOMIZATIONS),
    ]
    .join(SEPARATOR)
}

/// `stylesheet_<templateId>_<templateVersion>`
pub fn stylesheet_key(template_id: &str, template_version: &str) -> String {
    [STYLESHEET_PREFIX, template_id, template_version].join(SEPARATOR)
}
