// src/services/normalize.rs

//! Text cleanup for extracted fragments.

use std::sync::LazyLock;

use regex::Regex;

/// Any tag, shortest match, across newlines.
static TAG_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?is)<.*?>").ok());

/// Character references the upstream pages actually use. Applied in order.
const ENTITIES: [(&str, &str); 6] = [
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&nbsp;", " "),
];

/// Strip markup, decode the fixed entity table, and trim.
///
/// Best-effort: returns the input unchanged if the tag pattern is unavailable.
pub fn normalize(raw: &str) -> String {
    let Some(tag_re) = TAG_RE.as_ref() else {
        log::warn!("Tag pattern unavailable, leaving text as-is");
        return raw.to_string();
    };

    let mut text = tag_re.replace_all(raw, "").into_owned();
    for (entity, literal) in ENTITIES {
        text = text.replace(entity, literal);
    }
    text.trim().to_string()
}
