//! Upstream page definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Page structure an extractor is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceLayout {
    /// `<font class="orgname">NAME</font>: <font class="status">STATUS</font>` rows
    StatusTable,

    /// `<h4>NAME</h4>` immediately followed by `<p>STATUS</p>`
    HeadingParagraph,
}

impl fmt::Display for SourceLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLayout::StatusTable => f.write_str("status_table"),
            SourceLayout::HeadingParagraph => f.write_str("heading_paragraph"),
        }
    }
}

/// A configured upstream page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceConfig {
    /// Identifier stamped on every entry from this page
    pub name: String,

    /// Page URL
    pub url: String,

    /// Extraction layout
    pub layout: SourceLayout,
}
