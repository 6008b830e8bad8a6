// src/services/extract.rs

//! Pattern-based entry extraction.
//!
//! Each upstream page has its own markup, so extraction is dispatched on the
//! source layout. Matching is regex-only; the pages are never parsed into a
//! DOM.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::{AppError, Result};
use crate::models::SourceLayout;
use crate::services::normalize;

static STATUS_TABLE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<font\s+class="orgname"[^>]*>(.*?)</font>[^:]*:\s*<font\s+class="status"[^>]*>([^<]+)</font>"#,
    )
    .ok()
});

static HEADING_PARAGRAPH_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)<h4[^>]*>(.*?)</h4>\s*<p[^>]*>(.*?)</p>").ok());

/// A normalized (name, status) pair, before allow-list filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPair {
    pub name: String,
    pub status: String,
}

fn pattern(layout: SourceLayout) -> Option<&'static Regex> {
    match layout {
        SourceLayout::StatusTable => STATUS_TABLE_RE.as_ref(),
        SourceLayout::HeadingParagraph => HEADING_PARAGRAPH_RE.as_ref(),
    }
}

/// Extract pairs in document order.
///
/// A rejected candidate is logged and skipped; it never stops the scan.
pub fn extract(html: &str, layout: SourceLayout) -> Vec<ExtractedPair> {
    let Some(re) = pattern(layout) else {
        log::error!("No usable pattern for {layout} layout");
        return Vec::new();
    };

    re.captures_iter(html)
        .filter_map(|caps| match candidate(&caps, layout) {
            Ok(pair) => Some(pair),
            Err(e) => {
                log::debug!("Skipping candidate: {e}");
                None
            }
        })
        .collect()
}

fn candidate(caps: &Captures<'_>, layout: SourceLayout) -> Result<ExtractedPair> {
    let group = |index: usize| {
        caps.get(index)
            .map(|m| normalize(m.as_str()))
            .ok_or_else(|| AppError::extraction(layout.to_string(), "missing capture group"))
    };

    let name = group(1)?;
    let status = group(2)?;

    if name.is_empty() || status.is_empty() {
        return Err(AppError::extraction(
            layout.to_string(),
            format!("empty field in ({name:?}, {status:?})"),
        ));
    }
    if name.contains('<') {
        return Err(AppError::extraction(
            layout.to_string(),
            format!("residual markup in name {name:?}"),
        ));
    }

    Ok(ExtractedPair { name, status })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(name: &str, status: &str) -> ExtractedPair {
        ExtractedPair {
            name: name.to_string(),
            status: status.to_string(),
        }
    }

    const STATUS_TABLE: &str = r#"
<TABLE>
<TR><TD><FONT CLASS="orgname" SIZE="2">Bristol Public Schools</FONT>: <FONT CLASS="status" SIZE="2">Closed</FONT></TD></TR>
<TR><TD><FONT CLASS="orgname"><B>Gengras Center</B></FONT>: <FONT CLASS="status">Delayed 2 Hours</FONT></TD></TR>
<TR><TD><FONT CLASS="orgname">Oak Hill &amp; Partners</FONT>: <FONT CLASS="status">Early Dismissal</FONT></TD></TR>
</TABLE>
"#;

    const HEADING_PARAGRAPH: &str = r#"
<div class="closings">
  <h4 class="org">Canton Public Schools</h4>
  <p class="status">Closed</p>
  <h4>Plymouth <span>Schools</span></h4>
  <P>
    2 Hour Delay
  </P>
</div>
"#;

    #[test]
    fn test_status_table_layout() {
        let pairs = extract(STATUS_TABLE, SourceLayout::StatusTable);
        assert_eq!(
            pairs,
            vec![
                pair("Bristol Public Schools", "Closed"),
                pair("Gengras Center", "Delayed 2 Hours"),
                pair("Oak Hill & Partners", "Early Dismissal"),
            ]
        );
    }

    #[test]
    fn test_markup_wrapped_colon_runs_into_next_row() {
        // Only a bare colon separates name and status, so this row overruns.
        let html = "<FONT CLASS=\"orgname\">Bristol Public Schools</FONT> <B>:</B> \
                    <FONT CLASS=\"status\">Closed</FONT>\n\
                    <FONT CLASS=\"orgname\">Gengras Center</FONT>: \
                    <FONT CLASS=\"status\">Delayed 2 Hours</FONT>";
        let pairs = extract(html, SourceLayout::StatusTable);
        assert_eq!(
            pairs,
            vec![pair("Bristol Public Schools : Closed", "Delayed 2 Hours")]
        );
    }

    #[test]
    fn test_heading_paragraph_layout() {
        let pairs = extract(HEADING_PARAGRAPH, SourceLayout::HeadingParagraph);
        assert_eq!(
            pairs,
            vec![
                pair("Canton Public Schools", "Closed"),
                pair("Plymouth Schools", "2 Hour Delay"),
            ]
        );
    }

    #[test]
    fn test_layouts_do_not_cross_match() {
        assert!(extract(STATUS_TABLE, SourceLayout::HeadingParagraph).is_empty());
        assert!(extract(HEADING_PARAGRAPH, SourceLayout::StatusTable).is_empty());
    }

    #[test]
    fn test_residual_markup_is_skipped_without_stopping() {
        let html = "<h4>Terryville <em</h4><p>Closed</p>\
                    <h4>Winsted Public Schools</h4><p>Closed</p>";
        let pairs = extract(html, SourceLayout::HeadingParagraph);
        assert_eq!(pairs, vec![pair("Winsted Public Schools", "Closed")]);
    }

    #[test]
    fn test_encoded_markup_in_name_is_skipped() {
        let html = "<h4>&lt;b&gt;Aspire&lt;/b&gt;</h4><p>Closed</p>";
        assert!(extract(html, SourceLayout::HeadingParagraph).is_empty());
    }

    #[test]
    fn test_empty_fields_are_skipped() {
        let html = "<h4> <br> </h4><p>Closed</p><h4>ACES</h4><p>&nbsp;</p>";
        assert!(extract(html, SourceLayout::HeadingParagraph).is_empty());
    }

    #[test]
    fn test_heading_needs_adjacent_paragraph() {
        let html = "<h4>Solterra Academy</h4><div>ad</div><p>Closed</p>";
        assert!(extract(html, SourceLayout::HeadingParagraph).is_empty());
    }

    #[test]
    fn test_garbage_input_yields_nothing() {
        assert!(extract("", SourceLayout::StatusTable).is_empty());
        assert!(extract("<<<>>> </font: <h4", SourceLayout::StatusTable).is_empty());
        assert!(extract("<h4><p></h4>", SourceLayout::HeadingParagraph).is_empty());
    }
}
