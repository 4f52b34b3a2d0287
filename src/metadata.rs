//! Attribute scan over the leading tag of an opaque persona document.
//!
//! Persona bundles are XML, but the converter never parses them as such: only
//! a handful of attributes on the first tag are read, and the rest of the
//! document is relocated verbatim.

use regex::Regex;

use crate::models::AgentMeta;

/// Return the value of `attr="..."` within the document's leading tag.
///
/// The scan is bounded to the text up to and including the first `>`, so
/// attribute-like text deeper in the body never matches. Returns an empty
/// string when the tag or attribute is absent.
#[must_use]
pub fn leading_tag_attr(raw: &str, attr: &str) -> String {
    let Some(tag_end) = raw.find('>') else {
        return String::new();
    };
    let head = &raw[..=tag_end];
    // Word boundary keeps `name` from matching inside `display-name`.
    let pattern = format!(r#"(?:^|[\s<]){}="([^"]*)""#, regex::escape(attr));
    let Ok(re) = Regex::new(&pattern) else {
        return String::new();
    };
    re.captures(head)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Extract persona metadata from a raw agent bundle.
#[must_use]
pub fn extract_agent_meta(raw: &str) -> AgentMeta {
    AgentMeta {
        name: leading_tag_attr(raw, "name"),
        title: leading_tag_attr(raw, "title"),
        icon: leading_tag_attr(raw, "icon"),
        description: leading_tag_attr(raw, "description"),
    }
}
