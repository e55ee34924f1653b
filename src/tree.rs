//! # Source Tree
//!
//! Read-only model of the exported job configuration. The whole document is
//! parsed once with `xot` and materialized into owned [`SourceNode`]s; the
//! engine then walks the owned tree without touching the parser again.
//!
//! Each node carries, per the input-boundary contract:
//!
//! - its tag name,
//! - its attribute map (which may include a `class` discriminator),
//! - its direct text content,
//! - its ordered element children,
//! - the verbatim XML serialization of the whole subtree, captured at parse
//!   time so the fallback codec can reproduce it byte-for-byte later.

use indexmap::IndexMap;
use xot::Xot;

use crate::error::{Error, Result};

/// One element of the source tree, owned and immutable after parsing.
#[derive(Debug, Clone)]
pub struct SourceNode {
    tag: String,
    attributes: IndexMap<String, String>,
    text: Option<String>,
    children: Vec<SourceNode>,
    raw: String,
}

impl SourceNode {
    /// The element's tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The `class` discriminator attribute, if present.
    pub fn class(&self) -> Option<&str> {
        self.attribute("class")
    }

    /// Direct text content.
    ///
    /// For an element with child elements the indentation whitespace between
    /// them is not text content and is reported as `None`; for a leaf the
    /// text is kept verbatim, whitespace untouched.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Ordered element children.
    pub fn children(&self) -> &[SourceNode] {
        &self.children
    }

    /// The first child with the given tag.
    pub fn child(&self, tag: &str) -> Option<&SourceNode> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// Text content of a descendant addressed by a `/`-separated tag path,
    /// e.g. `worstResult/name`.
    pub fn find_text(&self, path: &str) -> Option<&str> {
        let mut node = self;
        for segment in path.split('/') {
            node = node.child(segment)?;
        }
        node.text()
    }

    /// The verbatim XML serialization of this subtree, as captured at parse
    /// time. This is what the fallback codec embeds.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// A copy of this node under a different tag name, with the `class`
    /// discriminator dropped from the attribute map.
    ///
    /// Used where a discriminator attribute identifies the real node kind
    /// (a conditional builder's wrapped `buildStep`): promoting it back to
    /// a tag lets the regular classification, and therefore fallback, run
    /// at the innermost granularity. The raw serialization is kept from the
    /// original node so a fallback still shows the element as exported.
    pub fn with_tag(&self, tag: &str) -> SourceNode {
        let mut node = self.clone();
        node.tag = tag.to_string();
        node.attributes.shift_remove("class");
        node
    }
}

/// Parse an exported job document and return its root element.
pub fn parse_document(xml: &str) -> Result<SourceNode> {
    let mut xot = Xot::new();
    let doc = xot.parse(xml).map_err(|e| Error::Xml {
        message: e.to_string(),
    })?;
    let root = xot.document_element(doc).map_err(|e| Error::Xml {
        message: e.to_string(),
    })?;
    build_node(&xot, root)
}

fn build_node(xot: &Xot, node: xot::Node) -> Result<SourceNode> {
    let element = xot.element(node).ok_or_else(|| Error::Xml {
        message: "expected an element node".to_string(),
    })?;
    let (local, _) = xot.name_ns_str(element.name());
    let tag = local.to_string();

    let mut attributes = IndexMap::new();
    for (name, value) in xot.attributes(node).iter() {
        let (local, _) = xot.name_ns_str(name);
        attributes.insert(local.to_string(), value.to_string());
    }

    let mut text = String::new();
    let mut children = Vec::new();
    for child in xot.children(node) {
        if xot.element(child).is_some() {
            children.push(build_node(xot, child)?);
        } else if let Some(t) = xot.text(child) {
            text.push_str(t.get());
        }
    }

    // Indentation between child elements is layout, not content.
    let text = if text.is_empty() || (!children.is_empty() && text.trim().is_empty()) {
        None
    } else {
        Some(text)
    };

    let serialized = xot.to_string(node).map_err(|e| Error::Xml {
        message: e.to_string(),
    })?;
    let raw = format!("{}\n", serialized.trim());

    Ok(SourceNode {
        tag,
        attributes,
        text,
        children,
        raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_leaf() {
        let node = parse_document("<description>build it</description>").unwrap();
        assert_eq!(node.tag(), "description");
        assert_eq!(node.text(), Some("build it"));
        assert!(node.children().is_empty());
    }

    #[test]
    fn test_parse_empty_element_has_no_text() {
        let node = parse_document("<actions/>").unwrap();
        assert_eq!(node.text(), None);
        assert!(node.children().is_empty());
    }

    #[test]
    fn test_indentation_between_children_is_not_text() {
        let node = parse_document("<scm>\n  <url>git://x</url>\n</scm>").unwrap();
        assert_eq!(node.text(), None);
        assert_eq!(node.children().len(), 1);
        assert_eq!(node.children()[0].text(), Some("git://x"));
    }

    #[test]
    fn test_leaf_whitespace_kept_verbatim() {
        let node = parse_document("<command>  echo hi  </command>").unwrap();
        assert_eq!(node.text(), Some("  echo hi  "));
    }

    #[test]
    fn test_attributes_and_class_discriminator() {
        let node =
            parse_document(r#"<scm class="hudson.scm.NullSCM" plugin="git@2.0"/>"#).unwrap();
        assert_eq!(node.class(), Some("hudson.scm.NullSCM"));
        assert_eq!(node.attribute("plugin"), Some("git@2.0"));
        assert_eq!(node.attribute("missing"), None);
    }

    #[test]
    fn test_children_keep_document_order() {
        let node = parse_document("<p><b/><a/><c/><a/></p>").unwrap();
        let tags: Vec<&str> = node.children().iter().map(SourceNode::tag).collect();
        assert_eq!(tags, vec!["b", "a", "c", "a"]);
        // child() returns the first match in document order
        assert_eq!(node.child("a").unwrap().tag(), "a");
    }

    #[test]
    fn test_find_text_follows_path() {
        let node = parse_document(
            "<condition><worstResult><name>SUCCESS</name></worstResult></condition>",
        )
        .unwrap();
        assert_eq!(node.find_text("worstResult/name"), Some("SUCCESS"));
        assert_eq!(node.find_text("worstResult/missing"), None);
    }

    #[test]
    fn test_raw_preserves_subtree_with_attributes() {
        let node = parse_document(r#"<p><odd x="1"><y>2</y></odd></p>"#).unwrap();
        let raw = node.children()[0].raw();
        assert!(raw.contains(r#"x="1""#));
        assert!(raw.contains("<y>2</y>"));
        assert!(raw.ends_with('\n'));
    }

    #[test]
    fn test_with_tag_promotes_discriminator() {
        let node = parse_document(r#"<buildStep class="hudson.tasks.Shell"><command>ls</command></buildStep>"#)
            .unwrap();
        let promoted = node.with_tag("hudson.tasks.Shell");
        assert_eq!(promoted.tag(), "hudson.tasks.Shell");
        assert_eq!(promoted.class(), None);
        // The original exported form survives for fallback purposes.
        assert!(promoted.raw().contains(r#"class="hudson.tasks.Shell""#));
        assert_eq!(node.tag(), "buildStep");
    }

    #[test]
    fn test_parse_error_is_reported() {
        let result = parse_document("<unclosed>");
        assert!(matches!(result, Err(Error::Xml { .. })));
    }
}
