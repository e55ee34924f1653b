//! # Node Handlers
//!
//! Each handler translates one source element (or one container of
//! elements) into zero or more output entries. Leaf handlers live in
//! [`leaf`]; the five polymorphic subsystems (SCM, triggers, builders,
//! publishers, wrappers) and the two structural groups (properties, axes)
//! each get their own module.
//!
//! ## Item isolation
//!
//! The subsystem handlers share one containment rule: classification of a
//! single item either succeeds and yields a typed value, or fails with
//! `Error::UnrecognizedConstruct` and is replaced *at that position* with a
//! raw-XML fallback block. One unsupported plugin configuration never
//! aborts translation of its siblings. The [`Item`] type makes the
//! distinction explicit instead of relying on a catch boundary.

pub mod axes;
pub mod builders;
pub mod leaf;
pub mod properties;
pub mod publishers;
pub mod scm;
pub mod triggers;
pub mod wrappers;

use log::warn;

use crate::error::{Error, Result};
use crate::tree::SourceNode;
use crate::value::Value;

/// Ordered output entries produced by one handler invocation.
pub type Entries = Vec<(String, Value)>;

/// What a registered handler returns: `None` means the setting has no
/// YAML-visible effect (its value equals the implicit default, or the
/// target schema has no representation for it).
pub type HandlerResult = Result<Option<Entries>>;

/// Outcome of translating one item of a polymorphic container.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Fully interpreted into a normalized value.
    Typed(Value),
    /// Preserved verbatim because the shape was not recognized.
    Opaque(Value),
}

impl Item {
    /// Unwrap into the output value, whichever kind it is.
    pub fn into_value(self) -> Value {
        match self {
            Item::Typed(value) | Item::Opaque(value) => value,
        }
    }
}

/// Contain a classification failure at the item boundary.
///
/// A successful translation passes through; an `UnrecognizedConstruct`
/// error is logged and replaced with a fallback block wrapping the item's
/// verbatim XML. `Ok(None)` marks items that are recognized but contribute
/// nothing. Any other error kind is not expected from handlers and
/// propagates.
pub fn contain(node: &SourceNode, result: Result<Option<Value>>) -> Result<Option<Item>> {
    match result {
        Ok(Some(value)) => Ok(Some(Item::Typed(value))),
        Ok(None) => Ok(None),
        Err(err @ Error::UnrecognizedConstruct { .. }) => {
            warn!("going raw because: {err}");
            Ok(Some(Item::Opaque(Value::raw_xml(node.raw()))))
        }
        Err(other) => Err(other),
    }
}

/// Look up a label in a selector table; an absent entry is an unrecognized
/// construct, never a default.
pub fn select(
    table: &'static [(&'static str, &'static str)],
    key: &str,
    tag: &str,
    what: &str,
) -> Result<&'static str> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, label)| *label)
        .ok_or_else(|| Error::unrecognized(tag, format!("cannot handle {what} {key}")))
}

/// `true` iff the element's text is exactly `true`.
pub fn bool_text(node: &SourceNode) -> bool {
    node.text() == Some("true")
}

/// The one-entry result most leaf handlers produce.
pub fn single_entry(key: &str, value: Value) -> HandlerResult {
    Ok(Some(vec![(key.to_string(), value)]))
}
