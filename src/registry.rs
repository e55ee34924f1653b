//! Top-level dispatch from job document children to their handlers.
//!
//! The mapping is a static table keyed by element tag. Handlers run in
//! document order and each contributes zero or more output entries, so the
//! resulting scope preserves the order settings appeared in the source.

use crate::error::{Error, Result};
use crate::handlers::{axes, builders, leaf, properties, publishers, scm, triggers, wrappers};
use crate::handlers::Entries;
use crate::tree::SourceNode;
use crate::value::{Scope, Value};

type Handler = fn(&SourceNode) -> Result<Option<Entries>>;

static REGISTRY: &[(&str, Handler)] = &[
    ("actions", leaf::actions),
    ("description", leaf::description),
    ("keepDependencies", leaf::keep_dependencies),
    ("properties", properties::properties),
    ("scm", scm::scm),
    ("assignedNode", leaf::assigned_node),
    ("canRoam", leaf::can_roam),
    ("disabled", leaf::disabled),
    ("blockBuildWhenDownstreamBuilding", leaf::block_downstream),
    ("blockBuildWhenUpstreamBuilding", leaf::block_upstream),
    ("triggers", triggers::triggers),
    ("concurrentBuild", leaf::concurrent),
    ("axes", axes::axes),
    ("combinationFilter", leaf::combination_filter),
    ("executionStrategy", leaf::execution_strategy),
    ("builders", builders::builders),
    ("publishers", publishers::publishers),
    ("buildWrappers", wrappers::wrappers),
    ("logRotator", leaf::log_rotator),
    ("displayName", leaf::display_name),
    ("quietPeriod", leaf::quiet_period),
    ("scmCheckoutRetryCount", leaf::retry_count),
    ("customWorkspace", leaf::custom_workspace),
    ("jdk", leaf::jdk),
    ("authToken", leaf::auth_token),
];

fn handler_for(tag: &str) -> Option<Handler> {
    REGISTRY
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, handler)| *handler)
}

/// Translate a parsed job document into an ordered scope of settings.
///
/// # Errors
///
/// Returns an error when the root element is not a known job kind, when a
/// top-level child has no handler, or when a handler hits a construct it
/// can neither translate nor degrade.
pub fn translate_job(root: &SourceNode) -> Result<Scope> {
    let mut scope = Scope::new();
    match root.tag() {
        "project" => {}
        "matrix-project" => {
            scope.push(("project-type".to_string(), Value::string("matrix")));
        }
        other => {
            return Err(Error::unrecognized(other, "cannot handle job kind"));
        }
    }

    for child in root.children() {
        let handler = handler_for(child.tag())
            .ok_or_else(|| Error::unrecognized(child.tag(), "cannot handle job setting"))?;
        if let Some(entries) = handler(child)? {
            scope.extend(entries);
        }
    }
    Ok(scope)
}
