//! Leaf handlers: single scalar-bearing job settings.
//!
//! Each handler converts one element into at most one output entry.
//! Settings whose value equals the implicit default, or that have no
//! representation in the target schema at all, return `None`.

use crate::defaults::{self, JOB_BOOL_FIELDS};
use crate::error::Error;
use crate::tree::SourceNode;
use crate::value::{Map, Value};

use super::{bool_text, single_entry, HandlerResult};

/// `<actions/>` carries nothing when empty; a non-empty one is an
/// unrecognized construct.
pub fn actions(top: &SourceNode) -> HandlerResult {
    if top.children().is_empty() {
        Ok(None)
    } else {
        Err(Error::unrecognized(
            top.tag(),
            "cannot handle a non-empty <actions> element",
        ))
    }
}

/// `<description>my cool job</description>`
pub fn description(top: &SourceNode) -> HandlerResult {
    single_entry("description", Value::from_text(top.text()))
}

/// `<keepDependencies>` has no YAML counterpart.
pub fn keep_dependencies(_top: &SourceNode) -> HandlerResult {
    Ok(None)
}

/// `<canRoam>` is inferred from the `node` setting downstream, so there is
/// nothing to emit here.
pub fn can_roam(_top: &SourceNode) -> HandlerResult {
    Ok(None)
}

/// `<disabled>false</disabled>` — suppressed at the default value.
pub fn disabled(top: &SourceNode) -> HandlerResult {
    job_bool("disabled", top)
}

/// `<blockBuildWhenDownstreamBuilding>`
pub fn block_downstream(top: &SourceNode) -> HandlerResult {
    job_bool("block-downstream", top)
}

/// `<blockBuildWhenUpstreamBuilding>`
pub fn block_upstream(top: &SourceNode) -> HandlerResult {
    job_bool("block-upstream", top)
}

/// `<concurrentBuild>`
pub fn concurrent(top: &SourceNode) -> HandlerResult {
    job_bool("concurrent", top)
}

fn job_bool(key: &str, top: &SourceNode) -> HandlerResult {
    let Some(field) = defaults::lookup(JOB_BOOL_FIELDS, key) else {
        return Err(Error::unrecognized(top.tag(), "no default policy"));
    };
    match defaults::emit_bool(field, Some(bool_text(top))) {
        Some(value) => single_entry(key, Value::Bool(value)),
        None => Ok(None),
    }
}

/// `<combinationFilter>a != "b"</combinationFilter>`
pub fn combination_filter(top: &SourceNode) -> HandlerResult {
    single_entry("combination-filter", Value::from_text(top.text()))
}

/// `<assignedNode>server.example.com</assignedNode>`
pub fn assigned_node(top: &SourceNode) -> HandlerResult {
    single_entry("node", Value::from_text(top.text()))
}

/// `<displayName>my cool job</displayName>`
pub fn display_name(top: &SourceNode) -> HandlerResult {
    single_entry("display-name", Value::from_text(top.text()))
}

/// `<quietPeriod>5</quietPeriod>` — kept as a string, never coerced.
pub fn quiet_period(top: &SourceNode) -> HandlerResult {
    single_entry("quiet-period", Value::from_text(top.text()))
}

/// `<scmCheckoutRetryCount>8</scmCheckoutRetryCount>`
pub fn retry_count(top: &SourceNode) -> HandlerResult {
    single_entry("retry-count", Value::from_text(top.text()))
}

/// `<customWorkspace>/path</customWorkspace>`
pub fn custom_workspace(top: &SourceNode) -> HandlerResult {
    single_entry("workspace", Value::from_text(top.text()))
}

/// `<jdk>jdk8</jdk>`
pub fn jdk(top: &SourceNode) -> HandlerResult {
    single_entry("jdk", Value::from_text(top.text()))
}

/// `<authToken>secret</authToken>`
pub fn auth_token(top: &SourceNode) -> HandlerResult {
    single_entry("auth-token", Value::from_text(top.text()))
}

/// `<logRotator>` — the four counters keep their source spelling.
pub fn log_rotator(top: &SourceNode) -> HandlerResult {
    let mut logrotate = Map::new();
    for child in top.children() {
        match child.tag() {
            "daysToKeep" | "numToKeep" | "artifactDaysToKeep" | "artifactNumToKeep" => {
                logrotate.insert(child.tag().to_string(), Value::from_text(child.text()));
            }
            other => {
                return Err(Error::unrecognized(
                    other,
                    "cannot handle log rotation setting",
                ))
            }
        }
    }
    single_entry("logrotate", Value::Map(logrotate))
}

/// `<executionStrategy>` of a matrix job.
pub fn execution_strategy(top: &SourceNode) -> HandlerResult {
    let mut strategy = Map::new();
    for child in top.children() {
        match child.tag() {
            "runSequentially" => {
                strategy.insert(
                    "run-sequentially".to_string(),
                    Value::Bool(bool_text(child)),
                );
            }
            other => {
                return Err(Error::unrecognized(
                    other,
                    "cannot handle execution strategy setting",
                ))
            }
        }
    }
    single_entry("execution-strategy", Value::Map(strategy))
}
