//! Build trigger handler.
//!
//! Recognized triggers: SCM polling, timer, reverse (upstream-project)
//! triggers, and the Gerrit review trigger. Gerrit sub-events are resolved
//! through a selector table; the `patchset-created` event nests an
//! exclusion-flag mapping only when at least one flag is set, otherwise it
//! stays a bare label.

use crate::error::{Error, Result};
use crate::tree::SourceNode;
use crate::value::{Map, Value};

use super::{bool_text, contain, HandlerResult};

const GERRIT_CLASS: &str =
    "com.sonyericsson.hudson.plugins.gerrit.trigger.hudsontrigger.GerritTrigger";
const GERRIT_EVENT_PREFIX: &str =
    "com.sonyericsson.hudson.plugins.gerrit.trigger.hudsontrigger.events.";

/// Gerrit event kinds without extra payload. Events with payload
/// (patchset-created, comment-added-contains) are handled separately.
static GERRIT_EVENT_KINDS: &[(&str, &str)] = &[
    ("PluginChangeMergedEvent", "change-merged-event"),
    ("PluginDraftPublishedEvent", "draft-published-event"),
    ("PluginRefUpdatedEvent", "ref-updated-event"),
    ("PluginChangeAbandonedEvent", "change-abandoned-event"),
    ("PluginChangeRestoredEvent", "change-restored-event"),
];

/// Exclusion flags of the patchset-created event.
static PATCHSET_EXCLUDE_FLAGS: &[(&str, &str)] = &[
    ("excludeDrafts", "exclude-drafts"),
    ("excludeTrivialRebase", "exclude-trivial-rebase"),
    ("excludeNoCodeChange", "exclude-no-code-change"),
];

/// Handle `<triggers>`.
pub fn triggers(top: &SourceNode) -> HandlerResult {
    let mut out = Vec::new();
    for child in top.children() {
        if let Some(item) = contain(child, translate_trigger(child).map(Some))? {
            out.push(item.into_value());
        }
    }
    Ok(Some(vec![("triggers".to_string(), Value::Seq(out))]))
}

fn translate_trigger(node: &SourceNode) -> Result<Value> {
    match node.tag() {
        "hudson.triggers.SCMTrigger" => {
            let mut pollscm = Map::new();
            for setting in node.children() {
                match setting.tag() {
                    "spec" => {
                        pollscm.insert("cron".to_string(), Value::from_text(setting.text()));
                    }
                    "ignorePostCommitHooks" => {
                        pollscm.insert(
                            "ignore-post-commit-hooks".to_string(),
                            Value::Bool(bool_text(setting)),
                        );
                    }
                    other => {
                        return Err(Error::unrecognized(
                            other,
                            "cannot handle scm trigger setting",
                        ))
                    }
                }
            }
            Ok(Value::labeled("pollscm", Value::Map(pollscm)))
        }

        "hudson.triggers.TimerTrigger" => Ok(Value::labeled(
            "timed",
            Value::from_text(node.find_text("spec")),
        )),

        "jenkins.triggers.ReverseBuildTrigger" => {
            let mut reverse = Map::new();
            for setting in node.children() {
                match setting.tag() {
                    "upstreamProjects" => {
                        reverse.insert("jobs".to_string(), Value::from_text(setting.text()));
                    }
                    // result threshold and spec carry no YAML counterpart
                    "threshold" | "spec" => {}
                    other => {
                        return Err(Error::unrecognized(
                            other,
                            "cannot handle reverse trigger setting",
                        ))
                    }
                }
            }
            Ok(Value::labeled("reverse", Value::Map(reverse)))
        }

        GERRIT_CLASS => translate_gerrit(node),

        other => Err(Error::unrecognized(other, "cannot handle trigger")),
    }
}

fn translate_gerrit(node: &SourceNode) -> Result<Value> {
    let mut gerrit = Map::new();
    for child in node.children() {
        match child.tag() {
            "spec" => {}
            "gerritProjects" => {
                let mut projects = Vec::new();
                for project in child.children() {
                    projects.push(translate_gerrit_project(project)?);
                }
                gerrit.insert("projects".to_string(), Value::Seq(projects));
            }
            "triggerOnEvents" => {
                let mut events = Vec::new();
                for event in child.children() {
                    events.push(translate_gerrit_event(event)?);
                }
                gerrit.insert("trigger-on".to_string(), Value::Seq(events));
            }
            "silentMode" => {
                if bool_text(child) {
                    gerrit.insert("silent".to_string(), Value::Bool(true));
                }
            }
            other => {
                return Err(Error::unrecognized(
                    other,
                    "cannot handle gerrit trigger setting",
                ))
            }
        }
    }
    Ok(Value::labeled("gerrit", Value::Map(gerrit)))
}

fn translate_gerrit_project(project: &SourceNode) -> Result<Value> {
    let mut out = Map::new();
    for setting in project.children() {
        match setting.tag() {
            "compareType" => {
                out.insert(
                    "project-compare-type".to_string(),
                    Value::from_text(setting.text()),
                );
            }
            "pattern" => {
                out.insert(
                    "project-pattern".to_string(),
                    Value::from_text(setting.text()),
                );
            }
            "branches" => {
                let mut branches = Vec::new();
                for branch in setting.children() {
                    let mut spec = Map::new();
                    for field in branch.children() {
                        match field.tag() {
                            "compareType" => {
                                spec.insert(
                                    "branch-compare-type".to_string(),
                                    Value::from_text(field.text()),
                                );
                            }
                            "pattern" => {
                                spec.insert(
                                    "branch-pattern".to_string(),
                                    Value::from_text(field.text()),
                                );
                            }
                            other => {
                                return Err(Error::unrecognized(
                                    other,
                                    "cannot handle gerrit branch setting",
                                ))
                            }
                        }
                    }
                    branches.push(Value::Map(spec));
                }
                out.insert("branches".to_string(), Value::Seq(branches));
            }
            other => {
                return Err(Error::unrecognized(
                    other,
                    "cannot handle gerrit project setting",
                ))
            }
        }
    }
    Ok(Value::Map(out))
}

/// One sub-event of `<triggerOnEvents>`: either a bare label, or a label
/// with a nested flag mapping when the event carries set exclusion flags.
fn translate_gerrit_event(event: &SourceNode) -> Result<Value> {
    let short = event
        .tag()
        .strip_prefix(GERRIT_EVENT_PREFIX)
        .unwrap_or_else(|| event.tag());

    if short == "PluginPatchsetCreatedEvent" {
        let mut flags = Map::new();
        for flag in event.children() {
            let Some((_, key)) = PATCHSET_EXCLUDE_FLAGS
                .iter()
                .find(|(tag, _)| *tag == flag.tag())
            else {
                return Err(Error::unrecognized(
                    flag.tag(),
                    "cannot handle patchset-created flag",
                ));
            };
            if bool_text(flag) {
                flags.insert(key.to_string(), Value::Bool(true));
            }
        }
        return Ok(if flags.is_empty() {
            Value::string("patchset-created-event")
        } else {
            Value::labeled("patchset-created-event", Value::Map(flags))
        });
    }

    if short == "PluginCommentAddedContainsEvent" {
        let mut inner = Map::new();
        inner.insert(
            "comment-contains-value".to_string(),
            Value::from_text(event.find_text("commentAddedCommentContains")),
        );
        return Ok(Value::labeled(
            "comment-added-contains-event",
            Value::Map(inner),
        ));
    }

    let label = super::select(GERRIT_EVENT_KINDS, short, event.tag(), "gerrit event")?;
    Ok(Value::string(label))
}
