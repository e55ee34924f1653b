//! Build step handler.
//!
//! Recognized builders: shell, copy-artifact, the single-step conditional
//! builder, and the parameterized trigger builder. The conditional builder
//! wraps another build step under a `class` discriminator; that step is
//! promoted back to a tag and re-dispatched through this same handler so a
//! failure degrades only the innermost step.

use crate::defaults::BLOCK_THRESHOLD_DEFAULTS;
use crate::error::{Error, Result};
use crate::tree::SourceNode;
use crate::value::{Map, Value};

use super::{bool_text, contain, select, HandlerResult, Item};

const COPY_ARTIFACT_PREFIX: &str = "hudson.plugins.copyartifact.";
const CONDITION_PREFIX: &str = "org.jenkins_ci.plugins.run_condition.core.";

/// Build-selection strategies of the copy-artifact step.
static COPY_ARTIFACT_SELECTORS: &[(&str, &str)] = &[
    ("StatusBuildSelector", "last-successful"),
    ("LastCompletedBuildSelector", "last-completed"),
    ("SpecificBuildSelector", "specific-build"),
    ("SavedBuildSelector", "last-saved"),
    ("TriggeredBuildSelector", "upstream-build"),
    ("PermalinkBuildSelector", "permalink"),
    ("WorkspaceSelector", "workspace-latest"),
    ("ParameterizedBuildSelector", "build-param"),
    ("DownstreamBuildSelector", "downstream-build"),
];

/// Handle `<builders>`.
pub fn builders(top: &SourceNode) -> HandlerResult {
    let mut out = Vec::new();
    for child in top.children() {
        out.push(builder_item(child)?.into_value());
    }
    Ok(Some(vec![("builders".to_string(), Value::Seq(out))]))
}

/// Translate one build step with fallback containment. Re-entered by the
/// conditional builder for its wrapped step.
fn builder_item(node: &SourceNode) -> Result<Item> {
    // translate_builder never returns Ok(None), so contain always yields
    // an item here.
    let item = contain(node, translate_builder(node).map(Some))?
        .unwrap_or_else(|| Item::Opaque(Value::raw_xml(node.raw())));
    Ok(item)
}

fn translate_builder(node: &SourceNode) -> Result<Value> {
    match node.tag() {
        "hudson.tasks.Shell" => {
            let mut command = None;
            for child in node.children() {
                match child.tag() {
                    "command" => command = child.text(),
                    other => return Err(Error::unrecognized(other, "cannot handle shell setting")),
                }
            }
            Ok(Value::labeled("shell", Value::from_text(command)))
        }

        "hudson.plugins.copyartifact.CopyArtifact" => translate_copy_artifact(node),

        "org.jenkinsci.plugins.conditionalbuildstep.singlestep.SingleConditionalBuilder" => {
            translate_conditional(node)
        }

        "hudson.plugins.parameterizedtrigger.TriggerBuilder" => translate_trigger_builds(node),

        other => Err(Error::unrecognized(other, "cannot handle builder")),
    }
}

fn translate_copy_artifact(node: &SourceNode) -> Result<Value> {
    let mut copy = Map::new();
    for element in node.children() {
        match element.tag() {
            "project" | "filter" | "target" => {
                copy.insert(element.tag().to_string(), Value::from_text(element.text()));
            }
            "excludes" => {
                copy.insert(
                    "exclude-pattern".to_string(),
                    Value::from_text(element.text()),
                );
            }
            "selector" => {
                let class = element.class().ok_or_else(|| {
                    Error::unrecognized(element.tag(), "selector without a class")
                })?;
                let short = class.strip_prefix(COPY_ARTIFACT_PREFIX).unwrap_or(class);
                let which = select(COPY_ARTIFACT_SELECTORS, short, element.tag(), "selector")?;
                copy.insert("which-build".to_string(), Value::string(which));
                if which == "build-param" {
                    copy.insert(
                        "param".to_string(),
                        Value::from_text(element.find_text("parameterName")),
                    );
                }
            }
            "flatten" | "optional" => {
                copy.insert(element.tag().to_string(), Value::Bool(bool_text(element)));
            }
            "doNotFingerprintArtifacts" => {
                if element.text() != Some("false") {
                    return Err(Error::unrecognized(
                        element.tag(),
                        "cannot handle doNotFingerprintArtifacts != false",
                    ));
                }
            }
            other => return Err(Error::unrecognized(other, "cannot handle copyartifact setting")),
        }
    }
    Ok(Value::labeled("copyartifact", Value::Map(copy)))
}

fn translate_conditional(node: &SourceNode) -> Result<Value> {
    let mut conditional = Map::new();
    for item in node.children() {
        match item.tag() {
            "condition" => {
                let class = item
                    .class()
                    .ok_or_else(|| Error::unrecognized(item.tag(), "condition without a class"))?;
                let short = class.strip_prefix(CONDITION_PREFIX).unwrap_or(class);
                match short {
                    "ExpressionCondition" => {
                        conditional
                            .insert("condition-kind".to_string(), Value::string("regex-match"));
                        conditional.insert(
                            "regex".to_string(),
                            Value::from_text(item.find_text("expression")),
                        );
                        conditional.insert(
                            "label".to_string(),
                            Value::from_text(item.find_text("label")),
                        );
                    }
                    "AlwaysRun" => {
                        conditional.insert("condition-kind".to_string(), Value::string("always"));
                    }
                    "NeverRun" => {
                        conditional.insert("condition-kind".to_string(), Value::string("never"));
                    }
                    "StatusCondition" => {
                        conditional.insert(
                            "condition-kind".to_string(),
                            Value::string("current-status"),
                        );
                        conditional.insert(
                            "condition-worst".to_string(),
                            Value::from_text(item.find_text("worstResult/name")),
                        );
                        conditional.insert(
                            "condition-best".to_string(),
                            Value::from_text(item.find_text("bestResult/name")),
                        );
                    }
                    _ => {
                        return Err(Error::unrecognized(
                            item.tag(),
                            format!("cannot handle condition {class}"),
                        ))
                    }
                }
            }
            "runner" => {
                if item.class() != Some("org.jenkins_ci.plugins.run_condition.BuildStepRunner$Fail")
                {
                    return Err(Error::unrecognized(
                        item.tag(),
                        format!(
                            "cannot handle conditional runner {}",
                            item.class().unwrap_or("without class")
                        ),
                    ));
                }
            }
            "buildStep" => {
                // Promote the discriminator back to a tag so fallback, if
                // needed, operates on the innermost step and still shows
                // the element as exported.
                let class = item
                    .class()
                    .ok_or_else(|| Error::unrecognized(item.tag(), "buildStep without a class"))?;
                let step = item.with_tag(class);
                conditional.insert(
                    "steps".to_string(),
                    Value::Seq(vec![builder_item(&step)?.into_value()]),
                );
            }
            other => {
                return Err(Error::unrecognized(
                    other,
                    "cannot handle conditional property",
                ))
            }
        }
    }
    Ok(Value::labeled("conditional-step", Value::Map(conditional)))
}

fn translate_trigger_builds(node: &SourceNode) -> Result<Value> {
    let configs = node
        .child("configs")
        .ok_or_else(|| Error::unrecognized(node.tag(), "trigger builder without configs"))?;

    let mut out = Vec::new();
    for config in configs.children() {
        if config.tag() != "hudson.plugins.parameterizedtrigger.BlockableBuildTriggerConfig" {
            return Err(Error::unrecognized(
                config.tag(),
                "cannot handle trigger config",
            ));
        }
        out.push(Value::Map(translate_trigger_config(config)?));
    }
    Ok(Value::labeled("trigger-builds", Value::Seq(out)))
}

fn translate_trigger_config(config: &SourceNode) -> Result<Map> {
    let mut trigger = Map::new();
    for property in config.children() {
        match property.tag() {
            "projects" => {
                let text = property.text().unwrap_or_default();
                let value = if text.contains(',') {
                    Value::Seq(text.split(',').map(Value::string).collect())
                } else {
                    Value::string(text)
                };
                trigger.insert("project".to_string(), value);
            }

            "configs" => {
                for inner in property.children() {
                    match inner.tag() {
                        "hudson.plugins.parameterizedtrigger.PredefinedBuildParameters" => {
                            trigger.insert(
                                "predefined-parameters".to_string(),
                                Value::from_text(inner.find_text("properties")),
                            );
                        }
                        other => {
                            return Err(Error::unrecognized(
                                other,
                                "cannot handle trigger parameter config",
                            ))
                        }
                    }
                }
            }

            "configFactories" => {
                let mut factories = Vec::new();
                for factory_node in property.children() {
                    if factory_node.tag()
                        != "hudson.plugins.parameterizedtrigger.FileBuildParameterFactory"
                    {
                        return Err(Error::unrecognized(
                            factory_node.tag(),
                            "cannot handle trigger factory",
                        ));
                    }
                    let mut factory = Map::new();
                    factory.insert("factory".to_string(), Value::string("filebuild"));
                    for setting in factory_node.children() {
                        match setting.tag() {
                            "filePattern" => {
                                factory.insert(
                                    "file-pattern".to_string(),
                                    Value::from_text(setting.text()),
                                );
                            }
                            "noFilesFoundAction" => {
                                factory.insert(
                                    "no-files-found-action".to_string(),
                                    Value::from_text(setting.text()),
                                );
                            }
                            other => {
                                return Err(Error::unrecognized(
                                    other,
                                    "cannot handle trigger factory property",
                                ))
                            }
                        }
                    }
                    factories.push(Value::Map(factory));
                }
                trigger.insert("parameter-factories".to_string(), Value::Seq(factories));
            }

            "block" => {
                trigger.insert("block".to_string(), Value::Bool(true));
                let mut thresholds: Map = BLOCK_THRESHOLD_DEFAULTS
                    .iter()
                    .map(|(key, value)| (key.to_string(), Value::string(*value)))
                    .collect();
                for threshold in property.children() {
                    let value = threshold
                        .find_text("name")
                        .map(str::to_lowercase)
                        .ok_or_else(|| {
                            Error::unrecognized(threshold.tag(), "threshold without a name")
                        })?;
                    if !["never", "success", "unstable", "failure"].contains(&value.as_str()) {
                        return Err(Error::unrecognized(
                            threshold.tag(),
                            format!("cannot handle threshold value {value}"),
                        ));
                    }
                    let key = match threshold.tag() {
                        "buildStepFailureThreshold" => "build-step-failure-threshold",
                        "unstableThreshold" => "unstable-threshold",
                        "failureThreshold" => "failure-threshold",
                        other => {
                            return Err(Error::unrecognized(other, "cannot handle threshold"))
                        }
                    };
                    thresholds.insert(key.to_string(), Value::string(value));
                }
                trigger.insert("block-thresholds".to_string(), Value::Map(thresholds));
            }

            "condition" if property.text() == Some("ALWAYS") => {}
            "triggerWithNoParameters" | "buildAllNodesWithLabel"
                if property.text() == Some("false") => {}

            other => {
                return Err(Error::unrecognized(
                    other,
                    "cannot handle trigger config property",
                ))
            }
        }
    }
    Ok(trigger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::parse_document;

    fn builder_list(xml: &str) -> Vec<Value> {
        let node = parse_document(xml).unwrap();
        let entries = builders(&node).unwrap().unwrap();
        entries[0].1.as_seq().unwrap().to_vec()
    }

    #[test]
    fn test_shell_command() {
        let list = builder_list(
            "<builders><hudson.tasks.Shell><command>make all</command></hudson.tasks.Shell></builders>",
        );
        assert_eq!(list[0], Value::labeled("shell", Value::string("make all")));
    }

    #[test]
    fn test_shell_multiline_command_kept_verbatim() {
        let list = builder_list(
            "<builders><hudson.tasks.Shell><command>set -e\nmake\nmake install</command></hudson.tasks.Shell></builders>",
        );
        assert_eq!(
            list[0],
            Value::labeled("shell", Value::string("set -e\nmake\nmake install"))
        );
    }

    #[test]
    fn test_copy_artifact_selector_table() {
        let list = builder_list(
            r#"<builders><hudson.plugins.copyartifact.CopyArtifact>
                <project>upstream</project>
                <filter>*.jar</filter>
                <selector class="hudson.plugins.copyartifact.WorkspaceSelector"/>
                <flatten>true</flatten>
            </hudson.plugins.copyartifact.CopyArtifact></builders>"#,
        );
        let copy = list[0].as_map().unwrap()["copyartifact"].as_map().unwrap();
        assert_eq!(copy.get("project"), Some(&Value::string("upstream")));
        assert_eq!(
            copy.get("which-build"),
            Some(&Value::string("workspace-latest"))
        );
        assert_eq!(copy.get("flatten"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_copy_artifact_build_param_selector_captures_param() {
        let list = builder_list(
            r#"<builders><hudson.plugins.copyartifact.CopyArtifact>
                <project>upstream</project>
                <selector class="hudson.plugins.copyartifact.ParameterizedBuildSelector"><parameterName>BUILD</parameterName></selector>
            </hudson.plugins.copyartifact.CopyArtifact></builders>"#,
        );
        let copy = list[0].as_map().unwrap()["copyartifact"].as_map().unwrap();
        assert_eq!(copy.get("which-build"), Some(&Value::string("build-param")));
        assert_eq!(copy.get("param"), Some(&Value::string("BUILD")));
    }

    #[test]
    fn test_copy_artifact_unknown_selector_degrades_item() {
        let list = builder_list(
            r#"<builders><hudson.plugins.copyartifact.CopyArtifact>
                <selector class="hudson.plugins.copyartifact.FancyNewSelector"/>
            </hudson.plugins.copyartifact.CopyArtifact></builders>"#,
        );
        assert!(list[0].is_raw());
    }

    const CONDITIONAL_XML: &str = r#"<builders>
<org.jenkinsci.plugins.conditionalbuildstep.singlestep.SingleConditionalBuilder>
  <condition class="org.jenkins_ci.plugins.run_condition.core.AlwaysRun"/>
  <runner class="org.jenkins_ci.plugins.run_condition.BuildStepRunner$Fail"/>
  <buildStep class="hudson.tasks.Shell"><command>echo hi</command></buildStep>
</org.jenkinsci.plugins.conditionalbuildstep.singlestep.SingleConditionalBuilder>
</builders>"#;

    #[test]
    fn test_conditional_step_wraps_inner_builder() {
        let list = builder_list(CONDITIONAL_XML);
        let conditional = list[0].as_map().unwrap()["conditional-step"]
            .as_map()
            .unwrap();
        assert_eq!(
            conditional.get("condition-kind"),
            Some(&Value::string("always"))
        );
        let steps = conditional.get("steps").unwrap().as_seq().unwrap();
        assert_eq!(steps[0], Value::labeled("shell", Value::string("echo hi")));
    }

    #[test]
    fn test_conditional_step_fallback_is_innermost() {
        let xml = CONDITIONAL_XML.replace(
            r#"<buildStep class="hudson.tasks.Shell"><command>echo hi</command></buildStep>"#,
            r#"<buildStep class="hudson.tasks.Ant"><targets>dist</targets></buildStep>"#,
        );
        let list = builder_list(&xml);
        // The conditional itself stays typed; only the inner step goes raw.
        let conditional = list[0].as_map().unwrap()["conditional-step"]
            .as_map()
            .unwrap();
        let steps = conditional.get("steps").unwrap().as_seq().unwrap();
        assert!(steps[0].is_raw());
        // The raw block shows the element as exported, class and all.
        assert!(steps[0].raw_text().unwrap().contains(r#"class="hudson.tasks.Ant""#));
    }

    #[test]
    fn test_conditional_status_condition() {
        let xml = CONDITIONAL_XML.replace(
            r#"<condition class="org.jenkins_ci.plugins.run_condition.core.AlwaysRun"/>"#,
            r#"<condition class="org.jenkins_ci.plugins.run_condition.core.StatusCondition"><worstResult><name>SUCCESS</name></worstResult><bestResult><name>SUCCESS</name></bestResult></condition>"#,
        );
        let list = builder_list(&xml);
        let conditional = list[0].as_map().unwrap()["conditional-step"]
            .as_map()
            .unwrap();
        assert_eq!(
            conditional.get("condition-kind"),
            Some(&Value::string("current-status"))
        );
        assert_eq!(
            conditional.get("condition-worst"),
            Some(&Value::string("SUCCESS"))
        );
    }

    const TRIGGER_BUILDS_XML: &str = r#"<builders>
<hudson.plugins.parameterizedtrigger.TriggerBuilder>
  <configs>
    <hudson.plugins.parameterizedtrigger.BlockableBuildTriggerConfig>
      <projects>one,two</projects>
      <condition>ALWAYS</condition>
      <triggerWithNoParameters>false</triggerWithNoParameters>
      <block>
        <unstableThreshold><name>UNSTABLE</name></unstableThreshold>
      </block>
    </hudson.plugins.parameterizedtrigger.BlockableBuildTriggerConfig>
  </configs>
</hudson.plugins.parameterizedtrigger.TriggerBuilder>
</builders>"#;

    #[test]
    fn test_trigger_builds_projects_and_thresholds() {
        let list = builder_list(TRIGGER_BUILDS_XML);
        let configs = list[0].as_map().unwrap()["trigger-builds"]
            .as_seq()
            .unwrap();
        let config = configs[0].as_map().unwrap();
        assert_eq!(
            config.get("project"),
            Some(&Value::Seq(vec![
                Value::string("one"),
                Value::string("two")
            ]))
        );
        assert_eq!(config.get("block"), Some(&Value::Bool(true)));
        let thresholds = config.get("block-thresholds").unwrap().as_map().unwrap();
        // Unset thresholds keep their documented default.
        assert_eq!(
            thresholds.get("build-step-failure-threshold"),
            Some(&Value::string("never"))
        );
        assert_eq!(
            thresholds.get("unstable-threshold"),
            Some(&Value::string("unstable"))
        );
        assert_eq!(
            thresholds.get("failure-threshold"),
            Some(&Value::string("never"))
        );
    }

    #[test]
    fn test_trigger_builds_bad_threshold_degrades_item() {
        let xml = TRIGGER_BUILDS_XML.replace("UNSTABLE", "SOMETIMES");
        let list = builder_list(&xml);
        assert!(list[0].is_raw());
    }

    #[test]
    fn test_unknown_builder_among_known_ones() {
        let list = builder_list(
            "<builders><hudson.tasks.Shell><command>ls</command></hudson.tasks.Shell><hudson.tasks.Maven><targets>install</targets></hudson.tasks.Maven></builders>",
        );
        assert_eq!(list.len(), 2);
        assert!(!list[0].is_raw());
        assert!(list[1].is_raw());
    }
}
