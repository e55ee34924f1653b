//! Post-build publisher handler.

use crate::error::{Error, Result};
use crate::merge::deep_merge;
use crate::tree::SourceNode;
use crate::value::{Map, Value};

use super::{bool_text, contain, select, HandlerResult};

const EMAIL_TRIGGER_PREFIX: &str = "hudson.plugins.emailext.plugins.trigger.";

/// Notification triggers of the extended email publisher.
static EMAIL_TRIGGER_KINDS: &[(&str, &str)] = &[
    ("AlwaysTrigger", "always"),
    ("UnstableTrigger", "unstable"),
    ("FirstFailureTrigger", "first-failure"),
    ("NotBuiltTrigger", "not-built"),
    ("AbortedTrigger", "aborted"),
    ("RegressionTrigger", "regression"),
    ("FailureTrigger", "failure"),
    ("SecondFailureTrigger", "second-failure"),
    ("ImprovementTrigger", "improvement"),
    ("StillFailingTrigger", "still-failing"),
    ("SuccessTrigger", "success"),
    ("FixedTrigger", "fixed"),
    ("StillUnstableTrigger", "still-unstable"),
    ("PreBuildTrigger", "pre-build"),
];

/// Content types of the extended email publisher.
static EMAIL_CONTENT_TYPES: &[(&str, &str)] = &[
    ("text/plain", "text"),
    ("text/html", "html"),
    ("both", "both-html-text"),
];

/// Handle `<publishers>`.
pub fn publishers(top: &SourceNode) -> HandlerResult {
    let mut out = Vec::new();
    for child in top.children() {
        if let Some(item) = contain(child, translate_publisher(child).map(Some))? {
            out.push(item.into_value());
        }
    }
    Ok(Some(vec![("publishers".to_string(), Value::Seq(out))]))
}

fn translate_publisher(node: &SourceNode) -> Result<Value> {
    match node.tag() {
        "hudson.tasks.ArtifactArchiver" => translate_archiver(node),
        "hudson.plugins.descriptionsetter.DescriptionSetterPublisher" => {
            translate_description_setter(node)
        }
        "hudson.tasks.Fingerprinter" => translate_fingerprinter(node),
        "hudson.tasks.junit.JUnitResultArchiver" => translate_junit(node),
        "hudson.tasks.Mailer" => translate_mailer(node),
        "hudson.plugins.parameterizedtrigger.BuildTrigger" => translate_build_trigger(node),
        "htmlpublisher.HtmlPublisher" => translate_html_publisher(node),
        "hudson.plugins.emailext.ExtendedEmailPublisher" => translate_email_ext(node),
        "hudson.plugins.cobertura.CoberturaPublisher" => translate_cobertura(node),
        other => Err(Error::unrecognized(other, "cannot handle publisher")),
    }
}

fn translate_archiver(node: &SourceNode) -> Result<Value> {
    let mut archive = Map::new();
    for element in node.children() {
        match element.tag() {
            "artifacts" | "excludes" => {
                archive.insert(element.tag().to_string(), Value::from_text(element.text()));
            }
            "allowEmptyArchive" => {
                archive.insert("allow-empty".to_string(), Value::Bool(bool_text(element)));
            }
            "fingerprint" => {
                archive.insert("fingerprint".to_string(), Value::Bool(bool_text(element)));
            }
            "onlyIfSuccessful" => {
                archive.insert(
                    "only-if-success".to_string(),
                    Value::Bool(bool_text(element)),
                );
            }
            "defaultExcludes" => {
                archive.insert(
                    "default-excludes".to_string(),
                    Value::Bool(bool_text(element)),
                );
            }
            "latestOnly" => {
                archive.insert("latest-only".to_string(), Value::Bool(bool_text(element)));
            }
            other => return Err(Error::unrecognized(other, "cannot handle archiver setting")),
        }
    }
    Ok(Value::labeled("archive", Value::Map(archive)))
}

fn translate_description_setter(node: &SourceNode) -> Result<Value> {
    let mut setter = Map::new();
    for element in node.children() {
        match element.tag() {
            "regexp" => {
                setter.insert("regexp".to_string(), Value::from_text(element.text()));
            }
            "regexpForFailed" => {
                setter.insert(
                    "regexp-for-failed".to_string(),
                    Value::from_text(element.text()),
                );
            }
            "description" => {
                setter.insert("description".to_string(), Value::from_text(element.text()));
            }
            "setForMatrix" => {
                setter.insert("set-for-matrix".to_string(), Value::Bool(bool_text(element)));
            }
            other => {
                return Err(Error::unrecognized(
                    other,
                    "cannot handle description setter setting",
                ))
            }
        }
    }
    Ok(Value::labeled("description-setter", Value::Map(setter)))
}

fn translate_fingerprinter(node: &SourceNode) -> Result<Value> {
    let mut fingerprint = Map::new();
    for element in node.children() {
        match element.tag() {
            "targets" => {
                fingerprint.insert("files".to_string(), Value::from_text(element.text()));
            }
            "recordBuildArtifacts" => {
                fingerprint.insert(
                    "record-artifacts".to_string(),
                    Value::Bool(bool_text(element)),
                );
            }
            other => {
                return Err(Error::unrecognized(
                    other,
                    "cannot handle fingerprint setting",
                ))
            }
        }
    }
    Ok(Value::labeled("fingerprint", Value::Map(fingerprint)))
}

fn translate_junit(node: &SourceNode) -> Result<Value> {
    let mut junit = Map::new();
    for element in node.children() {
        match element.tag() {
            "testResults" => {
                junit.insert("results".to_string(), Value::from_text(element.text()));
            }
            "keepLongStdio" => {
                junit.insert(
                    "keep-long-stdio".to_string(),
                    Value::Bool(bool_text(element)),
                );
            }
            "healthScaleFactor" => {
                junit.insert(
                    "health-scale-factor".to_string(),
                    Value::from_text(element.text()),
                );
            }
            other => return Err(Error::unrecognized(other, "cannot handle junit setting")),
        }
    }
    Ok(Value::labeled("junit", Value::Map(junit)))
}

fn translate_mailer(node: &SourceNode) -> Result<Value> {
    let mut email = Map::new();
    for element in node.children() {
        match element.tag() {
            "recipients" => {
                email.insert("recipients".to_string(), Value::from_text(element.text()));
            }
            "dontNotifyEveryUnstableBuild" => {
                // The source stores the negation; the output keys the
                // positive form.
                email.insert(
                    "notify-every-unstable-build".to_string(),
                    Value::Bool(!bool_text(element)),
                );
            }
            "sendToIndividuals" => {
                email.insert(
                    "send-to-individuals".to_string(),
                    Value::Bool(bool_text(element)),
                );
            }
            other => return Err(Error::unrecognized(other, "cannot handle mailer setting")),
        }
    }
    Ok(Value::labeled("email", Value::Map(email)))
}

fn translate_build_trigger(node: &SourceNode) -> Result<Value> {
    let configs = node
        .child("configs")
        .ok_or_else(|| Error::unrecognized(node.tag(), "build trigger without configs"))?;

    let mut trigger = Map::new();
    for config in configs.children() {
        if config.tag() != "hudson.plugins.parameterizedtrigger.BuildTriggerConfig" {
            return Err(Error::unrecognized(
                config.tag(),
                "cannot handle build trigger config",
            ));
        }
        for property in config.children() {
            match property.tag() {
                "projects" => {
                    trigger.insert("project".to_string(), Value::from_text(property.text()));
                }
                "condition" => {
                    trigger.insert("condition".to_string(), Value::from_text(property.text()));
                }
                "triggerWithNoParameters" => {
                    trigger.insert(
                        "trigger-with-no-params".to_string(),
                        Value::Bool(bool_text(property)),
                    );
                }
                "configs" => {
                    for inner in property.children() {
                        if inner.tag()
                            != "hudson.plugins.parameterizedtrigger.PredefinedBuildParameters"
                        {
                            return Err(Error::unrecognized(
                                inner.tag(),
                                "cannot handle build trigger parameters",
                            ));
                        }
                        trigger.insert(
                            "predefined-parameters".to_string(),
                            Value::from_text(inner.find_text("properties")),
                        );
                    }
                }
                other => {
                    return Err(Error::unrecognized(
                        other,
                        "cannot handle build trigger property",
                    ))
                }
            }
        }
    }
    // One flat mapping, not a list: repeated configs overwrite earlier
    // fields rather than accumulating records.
    Ok(Value::labeled(
        "trigger-parameterized-builds",
        Value::Map(trigger),
    ))
}

fn translate_html_publisher(node: &SourceNode) -> Result<Value> {
    let [targets] = node.children() else {
        return Err(Error::unrecognized(
            node.tag(),
            "cannot handle html publisher shape",
        ));
    };
    if targets.tag() != "reportTargets" {
        return Err(Error::unrecognized(
            targets.tag(),
            "cannot handle html publisher child",
        ));
    }
    let [target] = targets.children() else {
        return Err(Error::unrecognized(
            targets.tag(),
            "cannot handle multiple html report targets",
        ));
    };
    if target.tag() != "htmlpublisher.HtmlPublisherTarget" {
        return Err(Error::unrecognized(
            target.tag(),
            "cannot handle html report target",
        ));
    }

    let mut html = Map::new();
    for element in target.children() {
        match element.tag() {
            "reportName" => {
                html.insert("name".to_string(), Value::from_text(element.text()));
            }
            "reportDir" => {
                html.insert("dir".to_string(), Value::from_text(element.text()));
            }
            "reportFiles" => {
                html.insert("files".to_string(), Value::from_text(element.text()));
            }
            "alwaysLinkToLastBuild" => {
                html.insert(
                    "link-to-last-build".to_string(),
                    Value::Bool(bool_text(element)),
                );
            }
            "keepAll" => {
                html.insert("keep-all".to_string(), Value::Bool(bool_text(element)));
            }
            "allowMissing" => {
                html.insert("allow-missing".to_string(), Value::Bool(bool_text(element)));
            }
            "wrapperName" => {
                if element.text() != Some("htmlpublisher-wrapper.html") {
                    return Err(Error::unrecognized(
                        element.tag(),
                        "cannot handle custom html wrapper",
                    ));
                }
            }
            other => {
                return Err(Error::unrecognized(
                    other,
                    "cannot handle html publisher setting",
                ))
            }
        }
    }
    Ok(Value::labeled("html-publisher", Value::Map(html)))
}

fn translate_email_ext(node: &SourceNode) -> Result<Value> {
    let mut email = Map::new();
    for element in node.children() {
        match element.tag() {
            "recipientList" => {
                if element.text() != Some("$DEFAULT_RECIPIENTS") {
                    email.insert("recipients".to_string(), Value::from_text(element.text()));
                }
            }
            "replyTo" => {
                if element.text() != Some("$DEFAULT_REPLYTO") {
                    email.insert("reply-to".to_string(), Value::from_text(element.text()));
                }
            }
            "defaultSubject" => {
                if element.text() != Some("$DEFAULT_SUBJECT") {
                    email.insert("subject".to_string(), Value::from_text(element.text()));
                }
            }
            "defaultContent" => {
                if element.text() != Some("$DEFAULT_CONTENT") {
                    email.insert("body".to_string(), Value::from_text(element.text()));
                }
            }
            "presendScript" => {
                if element.text() != Some("$DEFAULT_PRESEND_SCRIPT") {
                    email.insert(
                        "presend-script".to_string(),
                        Value::from_text(element.text()),
                    );
                }
            }
            "contentType" => {
                let text = element.text().unwrap_or_default();
                if text != "default" {
                    let kind = select(EMAIL_CONTENT_TYPES, text, element.tag(), "content type")?;
                    email.insert("content-type".to_string(), Value::string(kind));
                }
            }
            "attachBuildLog" => {
                if bool_text(element) {
                    email.insert("attach-build-log".to_string(), Value::Bool(true));
                }
            }
            "compressBuildLog" => {
                if bool_text(element) {
                    email.insert("compress-log".to_string(), Value::Bool(true));
                }
            }
            "saveOutput" => {
                if bool_text(element) {
                    email.insert("save-output".to_string(), Value::Bool(true));
                }
            }
            "disabled" => {
                if bool_text(element) {
                    email.insert("disable-publisher".to_string(), Value::Bool(true));
                }
            }
            "attachmentsPattern" => {
                if let Some(pattern) = element.text() {
                    email.insert("attachments".to_string(), Value::string(pattern));
                }
            }
            "configuredTriggers" => {
                // JJB turns on the failure notification by default, so
                // start from the opposite and let the source add it back.
                email.insert("failure".to_string(), Value::Bool(false));
                for trigger in element.children() {
                    let short = trigger
                        .tag()
                        .strip_prefix(EMAIL_TRIGGER_PREFIX)
                        .unwrap_or(trigger.tag());
                    let kind =
                        select(EMAIL_TRIGGER_KINDS, short, trigger.tag(), "email trigger")?;
                    email.insert(kind.to_string(), Value::Bool(true));
                }
                if email.get("failure") == Some(&Value::Bool(true)) {
                    email.shift_remove("failure");
                }
            }
            other => {
                return Err(Error::unrecognized(
                    other,
                    "cannot handle extended email setting",
                ))
            }
        }
    }
    Ok(Value::labeled("email-ext", Value::Map(email)))
}

fn translate_cobertura(node: &SourceNode) -> Result<Value> {
    let mut cobertura = Map::new();
    let mut metrics = Map::new();
    for element in node.children() {
        match element.tag() {
            "coberturaReportFile" => {
                cobertura.insert("report-file".to_string(), Value::from_text(element.text()));
            }
            "healthyTarget" => {
                metrics = deep_merge(&metrics, &coverage_targets(element, "healthy")?);
            }
            "unhealthyTarget" => {
                metrics = deep_merge(&metrics, &coverage_targets(element, "unhealthy")?);
            }
            "failingTarget" => {
                metrics = deep_merge(&metrics, &coverage_targets(element, "failing")?);
            }
            other => return Err(Error::unrecognized(other, "cannot handle cobertura setting")),
        }
    }
    if !metrics.is_empty() {
        let targets = metrics
            .into_iter()
            .map(|(metric, thresholds)| Value::labeled(metric, thresholds))
            .collect();
        cobertura.insert("targets".to_string(), Value::Seq(targets));
    }
    Ok(Value::labeled("cobertura", Value::Map(cobertura)))
}

/// Read one `<targets>` table of a cobertura threshold kind into
/// `{metric: {kind: percentage}}`, ready for merging with the other kinds.
fn coverage_targets(node: &SourceNode, kind: &str) -> Result<Map> {
    let targets = node
        .child("targets")
        .ok_or_else(|| Error::unrecognized(node.tag(), "coverage target without targets"))?;

    let mut out = Map::new();
    for entry in targets.children() {
        let metric = entry
            .find_text("hudson.plugins.cobertura.targets.CoverageMetric")
            .map(str::to_lowercase)
            .ok_or_else(|| Error::unrecognized(entry.tag(), "coverage entry without a metric"))?;
        let scaled: i64 = entry
            .find_text("int")
            .and_then(|text| text.parse().ok())
            .ok_or_else(|| Error::unrecognized(entry.tag(), "coverage entry without a value"))?;
        // Thresholds are stored as percentages scaled by 100000.
        if scaled % 100_000 != 0 {
            return Err(Error::unrecognized(
                entry.tag(),
                format!("cannot handle fractional coverage threshold {scaled}"),
            ));
        }
        let mut thresholds = Map::new();
        thresholds.insert(
            kind.to_string(),
            Value::string((scaled / 100_000).to_string()),
        );
        out.insert(metric, Value::Map(thresholds));
    }
    Ok(out)
}
