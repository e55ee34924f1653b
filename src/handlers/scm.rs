//! Source-control configuration handler.
//!
//! `<scm>` is the most polymorphic element of a job: the concrete type
//! hides in the `class` discriminator. Three shapes are recognized:
//!
//! - `hudson.scm.NullSCM` — "no SCM"; translated to absence, not an empty
//!   record;
//! - the multi-SCM wrapper — each contained definition is normalized
//!   independently, so one broken definition degrades alone;
//! - git — normalized field by field, with the build-chooser resolved
//!   through a selector table and the boolean options run through the
//!   per-field default policy (including the `wipe-workspace` and
//!   `skip-tag` polarity flips).
//!
//! Anything else becomes a single fallback block inside the `scm` list.

use crate::defaults::{self, GIT_BOOL_FIELDS};
use crate::error::{Error, Result};
use crate::tree::SourceNode;
use crate::value::{Map, Value};

use super::{bool_text, contain, select, HandlerResult};

const GIT_CLASS: &str = "hudson.plugins.git.GitSCM";
const NULL_CLASS: &str = "hudson.scm.NullSCM";
const MULTI_CLASS: &str = "org.jenkinsci.plugins.multiplescms.MultiSCM";

/// Build-chooser strategies. `default` needs no explicit YAML.
static CHOOSING_STRATEGIES: &[(&str, &str)] = &[
    ("hudson.plugins.git.util.DefaultBuildChooser", "default"),
    ("hudson.plugins.git.util.InverseBuildChooser", "inverse"),
    (
        "com.sonyericsson.hudson.plugins.gerrit.trigger.hudsontrigger.GerritTriggerBuildChooser",
        "gerrit",
    ),
];

/// Handle `<scm>` (and, recursively, each definition inside a multi-SCM
/// wrapper).
pub fn scm(top: &SourceNode) -> HandlerResult {
    match top.class() {
        Some(NULL_CLASS) => return Ok(None),
        Some(MULTI_CLASS) => {
            let scms = top.child("scms").ok_or_else(|| {
                Error::unrecognized(top.tag(), "multi-SCM wrapper without an <scms> container")
            })?;
            let mut records = Vec::new();
            for child in scms.children() {
                if let Some(item) = contain(child, translate_git(child).map(Some))? {
                    records.push(item.into_value());
                }
            }
            return Ok(Some(vec![("scm".to_string(), Value::Seq(records))]));
        }
        _ => {}
    }

    let record = match contain(top, translate_git(top).map(Some))? {
        Some(item) => item.into_value(),
        None => return Ok(None),
    };
    Ok(Some(vec![("scm".to_string(), Value::Seq(vec![record]))]))
}

/// Normalize one git definition into a `{git: {...}}` record.
fn translate_git(top: &SourceNode) -> Result<Value> {
    if top.tag() != GIT_CLASS && top.class() != Some(GIT_CLASS) {
        return Err(Error::unrecognized(
            top.tag(),
            format!(
                "{} SCM not supported",
                top.class().unwrap_or_else(|| top.tag())
            ),
        ));
    }

    let mut git = Map::new();
    let mut wipe_workspace = None;
    let mut skip_tag = None;

    for child in top.children() {
        match child.tag() {
            // internal bookkeeping, no YAML counterpart
            "configVersion" | "doGenerateSubmoduleConfigurations" => {}

            "userRemoteConfigs" => {
                let [remote] = child.children() else {
                    return Err(Error::unrecognized(
                        child.tag(),
                        format!("not supported with {} children", child.children().len()),
                    ));
                };
                for setting in remote.children() {
                    match setting.tag() {
                        "url" | "name" | "refspec" => {
                            git.insert(setting.tag().to_string(), Value::from_text(setting.text()));
                        }
                        "credentialsId" => {
                            git.insert(
                                "credentials-id".to_string(),
                                Value::from_text(setting.text()),
                            );
                        }
                        other => {
                            return Err(Error::unrecognized(
                                other,
                                "cannot handle UserRemoteConfig setting",
                            ))
                        }
                    }
                }
            }

            "branches" => {
                let first = child.children().first().and_then(|s| s.children().first());
                if first.map(SourceNode::tag) != Some("name") {
                    return Err(Error::unrecognized(child.tag(), "branch spec without name"));
                }
                let mut branches = Vec::new();
                for spec in child.children() {
                    for branch in spec.children() {
                        branches.push(Value::from_text(branch.text()));
                    }
                }
                git.insert("branches".to_string(), Value::Seq(branches));
            }

            "gitTool" => {
                git.insert("git-tool".to_string(), Value::from_text(child.text()));
            }

            "localBranch" => {
                git.insert("local-branch".to_string(), Value::from_text(child.text()));
            }

            "excludedUsers" => {
                if let Some(text) = child.text() {
                    let users: Vec<Value> =
                        text.split_whitespace().map(Value::string).collect();
                    if !users.is_empty() {
                        git.insert("excluded-users".to_string(), Value::Seq(users));
                    }
                }
            }

            "buildChooser" => {
                let class = child.class().ok_or_else(|| {
                    Error::unrecognized(child.tag(), "build chooser without a class")
                })?;
                let label = select(CHOOSING_STRATEGIES, class, child.tag(), "build chooser")?;
                if label != "default" {
                    git.insert("choosing-strategy".to_string(), Value::string(label));
                }
            }

            "disableSubmodules" | "recursiveSubmodules" => {
                // 'false' is the default and needs no explicit YAML.
                if bool_text(child) {
                    return Err(Error::unrecognized(
                        child.tag(),
                        "submodule handling not supported",
                    ));
                }
            }

            "authorOrCommitter" => set_flag(&mut git, "use-author", bool_text(child)),
            "useShallowClone" => set_flag(&mut git, "shallow-clone", bool_text(child)),
            "ignoreNotifyCommit" => set_flag(&mut git, "ignore-notify", bool_text(child)),
            "pruneBranches" => set_flag(&mut git, "prune", bool_text(child)),
            "remotePoll" => set_flag(&mut git, "fastpoll", bool_text(child)),

            "wipeOutWorkspace" => wipe_workspace = Some(bool_text(child)),
            "skipTag" => skip_tag = Some(bool_text(child)),

            "relativeTargetDir" => {
                if let Some(text) = child.text() {
                    git.insert("basedir".to_string(), Value::string(text));
                }
            }

            // If these are empty, we're good.
            "reference" | "gitConfigName" | "gitConfigEmail" | "scmName" => {
                if child.text().is_some() || !child.children().is_empty() {
                    return Err(Error::unrecognized(child.tag(), "non-empty setting"));
                }
            }

            "submoduleCfg" => {
                if !child.children().is_empty() {
                    return Err(Error::unrecognized(
                        child.tag(),
                        format!("not supported with {} children", child.children().len()),
                    ));
                }
            }

            "browser" => translate_browser(child, &mut git)?,

            "extensions" => {
                if let Some(basedir) = extensions_basedir(child)? {
                    git.insert("basedir".to_string(), basedir);
                }
            }

            other => return Err(Error::unrecognized(other, "cannot handle git option")),
        }
    }

    // Polarity flips: Jenkins and JJB disagree on the implicit default, so
    // an absent element still produces an explicit entry.
    for (key, seen) in [("wipe-workspace", wipe_workspace), ("skip-tag", skip_tag)] {
        if let Some(field) = defaults::lookup(GIT_BOOL_FIELDS, key) {
            if let Some(value) = defaults::emit_bool(field, seen) {
                git.insert(key.to_string(), Value::Bool(value));
            }
        }
    }

    Ok(Value::labeled("git", Value::Map(git)))
}

/// Insert a boolean option, suppressed at its default.
fn set_flag(git: &mut Map, key: &str, value: bool) {
    if let Some(field) = defaults::lookup(GIT_BOOL_FIELDS, key) {
        if let Some(value) = defaults::emit_bool(field, Some(value)) {
            git.insert(key.to_string(), Value::Bool(value));
        }
    }
}

fn translate_browser(child: &SourceNode, git: &mut Map) -> Result<()> {
    match child.class() {
        Some("hudson.plugins.git.browser.GitBlitRepositoryBrowser") => {
            git.insert("browser".to_string(), Value::string("gitblit"));
            for item in child.children() {
                match item.tag() {
                    "url" => {
                        git.insert("browser-url".to_string(), Value::from_text(item.text()));
                    }
                    "projectName" => {
                        git.insert("project-name".to_string(), Value::from_text(item.text()));
                    }
                    other => {
                        return Err(Error::unrecognized(
                            other,
                            "cannot handle browser config",
                        ))
                    }
                }
            }
        }
        Some("hudson.plugins.git.browser.GithubWeb") => {
            git.insert("browser".to_string(), Value::string("githubweb"));
            for item in child.children() {
                match item.tag() {
                    "url" => {
                        git.insert("browser-url".to_string(), Value::from_text(item.text()));
                    }
                    other => {
                        return Err(Error::unrecognized(
                            other,
                            "cannot handle browser config",
                        ))
                    }
                }
            }
        }
        other => {
            if child.text().is_some() || !child.children().is_empty() {
                return Err(Error::unrecognized(
                    child.tag(),
                    format!("cannot handle browser {}", other.unwrap_or("without class")),
                ));
            }
        }
    }
    Ok(())
}

/// The modern exporter moves `relativeTargetDir` under `<extensions>`; an
/// empty extensions block is simply skipped.
fn extensions_basedir(child: &SourceNode) -> Result<Option<Value>> {
    let Some(extension) = child.children().first() else {
        return Ok(None);
    };
    if extension.children().is_empty() {
        return Ok(None);
    }
    if child.children().len() != 1 || extension.children().len() != 1 {
        return Err(Error::unrecognized(
            child.tag(),
            format!("not supported with {} children", child.children().len()),
        ));
    }
    let setting = &extension.children()[0];
    if setting.tag() != "relativeTargetDir" {
        return Err(Error::unrecognized(setting.tag(), "XML not supported"));
    }
    Ok(Some(Value::from_text(setting.text())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::parse_document;

    const GIT_XML: &str = r#"<scm class="hudson.plugins.git.GitSCM">
  <configVersion>2</configVersion>
  <userRemoteConfigs>
    <hudson.plugins.git.UserRemoteConfig>
      <url>git://example.com/repo.git</url>
      <credentialsId>deadbeef</credentialsId>
    </hudson.plugins.git.UserRemoteConfig>
  </userRemoteConfigs>
  <branches>
    <hudson.plugins.git.BranchSpec>
      <name>master</name>
    </hudson.plugins.git.BranchSpec>
  </branches>
  <skipTag>true</skipTag>
</scm>"#;

    fn git_record(xml: &str) -> Map {
        let node = parse_document(xml).unwrap();
        let entries = scm(&node).unwrap().unwrap();
        let list = entries[0].1.as_seq().unwrap();
        list[0].as_map().unwrap()["git"]
            .as_map()
            .unwrap()
            .clone()
    }

    #[test]
    fn test_null_scm_is_absence() {
        let node = parse_document(r#"<scm class="hudson.scm.NullSCM"/>"#).unwrap();
        assert_eq!(scm(&node).unwrap(), None);
    }

    #[test]
    fn test_git_basic_fields() {
        let git = git_record(GIT_XML);
        assert_eq!(git.get("url"), Some(&Value::string("git://example.com/repo.git")));
        assert_eq!(git.get("credentials-id"), Some(&Value::string("deadbeef")));
        assert_eq!(
            git.get("branches"),
            Some(&Value::Seq(vec![Value::string("master")]))
        );
    }

    #[test]
    fn test_wipe_workspace_flip_materialized_when_absent() {
        let git = git_record(GIT_XML);
        // Jenkins default false differs from the JJB default true.
        assert_eq!(git.get("wipe-workspace"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_skip_tag_true_matches_jjb_default_and_is_suppressed() {
        let git = git_record(GIT_XML);
        assert_eq!(git.get("skip-tag"), None);
    }

    #[test]
    fn test_skip_tag_false_is_emitted() {
        let xml = GIT_XML.replace(
            "<skipTag>true</skipTag>",
            "<skipTag>false</skipTag>",
        );
        let git = git_record(&xml);
        assert_eq!(git.get("skip-tag"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_default_build_chooser_needs_no_yaml() {
        let xml = GIT_XML.replace(
            "<skipTag>true</skipTag>",
            r#"<buildChooser class="hudson.plugins.git.util.DefaultBuildChooser"/>"#,
        );
        let git = git_record(&xml);
        assert_eq!(git.get("choosing-strategy"), None);
    }

    #[test]
    fn test_inverse_build_chooser_uses_selector_table() {
        let xml = GIT_XML.replace(
            "<skipTag>true</skipTag>",
            r#"<buildChooser class="hudson.plugins.git.util.InverseBuildChooser"/>"#,
        );
        let git = git_record(&xml);
        assert_eq!(git.get("choosing-strategy"), Some(&Value::string("inverse")));
    }

    #[test]
    fn test_unknown_scm_goes_raw() {
        let node =
            parse_document(r#"<scm class="hudson.scm.SubversionSCM"><locations/></scm>"#).unwrap();
        let entries = scm(&node).unwrap().unwrap();
        let list = entries[0].1.as_seq().unwrap();
        assert_eq!(list.len(), 1);
        assert!(list[0].is_raw());
        assert!(list[0].raw_text().unwrap().contains("SubversionSCM"));
    }

    #[test]
    fn test_multi_scm_yields_independent_records() {
        let inner = GIT_XML
            .replace(r#"<scm class="hudson.plugins.git.GitSCM">"#, "<hudson.plugins.git.GitSCM>")
            .replace("</scm>", "</hudson.plugins.git.GitSCM>");
        let second = inner.replace("repo.git", "other.git");
        let xml = format!(
            r#"<scm class="org.jenkinsci.plugins.multiplescms.MultiSCM"><scms>{inner}{second}</scms></scm>"#
        );
        let node = parse_document(&xml).unwrap();
        let entries = scm(&node).unwrap().unwrap();
        let list = entries[0].1.as_seq().unwrap();
        assert_eq!(list.len(), 2);
        let urls: Vec<&Value> = list
            .iter()
            .map(|record| {
                record.as_map().unwrap()["git"]
                    .as_map()
                    .unwrap()
                    .get("url")
                    .unwrap()
            })
            .collect();
        assert_eq!(urls[0], &Value::string("git://example.com/repo.git"));
        assert_eq!(urls[1], &Value::string("git://example.com/other.git"));
        // Per-field rules apply to each record independently.
        for record in list {
            let git = record.as_map().unwrap()["git"].as_map().unwrap();
            assert_eq!(git.get("wipe-workspace"), Some(&Value::Bool(false)));
        }
    }

    #[test]
    fn test_multi_scm_isolates_broken_definition() {
        let good = GIT_XML
            .replace(r#"<scm class="hudson.plugins.git.GitSCM">"#, "<hudson.plugins.git.GitSCM>")
            .replace("</scm>", "</hudson.plugins.git.GitSCM>");
        let xml = format!(
            r#"<scm class="org.jenkinsci.plugins.multiplescms.MultiSCM"><scms>{good}<hudson.scm.CVSSCM><module>m</module></hudson.scm.CVSSCM></scms></scm>"#
        );
        let node = parse_document(&xml).unwrap();
        let entries = scm(&node).unwrap().unwrap();
        let list = entries[0].1.as_seq().unwrap();
        assert_eq!(list.len(), 2);
        assert!(!list[0].is_raw());
        assert!(list[1].is_raw());
    }

    #[test]
    fn test_excluded_users_split_on_whitespace() {
        let xml = GIT_XML.replace(
            "<skipTag>true</skipTag>",
            "<excludedUsers>alice bob</excludedUsers>",
        );
        let git = git_record(&xml);
        assert_eq!(
            git.get("excluded-users"),
            Some(&Value::Seq(vec![
                Value::string("alice"),
                Value::string("bob")
            ]))
        );
    }

    #[test]
    fn test_extensions_relative_target_dir() {
        let xml = GIT_XML.replace(
            "<skipTag>true</skipTag>",
            "<extensions><hudson.plugins.git.extensions.impl.RelativeTargetDirectory><relativeTargetDir>sub/dir</relativeTargetDir></hudson.plugins.git.extensions.impl.RelativeTargetDirectory></extensions>",
        );
        let git = git_record(&xml);
        assert_eq!(git.get("basedir"), Some(&Value::string("sub/dir")));
    }

    #[test]
    fn test_empty_extensions_skipped() {
        let xml = GIT_XML.replace("<skipTag>true</skipTag>", "<extensions/>");
        let git = git_record(&xml);
        assert_eq!(git.get("basedir"), None);
    }

    #[test]
    fn test_unknown_git_option_degrades_whole_definition() {
        let xml = GIT_XML.replace(
            "<skipTag>true</skipTag>",
            "<mysteryOption>yes</mysteryOption>",
        );
        let node = parse_document(&xml).unwrap();
        let entries = scm(&node).unwrap().unwrap();
        let list = entries[0].1.as_seq().unwrap();
        assert_eq!(list.len(), 1);
        assert!(list[0].is_raw());
    }

    #[test]
    fn test_browser_githubweb() {
        let xml = GIT_XML.replace(
            "<skipTag>true</skipTag>",
            r#"<browser class="hudson.plugins.git.browser.GithubWeb"><url>https://github.com/x/y</url></browser>"#,
        );
        let git = git_record(&xml);
        assert_eq!(git.get("browser"), Some(&Value::string("githubweb")));
        assert_eq!(
            git.get("browser-url"),
            Some(&Value::string("https://github.com/x/y"))
        );
    }
}
