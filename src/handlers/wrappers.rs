//! Build wrapper handler.

use crate::error::{Error, Result};
use crate::tree::SourceNode;
use crate::value::{Map, Value};

use super::{bool_text, contain, HandlerResult};

/// Handle `<buildWrappers>`.
pub fn wrappers(top: &SourceNode) -> HandlerResult {
    let mut out = Vec::new();
    for child in top.children() {
        if let Some(item) = contain(child, translate_wrapper(child))? {
            out.push(item.into_value());
        }
    }
    Ok(Some(vec![("wrappers".to_string(), Value::Seq(out))]))
}

fn translate_wrapper(node: &SourceNode) -> Result<Option<Value>> {
    match node.tag() {
        "EnvInjectPasswordWrapper" => {
            let mut inject = Map::new();
            for element in node.children() {
                match element.tag() {
                    "injectGlobalPasswords" => {
                        inject.insert("global".to_string(), Value::Bool(bool_text(element)));
                    }
                    "maskPasswordParameters" => {
                        inject.insert(
                            "mask-password-params".to_string(),
                            Value::Bool(bool_text(element)),
                        );
                    }
                    "passwordEntries" => {
                        if !element.children().is_empty() {
                            return Err(Error::unrecognized(
                                element.tag(),
                                "cannot handle password entries",
                            ));
                        }
                    }
                    other => {
                        return Err(Error::unrecognized(
                            other,
                            "cannot handle password injection setting",
                        ))
                    }
                }
            }
            Ok(Some(Value::labeled("inject", Value::Map(inject))))
        }

        // Known but meaningless to the output; consumed silently.
        "hudson.plugins.build__timeout.BuildTimeoutWrapper" => Ok(None),

        "hudson.plugins.ansicolor.AnsiColorBuildWrapper" => {
            let mut ansicolor = Map::new();
            ansicolor.insert("colormap".to_string(), Value::string("xterm"));
            Ok(Some(Value::labeled("ansicolor", Value::Map(ansicolor))))
        }

        "com.cloudbees.jenkins.plugins.sshagent.SSHAgentBuildWrapper" => {
            let mut agent = Map::new();
            for element in node.children() {
                match element.tag() {
                    "credentialIds" => {
                        let users = element
                            .children()
                            .iter()
                            .map(|id| Value::from_text(id.text()))
                            .collect();
                        agent.insert("users".to_string(), Value::Seq(users));
                    }
                    "ignoreMissing" => {}
                    other => {
                        return Err(Error::unrecognized(
                            other,
                            "cannot handle ssh agent setting",
                        ))
                    }
                }
            }
            Ok(Some(Value::labeled(
                "ssh-agent-credentials",
                Value::Map(agent),
            )))
        }

        "org.jenkinsci.plugins.buildnamesetter.BuildNameSetter" => {
            let [template] = node.children() else {
                return Err(Error::unrecognized(
                    node.tag(),
                    "cannot handle build name setter shape",
                ));
            };
            let mut setter = Map::new();
            setter.insert("name".to_string(), Value::from_text(template.text()));
            Ok(Some(Value::labeled("build-name", Value::Map(setter))))
        }

        other => Err(Error::unrecognized(other, "cannot handle wrapper")),
    }
}
