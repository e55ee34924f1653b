//! Job property handler.
//!
//! Properties split across two output scopes: the GitHub link lands in the
//! `properties` list while parameter definitions become their own
//! `parameters` list. Either list is omitted when empty.

use crate::error::{Error, Result};
use crate::tree::SourceNode;
use crate::value::{Map, Value};

use super::{contain, Entries, HandlerResult, Item};

/// Handle `<properties>`.
pub fn properties(top: &SourceNode) -> HandlerResult {
    let mut props = Vec::new();
    let mut params = Vec::new();

    for child in top.children() {
        match child.tag() {
            "hudson.model.ParametersDefinitionProperty" => {
                match contain(child, translate_parameters(child).map(Some))? {
                    Some(Item::Typed(Value::Seq(definitions))) => params.extend(definitions),
                    Some(item) => props.push(item.into_value()),
                    None => {}
                }
            }
            _ => {
                if let Some(item) = contain(child, translate_property(child))? {
                    props.push(item.into_value());
                }
            }
        }
    }

    let mut out = Entries::new();
    if !props.is_empty() {
        out.push(("properties".to_string(), Value::Seq(props)));
    }
    if !params.is_empty() {
        out.push(("parameters".to_string(), Value::Seq(params)));
    }
    Ok(if out.is_empty() { None } else { Some(out) })
}

fn translate_property(node: &SourceNode) -> Result<Option<Value>> {
    match node.tag() {
        "com.coravy.hudson.plugins.github.GithubProjectProperty" => {
            let mut github = Map::new();
            for element in node.children() {
                match element.tag() {
                    "projectUrl" => {
                        github.insert("url".to_string(), Value::from_text(element.text()));
                    }
                    other => {
                        return Err(Error::unrecognized(
                            other,
                            "cannot handle github property setting",
                        ))
                    }
                }
            }
            Ok(Some(Value::labeled("github", Value::Map(github))))
        }
        other => Err(Error::unrecognized(other, "cannot handle property")),
    }
}

/// Expand the parameter definitions container into a list. An unknown
/// definition goes raw into the parameters list; its siblings still
/// translate.
fn translate_parameters(node: &SourceNode) -> Result<Value> {
    let mut params = Vec::new();
    for container in node.children() {
        if container.tag() != "parameterDefinitions" {
            return Err(Error::unrecognized(
                container.tag(),
                "cannot handle parameter container",
            ));
        }
        for definition in container.children() {
            if let Some(item) = contain(definition, translate_parameter(definition).map(Some))? {
                params.push(item.into_value());
            }
        }
    }
    Ok(Value::Seq(params))
}

fn translate_parameter(definition: &SourceNode) -> Result<Value> {
    let kind = match definition.tag() {
        "hudson.model.StringParameterDefinition" => "string",
        "hudson.model.BooleanParameterDefinition" => "bool",
        other => return Err(Error::unrecognized(other, "cannot handle parameter")),
    };

    let mut param = Map::new();
    for setting in definition.children() {
        let key = match setting.tag() {
            "defaultValue" => "default",
            other => other,
        };
        param.insert(key.to_string(), Value::from_text(setting.text()));
    }
    Ok(Value::labeled(kind, Value::Map(param)))
}
