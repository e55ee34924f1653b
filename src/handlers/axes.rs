//! Matrix axis handler.

use crate::error::{Error, Result};
use crate::tree::SourceNode;
use crate::value::{Map, Value};

use super::{contain, HandlerResult};

/// Handle `<axes>` of a matrix job.
pub fn axes(top: &SourceNode) -> HandlerResult {
    let mut out = Vec::new();
    for child in top.children() {
        if let Some(item) = contain(child, translate_axis(child).map(Some))? {
            out.push(item.into_value());
        }
    }
    Ok(Some(vec![("axes".to_string(), Value::Seq(out))]))
}

fn translate_axis(node: &SourceNode) -> Result<Value> {
    let kind = match node.tag() {
        "hudson.matrix.LabelExpAxis" => "label-expression",
        "hudson.matrix.LabelAxis" => "slave",
        other => return Err(Error::unrecognized(other, "cannot handle axis")),
    };

    let mut axis = Map::new();
    axis.insert("type".to_string(), Value::string(kind));
    for element in node.children() {
        match element.tag() {
            "name" => {
                axis.insert("name".to_string(), Value::from_text(element.text()));
            }
            "values" => {
                let values = element
                    .children()
                    .iter()
                    .map(|value| Value::from_text(value.text()))
                    .collect();
                axis.insert("values".to_string(), Value::Seq(values));
            }
            other => return Err(Error::unrecognized(other, "cannot handle axis setting")),
        }
    }
    Ok(Value::labeled("axis", Value::Map(axis)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::parse_document;

    fn axis_list(xml: &str) -> Vec<Value> {
        let node = parse_document(xml).unwrap();
        let entries = axes(&node).unwrap().unwrap();
        entries[0].1.as_seq().unwrap().to_vec()
    }

    #[test]
    fn test_label_expression_axis() {
        let list = axis_list(
            r#"<axes><hudson.matrix.LabelExpAxis>
              <name>PLATFORM</name>
              <values><string>linux</string><string>windows</string></values>
            </hudson.matrix.LabelExpAxis></axes>"#,
        );
        let axis = list[0].as_map().unwrap()["axis"].as_map().unwrap();
        assert_eq!(axis.get("type"), Some(&Value::string("label-expression")));
        assert_eq!(axis.get("name"), Some(&Value::string("PLATFORM")));
        assert_eq!(
            axis.get("values"),
            Some(&Value::Seq(vec![
                Value::string("linux"),
                Value::string("windows")
            ]))
        );
    }

    #[test]
    fn test_label_axis_is_slave_type() {
        let list = axis_list(
            "<axes><hudson.matrix.LabelAxis><name>node</name><values><string>builder-1</string></values></hudson.matrix.LabelAxis></axes>",
        );
        let axis = list[0].as_map().unwrap()["axis"].as_map().unwrap();
        assert_eq!(axis.get("type"), Some(&Value::string("slave")));
    }

    #[test]
    fn test_unknown_axis_goes_raw() {
        let list = axis_list(
            "<axes><hudson.matrix.TextAxis><name>GOAL</name></hudson.matrix.TextAxis><hudson.matrix.LabelAxis><name>node</name></hudson.matrix.LabelAxis></axes>",
        );
        assert!(list[0].is_raw());
        assert!(!list[1].is_raw());
    }
}
