//! Block-style YAML rendering.
//!
//! The output format is hand-rendered rather than delegated to a serializer
//! because translated jobs need literal block scalars for multi-line shell
//! commands and raw XML payloads, and the entry order of every mapping must
//! survive verbatim. Scalars that would round-trip as a different type
//! (numbers, booleans, null words) are single-quoted so they stay strings.

use crate::value::{Map, Scope, Value};

/// Render one job as a single-document YAML fragment.
///
/// The document is a one-element list holding a `job` mapping whose first
/// key is the job name, followed by the translated settings in source
/// order.
pub fn job_document(name: &str, scope: &Scope) -> String {
    let mut job = Map::new();
    job.insert("name".to_string(), Value::string(name));
    for (key, value) in scope {
        job.insert(key.clone(), value.clone());
    }

    let mut out = String::new();
    out.push_str("- job:\n");
    write_map(&mut out, &job, 4);
    out
}

fn write_map(out: &mut String, map: &Map, indent: usize) {
    for (key, value) in map {
        write_entry(out, key, value, indent);
    }
}

fn write_entry(out: &mut String, key: &str, value: &Value, indent: usize) {
    let pad = " ".repeat(indent);
    match value {
        Value::Map(map) if map.is_empty() => {
            out.push_str(&format!("{pad}{key}: {{}}\n"));
        }
        Value::Map(map) => {
            out.push_str(&format!("{pad}{key}:\n"));
            write_map(out, map, indent + 2);
        }
        Value::Seq(seq) if seq.is_empty() => {
            out.push_str(&format!("{pad}{key}: []\n"));
        }
        // Sequences are indentless: the dash sits at the key's own column.
        Value::Seq(seq) => {
            out.push_str(&format!("{pad}{key}:\n"));
            write_seq(out, seq, indent);
        }
        Value::String(text) if text.contains('\n') => {
            write_block_scalar(out, &format!("{pad}{key}:"), text, indent + 2);
        }
        scalar => {
            out.push_str(&format!("{pad}{key}: {}\n", flow_scalar(scalar)));
        }
    }
}

fn write_seq(out: &mut String, seq: &[Value], indent: usize) {
    let pad = " ".repeat(indent);
    for item in seq {
        match item {
            Value::Map(map) if !map.is_empty() => {
                // First entry rides on the dash line; the rest align under it.
                let mut entries = map.iter();
                let (key, value) = entries.next().unwrap();
                let mut first = String::new();
                write_entry(&mut first, key, value, indent + 2);
                out.push_str(&format!("{pad}- {}", &first[indent + 2..]));
                for (key, value) in entries {
                    write_entry(out, key, value, indent + 2);
                }
            }
            Value::Map(_) => {
                out.push_str(&format!("{pad}- {{}}\n"));
            }
            Value::Seq(inner) if !inner.is_empty() => {
                out.push_str(&format!("{pad}-\n"));
                write_seq(out, inner, indent + 2);
            }
            Value::Seq(_) => {
                out.push_str(&format!("{pad}- []\n"));
            }
            Value::String(text) if text.contains('\n') => {
                write_block_scalar(out, &format!("{pad}-"), text, indent + 2);
            }
            scalar => {
                out.push_str(&format!("{pad}- {}\n", flow_scalar(scalar)));
            }
        }
    }
}

/// Emit a multi-line string as a literal block scalar after `lead`, with
/// the chomping indicator chosen from the trailing newlines. Falls back to
/// a double-quoted scalar when the literal form cannot represent the text.
fn write_block_scalar(out: &mut String, lead: &str, text: &str, indent: usize) {
    let body = text.trim_end_matches('\n');
    let trailing = text.len() - body.len();
    let first_line_unsafe = body.starts_with(' ') || body.starts_with('\n');
    if body.contains('\r') || first_line_unsafe {
        out.push_str(&format!("{lead} {}\n", double_quoted(text)));
        return;
    }

    let indicator = match trailing {
        0 => "|-",
        1 => "|",
        _ => "|+",
    };
    out.push_str(&format!("{lead} {indicator}\n"));
    let pad = " ".repeat(indent);
    for line in body.split('\n') {
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str(&format!("{pad}{line}\n"));
        }
    }
    for _ in 1..trailing {
        out.push('\n');
    }
}

fn flow_scalar(value: &Value) -> String {
    match value {
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::String(text) => {
            if needs_quoting(text) {
                single_quoted(text)
            } else {
                text.clone()
            }
        }
        // Containers never reach here.
        Value::Map(_) | Value::Seq(_) => String::new(),
    }
}

/// Whether a plain rendering of `text` would parse back as something other
/// than the same string.
fn needs_quoting(text: &str) -> bool {
    if text.is_empty() {
        return true;
    }
    if text.starts_with(' ') || text.ends_with(' ') {
        return true;
    }
    if matches!(
        text.to_ascii_lowercase().as_str(),
        "true" | "false" | "yes" | "no" | "on" | "off" | "null" | "~" | "none"
    ) {
        return true;
    }
    if text.parse::<i64>().is_ok() || text.parse::<f64>().is_ok() {
        return true;
    }
    // YAML 1.1 readers take colon-separated digit groups as sexagesimal
    // integers (12:34:56 == 45296).
    if text.contains(':')
        && text
            .split(':')
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
    {
        return true;
    }
    let first = text.chars().next().unwrap_or(' ');
    if "!&*?|>%@`\"'#,[]{}-:".contains(first) {
        return true;
    }
    text.contains(": ")
        || text.ends_with(':')
        || text.contains(" #")
        || text.contains('\t')
}

fn single_quoted(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn double_quoted(text: &str) -> String {
    let mut quoted = String::from("\"");
    for ch in text.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}
