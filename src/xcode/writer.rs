//! Serializer that emits manifests in Xcode's own layout.
//!
//! Records are grouped into `/* Begin <isa> section */` blocks sorted by isa
//! and then by id. Build-file and file-reference records are written on a
//! single line. Any string that names another record is followed by a
//! `/* comment */` describing that record. Output depends only on the
//! graph's contents, so parsing and rewriting a written manifest reproduces
//! it byte for byte.
use std::collections::{BTreeMap, HashMap};

use super::value::{Dict, Value, get_str, get_str_array};

/// Records written on a single line.
const INLINE_ISAS: &[&str] = &["PBXBuildFile", "PBXFileReference"];

/// Keys whose identifiers Xcode leaves unannotated.
const UNANNOTATED_KEYS: &[&str] = &["remoteGlobalIDString"];

/// Render the manifest.
///
/// `root` supplies the top-level keys in order; the value stored under
/// `objects` is replaced by the `objects` graph. `project_name` is used to
/// annotate the project's configuration list.
#[must_use]
pub fn write(root: &Dict, objects: &Dict, project_name: &str) -> String {
    let writer = Writer {
        comments: comments(objects, project_name),
    };
    let mut out = String::from("// !$*UTF8*$!\n{\n");
    for (key, value) in root {
        out.push('\t');
        out.push_str(&quote(key));
        out.push_str(" = ");
        if key == "objects" {
            writer.write_objects(&mut out, objects);
        } else {
            writer.write_value(&mut out, value, 1, annotates(key));
        }
        out.push_str(";\n");
    }
    out.push_str("}\n");
    out
}

struct Writer {
    comments: HashMap<String, String>,
}

impl Writer {
    fn write_objects(&self, out: &mut String, objects: &Dict) {
        let mut sections: BTreeMap<&str, Vec<(&String, &Dict)>> = BTreeMap::new();
        for (id, value) in objects {
            let Some(record) = value.as_dict() else {
                continue;
            };
            let isa = get_str(record, "isa").unwrap_or("PBXObject");
            sections.entry(isa).or_default().push((id, record));
        }

        out.push_str("{\n");
        for (isa, mut records) in sections {
            records.sort_by(|a, b| a.0.cmp(b.0));
            let inline = INLINE_ISAS.contains(&isa);
            out.push_str(&format!("\n/* Begin {isa} section */\n"));
            for (id, record) in records {
                out.push_str("\t\t");
                self.write_string(out, id, true);
                out.push_str(" = ");
                if inline {
                    self.write_inline_dict(out, record);
                } else {
                    self.write_dict(out, record, 2);
                }
                out.push_str(";\n");
            }
            out.push_str(&format!("/* End {isa} section */\n"));
        }
        out.push('\t');
        out.push('}');
    }

    fn write_value(&self, out: &mut String, value: &Value, indent: usize, annotate: bool) {
        match value {
            Value::String(s) => self.write_string(out, s, annotate),
            Value::Array(items) => {
                out.push_str("(\n");
                for item in items {
                    push_tabs(out, indent + 1);
                    self.write_value(out, item, indent + 1, annotate);
                    out.push_str(",\n");
                }
                push_tabs(out, indent);
                out.push(')');
            }
            Value::Dict(dict) => self.write_dict(out, dict, indent),
        }
    }

    fn write_dict(&self, out: &mut String, dict: &Dict, indent: usize) {
        out.push_str("{\n");
        for (key, value) in dict {
            push_tabs(out, indent + 1);
            out.push_str(&quote(key));
            out.push_str(" = ");
            self.write_value(out, value, indent + 1, annotates(key));
            out.push_str(";\n");
        }
        push_tabs(out, indent);
        out.push('}');
    }

    fn write_inline_value(&self, out: &mut String, value: &Value, annotate: bool) {
        match value {
            Value::String(s) => self.write_string(out, s, annotate),
            Value::Array(items) => {
                out.push('(');
                for item in items {
                    self.write_inline_value(out, item, annotate);
                    out.push_str(", ");
                }
                out.push(')');
            }
            Value::Dict(dict) => self.write_inline_dict(out, dict),
        }
    }

    fn write_inline_dict(&self, out: &mut String, dict: &Dict) {
        out.push('{');
        for (key, value) in dict {
            out.push_str(&quote(key));
            out.push_str(" = ");
            self.write_inline_value(out, value, annotates(key));
            out.push_str("; ");
        }
        out.push('}');
    }

    fn write_string(&self, out: &mut String, s: &str, annotate: bool) {
        out.push_str(&quote(s));
        if annotate && let Some(comment) = self.comments.get(s) {
            out.push_str(" /* ");
            out.push_str(comment);
            out.push_str(" */");
        }
    }
}

fn annotates(key: &str) -> bool {
    !UNANNOTATED_KEYS.contains(&key)
}

fn push_tabs(out: &mut String, count: usize) {
    for _ in 0..count {
        out.push('\t');
    }
}

/// Whether `s` can be written without quotes and read back unchanged.
fn is_bare(s: &str) -> bool {
    !s.is_empty()
        && !s.contains("//")
        && !s.contains("/*")
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '/' | ':' | '.'))
}

/// Quote and escape `s` unless it is a safe bare token.
fn quote(s: &str) -> String {
    if is_bare(s) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Build the `/* ... */` annotation for every record that has one.
fn comments(objects: &Dict, project_name: &str) -> HashMap<String, String> {
    let records: Vec<(&String, &Dict)> = objects
        .iter()
        .filter_map(|(id, v)| v.as_dict().map(|d| (id, d)))
        .collect();

    let mut phase_of_build_file: HashMap<String, String> = HashMap::new();
    let mut owner_of_config_list: HashMap<String, (String, String)> = HashMap::new();
    for (_, record) in &records {
        let isa = get_str(record, "isa").unwrap_or_default();
        if isa.ends_with("BuildPhase") {
            let phase_name = phase_comment(record, isa);
            for file in get_str_array(record, "files") {
                phase_of_build_file.insert(file, phase_name.clone());
            }
        }
        if let Some(list) = get_str(record, "buildConfigurationList") {
            let owner = if isa == "PBXProject" {
                project_name.to_string()
            } else {
                get_str(record, "name").unwrap_or_default().to_string()
            };
            owner_of_config_list.insert(list.to_string(), (isa.to_string(), owner));
        }
    }

    let mut comments = HashMap::new();
    for (id, record) in &records {
        let isa = get_str(record, "isa").unwrap_or_default();
        let comment = match isa {
            "PBXBuildFile" => {
                let target = get_str(record, "fileRef")
                    .and_then(|r| objects.get(r))
                    .and_then(Value::as_dict)
                    .and_then(display_name)
                    .or_else(|| {
                        get_str(record, "productRef")
                            .and_then(|r| objects.get(r))
                            .and_then(Value::as_dict)
                            .and_then(|d| get_str(d, "productName"))
                    });
                match (target, phase_of_build_file.get(id.as_str())) {
                    (Some(name), Some(phase)) => Some(format!("{name} in {phase}")),
                    (Some(name), None) => Some(name.to_string()),
                    (None, Some(phase)) => Some(format!("(null) in {phase}")),
                    (None, None) => None,
                }
            }
            "PBXProject" => Some("Project object".to_string()),
            "XCConfigurationList" => owner_of_config_list
                .get(id.as_str())
                .map(|(owner_isa, owner)| {
                    format!("Build configuration list for {owner_isa} \"{owner}\"")
                }),
            "PBXContainerItemProxy" | "PBXTargetDependency" => Some(isa.to_string()),
            _ if isa.ends_with("BuildPhase") => Some(phase_comment(record, isa)),
            _ => display_name(record).map(String::from),
        };
        if let Some(comment) = comment {
            comments.insert((*id).clone(), comment);
        }
    }
    comments
}

fn display_name(record: &Dict) -> Option<&str> {
    get_str(record, "name")
        .or_else(|| get_str(record, "path"))
        .or_else(|| get_str(record, "productName"))
}

fn phase_comment(record: &Dict, isa: &str) -> String {
    if let Some(name) = get_str(record, "name") {
        return name.to_string();
    }
    match isa {
        "PBXResourcesBuildPhase" => "Resources",
        "PBXSourcesBuildPhase" => "Sources",
        "PBXFrameworksBuildPhase" => "Frameworks",
        "PBXHeadersBuildPhase" => "Headers",
        "PBXCopyFilesBuildPhase" => "CopyFiles",
        "PBXShellScriptBuildPhase" => "ShellScript",
        other => other,
    }
    .to_string()
}
