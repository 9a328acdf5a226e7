//! Input and Persistence Adapters
//!
//! File-facing helpers used by the CLI. The core never touches the
//! filesystem; these functions read process records and write serialized
//! documents around it.
//!
//! # Supported Inputs
//!
//! - `.yaml` / `.yml`: a [`ProcessRecord`] in YAML
//! - `.json`: a [`ProcessRecord`] in JSON
//! - `.txt`: the line-oriented format below
//!
//! ```text
//! HR Onboarding|Streamline new hire process|HR,Recruiter,Manager
//! Purpose: Reduce time-to-hire by 30%
//! Job Req Received|start|HR/HR
//! Screen Resumes?|decision|HR/Recruiter|30|Greenhouse
//! Send Offer|end|HR/HR
//! connections: S1->S2,S2->S3
//! ```

use std::fs;
use std::path::Path;

use log::{debug, info};
use serde_json::Value;

use crate::error::ProcessError;
use crate::process::{ProcessCore, ProcessRecord, StepRecord};

/// File format, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
    Text,
}

impl Format {
    /// Detects the format from a path's extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Reads a process record from a YAML, JSON or text file.
pub fn load_input(path: impl AsRef<Path>) -> Result<ProcessRecord, ProcessError> {
    let path = path.as_ref();
    let format = Format::from_path(path).ok_or_else(|| {
        ProcessError::MalformedRecord(format!(
            "Unsupported input '{}': expected .yaml, .yml, .json or .txt",
            path.display()
        ))
    })?;

    info!("Loading process from: {}", path.display());
    let content = fs::read_to_string(path)?;
    debug!("Input loaded ({} bytes)", content.len());

    let record = match format {
        Format::Yaml => serde_yaml::from_str(&content)?,
        Format::Json => serde_json::from_str(&content)?,
        Format::Text => parse_text_record(&content)?,
    };

    info!(
        "Loaded '{}': {} steps, {} answers",
        record.core.name,
        record.steps.len(),
        record.answers.len()
    );
    Ok(record)
}

/// Parses the line-oriented text format.
///
/// The first non-blank line is `Name|Purpose|Role1,Role2`. After that:
/// - `connections: <spec>` sets the connection spec
/// - `name|kind|pool/lane[|duration[|tool]]` adds a step
/// - `key: value` adds an answer under the lowercased key
///
/// A line is an answer when a `:` comes before any `|`, so answer values may
/// contain `|`. Blank lines and lines starting with `#` are skipped.
pub fn parse_text_record(content: &str) -> Result<ProcessRecord, ProcessError> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

    let (_, header) = lines
        .next()
        .ok_or_else(|| ProcessError::MalformedRecord("Input is empty".to_string()))?;
    let mut record = ProcessRecord::new(parse_header(header));

    for (number, line) in lines {
        if let Some(spec) = strip_key(line, "connections") {
            record.connections = spec.to_string();
        } else if let Some((key, value)) = answer_pair(line) {
            let key = key.trim().to_lowercase();
            if key.is_empty() {
                return Err(malformed_line(number, line, "answer key is empty"));
            }
            record.answers.insert(key, value.trim().to_string());
        } else if line.contains('|') {
            record.steps.push(parse_step_line(number, line)?);
        } else {
            return Err(malformed_line(number, line, "expected a step or 'key: value'"));
        }
    }

    Ok(record)
}

fn parse_header(line: &str) -> ProcessCore {
    let mut parts = line.splitn(3, '|').map(str::trim);
    let name = parts.next().filter(|n| !n.is_empty());
    let why = parts.next().unwrap_or_default();
    let roles = parts
        .next()
        .map(|r| {
            r.split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    let core = name.map(ProcessCore::new).unwrap_or_default();
    core.with_why(why).with_roles(roles)
}

fn parse_step_line(number: usize, line: &str) -> Result<StepRecord, ProcessError> {
    let parts: Vec<&str> = line.split('|').map(str::trim).collect();
    if parts.len() < 3 || parts.len() > 5 {
        return Err(malformed_line(
            number,
            line,
            "expected name|kind|pool/lane[|duration[|tool]]",
        ));
    }

    let mut step = StepRecord::new(parts[0], parts[1], parts[2]);
    if let Some(duration) = parts.get(3).filter(|d| !d.is_empty()) {
        let minutes = duration
            .parse()
            .map_err(|_| malformed_line(number, line, "duration must be whole minutes"))?;
        step = step.with_duration(minutes);
    }
    if let Some(tool) = parts.get(4).filter(|t| !t.is_empty()) {
        step = step.with_tool(*tool);
    }
    Ok(step)
}

/// Returns the value of a `key: value` line when the key matches.
fn strip_key<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let (head, value) = line.split_once(':')?;
    head.trim()
        .eq_ignore_ascii_case(key)
        .then(|| value.trim())
}

/// Splits `key: value` when the key holds no `|`.
fn answer_pair(line: &str) -> Option<(&str, &str)> {
    line.split_once(':').filter(|(key, _)| !key.contains('|'))
}

fn malformed_line(number: usize, line: &str, reason: &str) -> ProcessError {
    ProcessError::MalformedRecord(format!("line {}: {} ('{}')", number, reason, line))
}

/// Writes a serialized document as JSON or YAML, by extension.
pub fn save_document(path: impl AsRef<Path>, document: &Value) -> Result<(), ProcessError> {
    let path = path.as_ref();
    let content = match Format::from_path(path) {
        Some(Format::Yaml) => serde_yaml::to_string(document)?,
        Some(Format::Json) => serde_json::to_string_pretty(document)?,
        _ => {
            return Err(ProcessError::MalformedRecord(format!(
                "Documents are saved as .json or .yaml, not '{}'",
                path.display()
            )))
        }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    info!("Saved document to {}", path.display());
    Ok(())
}

/// Reads a serialized document written by [`save_document`].
pub fn load_document(path: impl AsRef<Path>) -> Result<Value, ProcessError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    let document = match Format::from_path(path) {
        Some(Format::Yaml) => serde_yaml::from_str(&content)?,
        Some(Format::Json) => serde_json::from_str(&content)?,
        _ => {
            return Err(ProcessError::MalformedRecord(format!(
                "Documents are read from .json or .yaml, not '{}'",
                path.display()
            )))
        }
    };

    info!("Loaded document from {}", path.display());
    Ok(document)
}

/// File stem for generated artifacts: lowercase, spaces become `_`.
pub fn output_stem(name: &str) -> String {
    let stem = name.trim().to_lowercase().replace(' ', "_");
    if stem.is_empty() {
        "process".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::{tempdir, NamedTempFile};

    use super::*;
    use crate::process::{build_graph, ConnectionPolicy, DEFAULT_LANE};
    use crate::record::{from_document, to_document};

    const HR_TEXT: &str = "HR Onboarding|Streamline new hire process|HR,Recruiter,Manager
Purpose: Reduce time-to-hire by 30%
Job Req Received|start|HR/HR
Post Job Ad|task|HR/Recruiter
Screen Resumes?|decision|HR/Recruiter|30|Greenhouse
Conduct Interview|task|HR/Manager
Send Offer & Onboard|end|HR/HR
";

    fn temp_with_suffix(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_text_record() {
        let record = parse_text_record(HR_TEXT).unwrap();

        assert_eq!(record.core.name, "HR Onboarding");
        assert_eq!(record.core.why, "Streamline new hire process");
        assert_eq!(record.core.roles, vec!["HR", "Recruiter", "Manager"]);
        assert_eq!(record.steps.len(), 5);
        assert_eq!(record.steps[2].kind, "decision");
        assert_eq!(record.steps[2].duration_minutes, Some(30));
        assert_eq!(record.steps[2].tool.as_deref(), Some("Greenhouse"));
        assert_eq!(record.answers.get("purpose").unwrap(), "Reduce time-to-hire by 30%");
        assert!(record.connections.is_empty());
    }

    #[test]
    fn test_text_record_builds_linear_graph() {
        let record = parse_text_record(HR_TEXT).unwrap();
        let graph = build_graph(record, ConnectionPolicy::Abort, DEFAULT_LANE).unwrap();

        assert_eq!(graph.len(), 5);
        assert_eq!(graph.edges().len(), 4);
        assert_eq!(graph.lanes().lane_count(), 3);
    }

    #[test]
    fn test_connections_line_with_branches() {
        let content = "Flow|Test|\nA|start|P/L\nB|end|P/L\nconnections: S1->S2|S1->S2\n";
        let record = parse_text_record(content).unwrap();
        assert_eq!(record.connections, "S1->S2|S1->S2");
        assert_eq!(record.steps.len(), 2);
    }

    #[test]
    fn test_answer_value_may_contain_pipes() {
        let content = "Flow|Test\nA|start|L\nTools: Excel|Jira\nB|end|L\n";
        let record = parse_text_record(content).unwrap();

        assert_eq!(record.answers.get("tools").unwrap(), "Excel|Jira");
        assert_eq!(record.steps.len(), 2);
    }

    #[test]
    fn test_step_name_after_pipe_may_contain_colon() {
        let record = parse_text_record("Flow\nA|task|Ops: Night|15\n").unwrap();
        assert_eq!(record.steps[0].lane, "Ops: Night");
        assert!(record.answers.is_empty());
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let content = "# process\n\nFlow\n\n# steps\nA|start|L\n";
        let record = parse_text_record(content).unwrap();
        assert_eq!(record.core.name, "Flow");
        assert_eq!(record.core.why, "");
        assert_eq!(record.steps.len(), 1);
    }

    #[test]
    fn test_bad_line_reports_number() {
        let content = "Flow|Test\nA|start|L\nthis line is nonsense\n";
        let err = parse_text_record(content).unwrap_err();
        assert!(matches!(err, ProcessError::MalformedRecord(_)));
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_short_step_line_rejected() {
        let err = parse_text_record("Flow\nA|start\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_bad_duration_rejected() {
        let err = parse_text_record("Flow\nA|task|L|soon\n").unwrap_err();
        assert!(err.to_string().contains("duration"));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(parse_text_record("\n# nothing\n").is_err());
    }

    #[test]
    fn test_load_input_text_file() {
        let file = temp_with_suffix(".txt", HR_TEXT);
        let record = load_input(file.path()).unwrap();
        assert_eq!(record.steps.len(), 5);
    }

    #[test]
    fn test_load_input_yaml_file() {
        let yaml = "core:\n  name: Intake\n  roles: Desk, Lead\nsteps:\n  - name: Open\n    type: start\n    role: Desk\n  - name: Close\n    type: end\n    role: Desk\n";
        let file = temp_with_suffix(".yml", yaml);

        let record = load_input(file.path()).unwrap();
        assert_eq!(record.core.roles, vec!["Desk", "Lead"]);
        assert_eq!(record.steps[1].kind, "end");
    }

    #[test]
    fn test_load_input_json_file() {
        let json = r#"{"core": {"name": "Intake"}, "steps": [{"name": "Open", "kind": "start", "lane": "Desk", "duration": "5"}], "connections": ["S1->S2", "S2->S3"]}"#;
        let file = temp_with_suffix(".json", json);

        let record = load_input(file.path()).unwrap();
        assert_eq!(record.steps[0].duration_minutes, Some(5));
        assert_eq!(record.connections, "S1->S2,S2->S3");
    }

    #[test]
    fn test_load_input_unknown_extension() {
        let file = temp_with_suffix(".csv", "a,b");
        let result = load_input(file.path());
        assert!(matches!(result, Err(ProcessError::MalformedRecord(_))));
    }

    #[test]
    fn test_load_input_missing_file() {
        let dir = tempdir().unwrap();
        let result = load_input(dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(ProcessError::Io(_))));
    }

    #[test]
    fn test_document_survives_json_and_yaml_files() {
        let record = parse_text_record(HR_TEXT).unwrap();
        let graph = build_graph(record, ConnectionPolicy::Abort, DEFAULT_LANE).unwrap();
        let document = to_document(&graph, None).unwrap();
        let dir = tempdir().unwrap();

        for name in ["nested/hr.record.json", "hr.record.yaml"] {
            let path = dir.path().join(name);
            save_document(&path, &document).unwrap();
            let restored = from_document(&load_document(&path).unwrap()).unwrap();
            assert_eq!(restored, graph);
        }
    }

    #[test]
    fn test_save_document_rejects_text() {
        let dir = tempdir().unwrap();
        let result = save_document(dir.path().join("out.txt"), &Value::Null);
        assert!(result.is_err());
    }

    #[test]
    fn test_output_stem() {
        assert_eq!(output_stem("HR Onboarding"), "hr_onboarding");
        assert_eq!(output_stem("  Access  Request "), "access__request");
        assert_eq!(output_stem(""), "process");
    }
}
