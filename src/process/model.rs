//! Process Data Model
//!
//! Typed records for process steps and flow edges, plus the lenient input
//! record a collaborator fills in before the core runs.
//!
//! # Example YAML Format
//!
//! ```yaml
//! core:
//!   name: HR Onboarding
//!   why: Streamline new hire process
//!   roles: HR, Recruiter, Manager
//! steps:
//!   - name: Job Req Received
//!     kind: start
//!     lane: HR/HR
//!   - name: Screen Resumes?
//!     kind: decision
//!     lane: HR/Recruiter
//!     duration: 30
//!   - name: Send Offer
//!     kind: end
//!     lane: HR/HR
//!     tool: Workday
//! connections: S1->S2,S2->S3
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The role a step plays in the flow.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Start,
    End,
    #[default]
    Task,
    Decision,
    Subprocess,
}

impl StepKind {
    /// Parses a kind token, case-insensitively. Returns `None` for anything
    /// outside the known set.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "start" => Some(Self::Start),
            "end" => Some(Self::End),
            "task" => Some(Self::Task),
            "decision" => Some(Self::Decision),
            "subprocess" => Some(Self::Subprocess),
            _ => None,
        }
    }

    /// Parses a kind token, falling back to [`StepKind::Task`].
    pub fn normalize(token: &str) -> Self {
        Self::from_token(token).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Task => "task",
            Self::Decision => "decision",
            Self::Subprocess => "subprocess",
        }
    }

    /// Start and end events.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Start | Self::End)
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single node in the process flow.
///
/// Steps are built by the ingestion pass with their pool and lane already
/// resolved; the serialized form requires every identity field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Unique identifier within the process
    pub id: String,

    /// Display text
    pub name: String,

    pub kind: StepKind,

    /// Owning pool name
    pub pool: String,

    /// Owning lane name within the pool
    pub lane: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,

    /// Tool or system used to perform the step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
}

impl Step {
    /// Creates a new Step with the given parameters.
    ///
    /// # Example
    ///
    /// ```
    /// use procmap::process::{Step, StepKind};
    ///
    /// let step = Step::new("S2", "Review CV", StepKind::Task)
    ///     .in_lane("HR", "Recruiter")
    ///     .with_duration(30)
    ///     .with_tool("Greenhouse");
    ///
    /// assert_eq!(step.label(), "Review CV\n30 min\nGreenhouse");
    /// ```
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: StepKind) -> Self {
        Self {
            id: id.into().trim().to_string(),
            name: name.into().trim().to_string(),
            kind,
            pool: String::new(),
            lane: String::new(),
            duration_minutes: None,
            tool: None,
        }
    }

    /// Places the step in a pool and lane.
    pub fn in_lane(mut self, pool: impl Into<String>, lane: impl Into<String>) -> Self {
        self.pool = pool.into();
        self.lane = lane.into();
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }

    /// Display label: the name, then duration and tool lines when present.
    pub fn label(&self) -> String {
        let mut lines = vec![self.name.clone()];
        if let Some(minutes) = self.duration_minutes {
            lines.push(format!("{} min", minutes));
        }
        if let Some(tool) = &self.tool {
            lines.push(tool.clone());
        }
        lines.join("\n")
    }
}

/// A directed flow relation between two steps.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Returns true when both endpoints match, ignoring the label.
    pub fn connects(&self, from: &str, to: &str) -> bool {
        self.from == from && self.to == to
    }
}

/// Core questionnaire answers describing the process as a whole.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProcessCore {
    /// Process name; also the default pool name
    pub name: String,

    /// Purpose of the process
    #[serde(default)]
    pub why: String,

    /// Roles involved, in the order given
    #[serde(default, deserialize_with = "comma_or_vec")]
    pub roles: Vec<String>,
}

impl ProcessCore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            why: String::new(),
            roles: Vec::new(),
        }
    }

    pub fn with_why(mut self, why: impl Into<String>) -> Self {
        self.why = why.into();
        self
    }

    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }
}

impl Default for ProcessCore {
    fn default() -> Self {
        Self::new("Business Process")
    }
}

/// One step as supplied by a collaborator, before ids, kinds and lanes are
/// resolved.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    /// Explicit id; assigned as `S<n>` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    /// Raw kind token; unknown values become `task`
    #[serde(default, alias = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<String>,

    /// Lane token: `lane` or `pool/lane`
    #[serde(default, alias = "role")]
    pub lane: String,

    #[serde(
        default,
        alias = "duration",
        deserialize_with = "lenient_minutes",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_minutes: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
}

impl StepRecord {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, lane: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            kind: kind.into(),
            pool: None,
            lane: lane.into(),
            duration_minutes: None,
            tool: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_pool(mut self, pool: impl Into<String>) -> Self {
        self.pool = Some(pool.into());
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }
}

/// A fully populated process description handed to the core.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessRecord {
    pub core: ProcessCore,

    #[serde(default)]
    pub steps: Vec<StepRecord>,

    /// Connection mini-language; empty means a linear chain
    #[serde(default, deserialize_with = "spec_or_list")]
    pub connections: String,

    /// Free-form questionnaire answers carried along untouched
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub answers: BTreeMap<String, String>,
}

impl ProcessRecord {
    pub fn new(core: ProcessCore) -> Self {
        Self {
            core,
            ..Self::default()
        }
    }

    pub fn with_step(mut self, step: StepRecord) -> Self {
        self.steps.push(step);
        self
    }

    pub fn with_connections(mut self, spec: impl Into<String>) -> Self {
        self.connections = spec.into();
        self
    }

    pub fn with_answer(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.answers.insert(key.into(), value.into());
        self
    }
}

/// Deserializes either a comma-separated string or an array of strings.
fn comma_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let val = Value::deserialize(deserializer)?;
    match val {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => Ok(s
            .split(',')
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .map(String::from)
            .collect()),
        Value::Array(arr) => arr
            .into_iter()
            .map(|v| match v {
                Value::String(s) => Ok(s.trim().to_string()),
                _ => Err(de::Error::custom("Expected string in array")),
            })
            .collect(),
        _ => Err(de::Error::custom("Expected string or array of strings")),
    }
}

/// Deserializes a connection spec given as one string or a list of tokens.
fn spec_or_list<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let val = Value::deserialize(deserializer)?;
    match val {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Array(arr) => {
            let tokens = arr
                .into_iter()
                .map(|v| match v {
                    Value::String(s) => Ok(s),
                    _ => Err(de::Error::custom("Expected string in connection list")),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(tokens.join(","))
        }
        _ => Err(de::Error::custom("Expected connection string or list of strings")),
    }
}

/// Deserializes a duration given as a number or a numeric string.
fn lenient_minutes<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let val = Value::deserialize(deserializer)?;
    match val {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .and_then(|m| u32::try_from(m).ok())
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("Invalid duration: {}", n))),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("Invalid duration: '{}'", s))),
        _ => Err(de::Error::custom("Expected duration in minutes")),
    }
}
