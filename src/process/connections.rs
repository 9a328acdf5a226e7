//! Connection Parser
//!
//! Turns the compact connection mini-language into explicit edges.
//!
//! # Syntax
//!
//! ```text
//! S1->S2,S2->S3|S2->S4:rejected
//! ```
//!
//! Groups are separated by `,`, branch alternatives inside a group by `|`.
//! Each alternative is `<from>-><to>`, optionally followed by `:<label>`.
//! An empty spec means "connect the steps in order".

use std::collections::HashSet;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::{Edge, Step};
use crate::error::ProcessError;

const ARROW: &str = "->";

/// A single connection token that could not become an edge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("Connection '{token}' is missing the '->' separator")]
    MissingArrow { token: String },

    #[error("Connection '{token}' references unknown step '{id}'")]
    UnknownStep { token: String, id: String },

    #[error("Connection '{token}' connects step '{id}' to itself")]
    SelfLoop { token: String, id: String },
}

impl ConnectionError {
    /// The offending token, as written (trimmed).
    pub fn token(&self) -> &str {
        match self {
            Self::MissingArrow { token }
            | Self::UnknownStep { token, .. }
            | Self::SelfLoop { token, .. } => token,
        }
    }
}

/// What to do with malformed connection tokens.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionPolicy {
    /// Fail with every malformed token
    #[default]
    Abort,
    /// Log and skip malformed tokens, keep the rest
    Drop,
}

/// Result of scanning a spec: accepted edges and rejected tokens.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionScan {
    pub edges: Vec<Edge>,
    pub rejected: Vec<ConnectionError>,
}

/// Scans a connection spec against the known steps without applying any
/// policy.
///
/// Duplicate `(from, to)` pairs collapse to their first occurrence.
pub fn scan_connections(steps: &[Step], spec: &str) -> ConnectionScan {
    if spec.trim().is_empty() {
        let edges = linear_chain(steps);
        debug!("No connection spec, synthesized {} sequential edges", edges.len());
        return ConnectionScan {
            edges,
            rejected: Vec::new(),
        };
    }

    let known: HashSet<&str> = steps.iter().map(|s| s.id.as_str()).collect();
    let mut scan = ConnectionScan::default();

    for group in spec.split(',') {
        for alternative in group.split('|') {
            let token = alternative.trim();
            if token.is_empty() {
                continue;
            }

            match parse_token(token, &known) {
                Ok(edge) => {
                    if scan.edges.iter().any(|e| e.connects(&edge.from, &edge.to)) {
                        debug!("Ignoring repeated connection {} -> {}", edge.from, edge.to);
                    } else {
                        scan.edges.push(edge);
                    }
                }
                Err(errors) => scan.rejected.extend(errors),
            }
        }
    }

    scan
}

/// Parses a spec, failing with every malformed token.
pub fn parse_connections(steps: &[Step], spec: &str) -> Result<Vec<Edge>, ProcessError> {
    resolve_connections(steps, spec, ConnectionPolicy::Abort)
}

/// Parses a spec and applies `policy` to malformed tokens.
pub fn resolve_connections(
    steps: &[Step],
    spec: &str,
    policy: ConnectionPolicy,
) -> Result<Vec<Edge>, ProcessError> {
    let scan = scan_connections(steps, spec);

    if !scan.rejected.is_empty() {
        match policy {
            ConnectionPolicy::Abort => {
                return Err(ProcessError::MalformedConnectionSpec(scan.rejected));
            }
            ConnectionPolicy::Drop => {
                for error in &scan.rejected {
                    warn!("Dropping connection: {}", error);
                }
            }
        }
    }

    info!("Resolved {} connections", scan.edges.len());
    Ok(scan.edges)
}

/// Connects each step to the next one in order.
///
/// Neighbours sharing an id are not connected; the validator reports the
/// duplicate instead.
pub fn linear_chain(steps: &[Step]) -> Vec<Edge> {
    steps
        .windows(2)
        .filter(|pair| pair[0].id != pair[1].id)
        .map(|pair| Edge::new(pair[0].id.clone(), pair[1].id.clone()))
        .collect()
}

fn parse_token(token: &str, known: &HashSet<&str>) -> Result<Edge, Vec<ConnectionError>> {
    let Some((from, rest)) = token.split_once(ARROW) else {
        return Err(vec![ConnectionError::MissingArrow {
            token: token.to_string(),
        }]);
    };

    let (to, label) = match rest.split_once(':') {
        Some((to, label)) => (to, Some(label.trim()).filter(|l| !l.is_empty())),
        None => (rest, None),
    };
    let from = from.trim();
    let to = to.trim();

    let endpoints = if from == to { 1 } else { 2 };
    let errors: Vec<ConnectionError> = [from, to]
        .into_iter()
        .take(endpoints)
        .filter(|id| !known.contains(id))
        .map(|id| ConnectionError::UnknownStep {
            token: token.to_string(),
            id: id.to_string(),
        })
        .collect();
    if !errors.is_empty() {
        return Err(errors);
    }

    if from == to {
        return Err(vec![ConnectionError::SelfLoop {
            token: token.to_string(),
            id: from.to_string(),
        }]);
    }

    let edge = Edge::new(from, to);
    Ok(match label {
        Some(label) => edge.with_label(label),
        None => edge,
    })
}
