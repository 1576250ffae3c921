//! Structural validation of device profiles.
//!
//! This is a light structural check, not a full schema engine: it verifies
//! the fields every other tool relies on and catches the most common
//! contributor mistake (C-style register type names).

use std::fmt;

use serde::Serialize;
use serde_yaml::Value;

use crate::document::{Profile, SignatureField};

/// Register data types accepted by the registry.
pub const REGISTER_TYPES: &[&str] = &[
    "int8", "uint8", "int16", "uint16", "int32", "uint32", "int64", "uint64", "float32",
    "float64", "string",
];

/// Common aliases and the registry type they most likely mean.
const TYPE_ALIASES: &[(&str, &str)] = &[
    ("short", "int16"),
    ("ushort", "uint16"),
    ("int", "int32"),
    ("uint", "uint32"),
    ("long", "int64"),
    ("long64", "int64"),
    ("ulong", "uint64"),
    ("ulong64", "uint64"),
    ("float", "float32"),
    ("double", "float64"),
    ("byte", "int8"),
    ("char", "uint8"),
];

/// Suggest the registry type for a common alias.
pub fn suggest_type(alias: &str) -> Option<&'static str> {
    TYPE_ALIASES
        .iter()
        .find(|(from, _)| *from == alias)
        .map(|(_, to)| *to)
}

/// How serious a validation finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The profile must not be published.
    Error,
    /// The profile is usable but should be fixed.
    Warning,
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Severity of the finding.
    pub severity: Severity,
    /// Dotted path to the offending field, e.g. `registers.0.type`.
    pub path: String,
    /// What is wrong.
    pub message: String,
    /// A likely fix, if one is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{suggestion}'?)")?;
        }
        Ok(())
    }
}

/// Validate a profile, returning every finding.
pub fn validate(profile: &Profile) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let Some(device) = profile.device() else {
        issues.push(error("device", "missing `device` section"));
        return issues;
    };

    for field in ["id", "manufacturer", "model"] {
        let present = device
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty());
        if !present {
            issues.push(error(
                &format!("device.{field}"),
                "required string field is missing or empty",
            ));
        }
    }

    if let SignatureField::Malformed(reason) = profile.signature() {
        issues.push(error("device.signature", &reason));
    }

    check_maintainers(device.get("maintainers"), &mut issues);
    check_registers(profile.as_value().get("registers"), &mut issues);

    issues
}

/// Returns `true` if none of `issues` is an error.
pub fn passes(issues: &[ValidationIssue]) -> bool {
    !issues.iter().any(|i| i.severity == Severity::Error)
}

fn check_maintainers(maintainers: Option<&Value>, issues: &mut Vec<ValidationIssue>) {
    let Some(maintainers) = maintainers else {
        return;
    };
    let Some(list) = maintainers.as_sequence() else {
        issues.push(error("device.maintainers", "must be a list"));
        return;
    };

    for (idx, entry) in list.iter().enumerate() {
        let path = format!("device.maintainers.{idx}");
        if !entry.is_mapping() {
            issues.push(error(&path, "maintainer entry must be a mapping"));
            continue;
        }
        if entry.get("github").and_then(Value::as_str).is_none() {
            issues.push(warning(
                &format!("{path}.github"),
                "maintainer has no github username",
            ));
        }
    }
}

fn check_registers(registers: Option<&Value>, issues: &mut Vec<ValidationIssue>) {
    let entries: Vec<(String, &Value)> = match registers {
        None => return,
        Some(Value::Mapping(map)) => map.iter().map(|(k, v)| (key_label(k), v)).collect(),
        Some(Value::Sequence(seq)) => seq
            .iter()
            .enumerate()
            .map(|(idx, v)| (idx.to_string(), v))
            .collect(),
        Some(_) => {
            issues.push(error("registers", "must be a mapping or a list"));
            return;
        }
    };

    for (label, register) in entries {
        let path = format!("registers.{label}.type");
        match register.get("type").and_then(Value::as_str) {
            None => issues.push(error(&path, "register has no type")),
            Some(ty) if REGISTER_TYPES.contains(&ty) => {}
            Some(ty) => issues.push(ValidationIssue {
                severity: Severity::Error,
                path,
                message: format!("'{ty}' is not one of {REGISTER_TYPES:?}"),
                suggestion: suggest_type(ty).map(str::to_owned),
            }),
        }
    }
}

fn key_label(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => serde_yaml::to_string(other)
            .unwrap_or_default()
            .trim()
            .to_owned(),
    }
}

fn error(path: &str, message: &str) -> ValidationIssue {
    ValidationIssue {
        severity: Severity::Error,
        path: path.to_owned(),
        message: message.to_owned(),
        suggestion: None,
    }
}

fn warning(path: &str, message: &str) -> ValidationIssue {
    ValidationIssue {
        severity: Severity::Warning,
        ..error(path, message)
    }
}
