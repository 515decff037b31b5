//! Parse extractor output into facts and quantized variables
//!
//! The extractor is a language model; its output is untrusted. Entries that
//! cannot be parsed are reported as issues, never patched up. Raw variable
//! scores are snapped onto the discrete grid.

use crate::GatekeeperError;
use habitus_domain::{
    DiscreteScore, EvidenceTier, Fact, FactId, FactValue, IssueCode, Provenance, UncertaintyTier,
    ValidationIssue, Variable, VariableId,
};
use serde_json::{Map, Value};
use tracing::warn;

/// Largest raw score accepted before quantization
const MAX_RAW_SCORE: f64 = 8.3;

/// Entries that parsed, plus an issue for every entry that did not
#[derive(Debug, Clone, PartialEq)]
pub struct Intake<T> {
    /// Successfully parsed entries
    pub accepted: Vec<T>,

    /// One issue per rejected entry (or field)
    pub issues: Vec<ValidationIssue>,
}

impl<T> Intake<T> {
    /// Whether every entry parsed
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// The parsed entries, or every issue if any entry failed
    pub fn into_result(self) -> Result<Vec<T>, Vec<ValidationIssue>> {
        if self.issues.is_empty() {
            Ok(self.accepted)
        } else {
            Err(self.issues)
        }
    }
}

/// Parse the extractor's fact array
///
/// Expected shape per entry:
/// `{"id": "frequency", "value": "daily", "uncertainty": "U0", "evidence": "E1", "provenance": "user_stated"}`
pub fn parse_fact_set(response: &str) -> Result<Intake<Fact>, GatekeeperError> {
    let entries = parse_array(response)?;
    let mut intake = Intake {
        accepted: Vec::new(),
        issues: Vec::new(),
    };

    if entries.len() > FactId::ALL.len() {
        intake.issues.push(ValidationIssue::new(
            "facts",
            format!("{} facts supplied, at most {} allowed", entries.len(), FactId::ALL.len()),
            IssueCode::TooManyEntries,
        ));
    }

    for (idx, entry) in entries.iter().enumerate() {
        match parse_fact(entry) {
            Ok(fact) => intake.accepted.push(fact),
            Err((field, message, code)) => {
                warn!("Fact {} rejected: {}", idx, message);
                intake
                    .issues
                    .push(ValidationIssue::new(format!("facts[{}]{}", idx, field), message, code));
            }
        }
    }

    Ok(intake)
}

/// Parse the extractor's raw variable judgments and quantize their scores
///
/// Expected shape per entry:
/// `{"id": "duration", "score": 5.2, "rationale": "...", "caused_by": ["duration_minutes"]}`
pub fn parse_variable_judgments(response: &str) -> Result<Intake<Variable>, GatekeeperError> {
    let entries = parse_array(response)?;
    let mut intake = Intake {
        accepted: Vec::new(),
        issues: Vec::new(),
    };

    for (idx, entry) in entries.iter().enumerate() {
        match parse_judgment(entry) {
            Ok(variable) => intake.accepted.push(variable),
            Err((field, message, code)) => {
                warn!("Variable judgment {} rejected: {}", idx, message);
                intake.issues.push(ValidationIssue::new(
                    format!("variables[{}]{}", idx, field),
                    message,
                    code,
                ));
            }
        }
    }

    Ok(intake)
}

type EntryError = (&'static str, String, IssueCode);

fn parse_array(response: &str) -> Result<Vec<Value>, GatekeeperError> {
    let json_str = extract_json(response)?;
    let json: Value = serde_json::from_str(&json_str)
        .map_err(|e| GatekeeperError::InvalidFormat(format!("JSON parse error: {}", e)))?;

    match json {
        Value::Array(entries) => Ok(entries),
        _ => Err(GatekeeperError::InvalidFormat("Expected JSON array".to_string())),
    }
}

/// Extract JSON from a response, handling markdown code fences
fn extract_json(response: &str) -> Result<String, GatekeeperError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(GatekeeperError::InvalidFormat("Empty code block".to_string()));
        }

        // Skip the opening fence and, if present, the closing one
        let end = if lines[lines.len() - 1].trim_start().starts_with("```") {
            lines.len() - 1
        } else {
            lines.len()
        };
        Ok(lines[1..end].join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}

fn as_object(entry: &Value) -> Result<&Map<String, Value>, EntryError> {
    entry
        .as_object()
        .ok_or(("", "entry is not a JSON object".to_string(), IssueCode::Malformed))
}

fn required_str<'a>(
    obj: &'a Map<String, Value>,
    key: &'static str,
    field: &'static str,
) -> Result<&'a str, EntryError> {
    obj.get(key)
        .and_then(|v| v.as_str())
        .ok_or((field, format!("missing or invalid '{}'", key), IssueCode::Malformed))
}

fn parse_fact(entry: &Value) -> Result<Fact, EntryError> {
    let obj = as_object(entry)?;

    let raw_id = required_str(obj, "id", ".id")?;
    let id = FactId::parse(raw_id)
        .ok_or((".id", format!("unknown fact id '{}'", raw_id), IssueCode::UnknownId))?;

    let value = match obj.get("value") {
        Some(Value::Bool(b)) => FactValue::Bool(*b),
        Some(Value::Number(n)) => FactValue::Number(n.as_f64().ok_or((
            ".value",
            format!("value of '{}' is not representable", raw_id),
            IssueCode::Malformed,
        ))?),
        Some(Value::String(s)) => FactValue::Text(s.clone()),
        _ => {
            return Err((
                ".value",
                format!("value of '{}' must be a string, number or bool", raw_id),
                IssueCode::Malformed,
            ))
        }
    };

    let uncertainty = match required_str(obj, "uncertainty", ".uncertainty")? {
        "U0" => UncertaintyTier::U0,
        "U1" => UncertaintyTier::U1,
        "U2" => UncertaintyTier::U2,
        "U3" => UncertaintyTier::U3,
        "U4" => UncertaintyTier::U4,
        other => {
            return Err((".uncertainty", format!("unknown uncertainty tier '{}'", other), IssueCode::Malformed))
        }
    };

    let evidence = match required_str(obj, "evidence", ".evidence")? {
        "E0" => EvidenceTier::E0,
        "E1" => EvidenceTier::E1,
        "E2" => EvidenceTier::E2,
        "E3" => EvidenceTier::E3,
        other => {
            return Err((".evidence", format!("unknown evidence tier '{}'", other), IssueCode::Malformed))
        }
    };

    let provenance = match required_str(obj, "provenance", ".provenance")? {
        "user_stated" => Provenance::UserStated,
        "inferred" => Provenance::Inferred,
        "default" => Provenance::Default,
        other => {
            return Err((".provenance", format!("unknown provenance '{}'", other), IssueCode::Malformed))
        }
    };

    Ok(Fact {
        id,
        value,
        uncertainty,
        evidence,
        provenance,
    })
}

fn parse_judgment(entry: &Value) -> Result<Variable, EntryError> {
    let obj = as_object(entry)?;

    let raw_id = required_str(obj, "id", ".id")?;
    let id = VariableId::parse(raw_id)
        .ok_or((".id", format!("unknown variable id '{}'", raw_id), IssueCode::UnknownId))?;

    let raw_score = obj
        .get("score")
        .and_then(|v| v.as_f64())
        .ok_or((".score", format!("missing or invalid 'score' for '{}'", raw_id), IssueCode::Malformed))?;
    if !raw_score.is_finite() || !(0.0..=MAX_RAW_SCORE + 1e-9).contains(&raw_score) {
        return Err((
            ".score",
            format!("raw score {} for '{}' is outside [0, {}]", raw_score, raw_id, MAX_RAW_SCORE),
            IssueCode::OutOfRange,
        ));
    }

    let rationale = obj
        .get("rationale")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let mut caused_by = Vec::new();
    if let Some(list) = obj.get("caused_by") {
        let list = list.as_array().ok_or((
            ".caused_by",
            format!("'caused_by' of '{}' must be an array", raw_id),
            IssueCode::Malformed,
        ))?;
        for item in list {
            let name = item.as_str().unwrap_or_default();
            let fact = FactId::parse(name).ok_or((
                ".caused_by",
                format!("'{}' cites unknown fact '{}'", raw_id, name),
                IssueCode::UnknownId,
            ))?;
            caused_by.push(fact);
        }
    }

    Ok(Variable::new(id, DiscreteScore::round(raw_score), rationale, caused_by))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_facts() {
        let response = r#"[
            {"id": "frequency", "value": "daily", "uncertainty": "U0", "evidence": "E1", "provenance": "user_stated"},
            {"id": "duration_minutes", "value": 45, "uncertainty": "U0", "evidence": "E0", "provenance": "user_stated"},
            {"id": "location", "value": "gym", "uncertainty": "U2", "evidence": "E2", "provenance": "inferred"}
        ]"#;

        let intake = parse_fact_set(response).unwrap();
        assert!(intake.is_clean());
        assert_eq!(intake.accepted.len(), 3);
        assert_eq!(intake.accepted[1].value, FactValue::Number(45.0));
        assert_eq!(intake.accepted[2].provenance, Provenance::Inferred);
    }

    #[test]
    fn test_parse_facts_reports_bad_entries() {
        let response = r#"[
            {"id": "mood", "value": "good", "uncertainty": "U0", "evidence": "E1", "provenance": "user_stated"},
            {"id": "location", "value": null, "uncertainty": "U0", "evidence": "E1", "provenance": "user_stated"},
            {"id": "time_of_day", "value": "morning", "uncertainty": "U9", "evidence": "E1", "provenance": "user_stated"},
            {"id": "tools_required", "value": false, "uncertainty": "U1", "evidence": "E1", "provenance": "inferred"}
        ]"#;

        let intake = parse_fact_set(response).unwrap();
        assert_eq!(intake.accepted.len(), 1);
        assert_eq!(intake.issues.len(), 3);
        assert_eq!(intake.issues[0].code, IssueCode::UnknownId);
        assert_eq!(intake.issues[0].field, "facts[0].id");
        assert_eq!(intake.issues[1].field, "facts[1].value");
        assert_eq!(intake.issues[2].field, "facts[2].uncertainty");
        assert!(intake.into_result().is_err());
    }

    #[test]
    fn test_parse_judgments_quantizes() {
        let response = r#"```json
[
    {"id": "duration", "score": 5.2, "rationale": "45 minute sessions", "caused_by": ["duration_minutes"]},
    {"id": "frequency", "score": 0.5, "rationale": "weekly"}
]
```"#;

        let intake = parse_variable_judgments(response).unwrap();
        assert!(intake.is_clean());
        assert_eq!(intake.accepted[0].score.value(), 5.5);
        assert_eq!(intake.accepted[0].caused_by, vec![FactId::DurationMinutes]);
        assert_eq!(intake.accepted[1].score.value(), 0.0);
        assert!(intake.accepted[1].caused_by.is_empty());
    }

    #[test]
    fn test_parse_judgments_rejects_out_of_range() {
        let response = r#"[
            {"id": "duration", "score": 9.5},
            {"id": "complexity", "score": -1},
            {"id": "focus_demand", "score": 4.1, "caused_by": ["weather"]}
        ]"#;

        let intake = parse_variable_judgments(response).unwrap();
        assert!(intake.accepted.is_empty());
        let codes: Vec<IssueCode> = intake.issues.iter().map(|i| i.code).collect();
        assert_eq!(codes, vec![IssueCode::OutOfRange, IssueCode::OutOfRange, IssueCode::UnknownId]);
    }

    #[test]
    fn test_too_many_facts() {
        let entry = r#"{"id": "location", "value": "x", "uncertainty": "U0", "evidence": "E1", "provenance": "user_stated"}"#;
        let response = format!("[{}]", vec![entry; 17].join(","));

        let intake = parse_fact_set(&response).unwrap();
        assert_eq!(intake.issues[0].code, IssueCode::TooManyEntries);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse_fact_set("not json"), Err(GatekeeperError::InvalidFormat(_))));
        assert!(matches!(
            parse_variable_judgments(r#"{"id": "duration"}"#),
            Err(GatekeeperError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_extract_json_from_fence_without_language() {
        let response = "```\n[1, 2]\n```";
        assert_eq!(extract_json(response).unwrap(), "[1, 2]");
    }
}
