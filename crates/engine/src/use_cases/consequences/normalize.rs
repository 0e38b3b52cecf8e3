//! Boundary parsing of generator output.
//!
//! Generated text is untrusted. Consequence payloads are parsed into a
//! [`ConsequenceSet`] or rejected with a [`NormalizeError`]; dialogue is
//! stripped down to one clean spoken paragraph. Callers treat every error
//! as "use the fallback".

use std::sync::LazyLock;

use regex_lite::Regex;
use serde_json::{Map, Value};

use solterra_domain::{
    Consequence, ConsequenceKind, ConsequenceSet, DelayedConsequence, PLACEHOLDER_NARRATIVE,
};

/// Shortest acceptable dialogue line, in characters.
pub const MIN_DIALOGUE_CHARS: usize = 5;
/// Longest acceptable dialogue line, in characters.
pub const MAX_DIALOGUE_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("Malformed generator output: {0}")]
    MalformedGeneratorOutput(String),
    #[error("Generator output has no immediate consequence list")]
    MissingImmediateField,
    #[error("Dialogue length {0} outside the accepted window")]
    DialogueLength(usize),
}

static FENCED_PAYLOAD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[a-zA-Z]*\s*(.*?)\s*```").expect("valid regex"));
static FENCED_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("valid regex"));
static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid regex"));
static ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.*?)\*").expect("valid regex"));
static STAGE_DIRECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]|\(.*?\)").expect("valid regex"));

/// Parse a consequence payload.
///
/// Repairs: a missing or non-list `delayed` becomes empty, a missing or
/// non-string `narrative` becomes the placeholder sentence, and individual
/// entries that cannot be read are dropped. A missing `immediate` list is
/// not repaired.
pub fn normalize(raw: &str) -> Result<ConsequenceSet, NormalizeError> {
    let unfenced = match FENCED_PAYLOAD_RE.captures(raw) {
        Some(caps) => caps[1].to_string(),
        None => raw.trim().to_string(),
    };

    let candidate = first_object(&unfenced).ok_or_else(|| {
        NormalizeError::MalformedGeneratorOutput("no JSON object found".to_string())
    })?;

    let parsed: Value = serde_json::from_str(candidate)
        .map_err(|e| NormalizeError::MalformedGeneratorOutput(e.to_string()))?;
    let Value::Object(payload) = parsed else {
        return Err(NormalizeError::MalformedGeneratorOutput(
            "payload is not an object".to_string(),
        ));
    };

    let Some(Value::Array(raw_immediate)) = payload.get("immediate") else {
        return Err(NormalizeError::MissingImmediateField);
    };

    let immediate: Vec<Consequence> = raw_immediate.iter().filter_map(parse_consequence).collect();
    if immediate.len() < raw_immediate.len() {
        tracing::warn!(
            dropped = raw_immediate.len() - immediate.len(),
            "Dropped unreadable immediate consequences"
        );
    }

    let delayed = match payload.get("delayed") {
        Some(Value::Array(entries)) => entries.iter().filter_map(parse_delayed).collect(),
        _ => {
            tracing::debug!("Generated payload has no delayed list, using empty");
            Vec::new()
        }
    };

    let narrative = match payload.get("narrative") {
        Some(Value::String(text)) if !text.trim().is_empty() => text.clone(),
        _ => PLACEHOLDER_NARRATIVE.to_string(),
    };

    tracing::debug!(
        immediate = immediate.len(),
        delayed = delayed.len(),
        "Normalized generated consequences"
    );

    Ok(ConsequenceSet::new(immediate, delayed, narrative))
}

/// Clean a generated dialogue line.
pub fn normalize_dialogue(raw: &str) -> Result<String, NormalizeError> {
    let text = FENCED_BLOCK_RE.replace_all(raw.trim(), "");
    let text = BOLD_RE.replace_all(&text, "$1");
    let text = ITALIC_RE.replace_all(&text, "$1");
    let text = STAGE_DIRECTION_RE.replace_all(&text, "");

    let first_paragraph = text
        .trim()
        .split("\n\n")
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string();

    let length = first_paragraph.chars().count();
    if !(MIN_DIALOGUE_CHARS..=MAX_DIALOGUE_CHARS).contains(&length) {
        return Err(NormalizeError::DialogueLength(length));
    }
    Ok(first_paragraph)
}

/// The first balanced `{...}` region, ignoring braces inside strings.
fn first_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_consequence(entry: &Value) -> Option<Consequence> {
    let fields = entry.as_object()?;
    let kind: ConsequenceKind = fields
        .get("type")
        .and_then(|t| serde_json::from_value(t.clone()).ok())?;
    let target = text_field(fields, "target")?;
    Some(Consequence::new(
        kind,
        target,
        int_field(fields, "value"),
        text_field(fields, "description").unwrap_or_default(),
    ))
}

fn parse_delayed(entry: &Value) -> Option<DelayedConsequence> {
    let mut fields = entry.as_object()?.clone();
    if let Some(delay) = fields.get("delay_secs") {
        let secs = delay
            .as_u64()
            .or_else(|| delay.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .unwrap_or(0);
        fields.insert("delay_secs".to_string(), Value::from(secs));
    }
    match serde_json::from_value(Value::Object(fields)) {
        Ok(delayed) => Some(delayed),
        Err(e) => {
            tracing::warn!(error = %e, "Dropped unreadable delayed consequence");
            None
        }
    }
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Integers as given, floats rounded, numeric strings parsed, else 0.
fn int_field(fields: &Map<String, Value>, key: &str) -> i32 {
    let value = match fields.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().map(|f| f.round() as i64),
        _ => None,
    };
    value
        .map(|v| v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
        .unwrap_or(0)
}
