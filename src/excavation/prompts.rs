//! System instruction, prompt construction, and response parsing for the
//! talent analysis call.

use serde_json::json;
use tracing::warn;

use crate::error::AnalysisError;

use super::model::TalentResult;

/// Name attached to the requested response schema.
pub const SCHEMA_NAME: &str = "talent_result";

/// Persona and output-shape instruction sent as the system message.
pub const SYSTEM_INSTRUCTION: &str = "\
You are a talent archaeologist who blends the souls of Dan Koe, Naval Ravikant and Steve Jobs.
Task: analyze the user's 7 answers and excavate their \"atomic talents\" and \"specific knowledge\".

You must output the result as JSON with exactly this structure:
{
  \"manifesto\": \"a minimal, forceful, Jobs-style product manifesto\",
  \"atomicAbilities\": [{\"name\": \"ability name\", \"description\": \"its essence\"}],
  \"specificKnowledge\": \"definition of the user's specific knowledge\",
  \"futureCareers\": [{\"title\": \"career\", \"description\": \"description\", \"leverage\": \"point of leverage\"}],
  \"roadmap\": [\"step 1\", \"step 2\", \"step 3\"]
}
atomicAbilities, futureCareers and roadmap each contain exactly 3 entries. Every field is required and non-empty.

Style: fresh, sharp, inspiring. Do not include any text outside the JSON.";

/// Build the user message: every answer labelled with its 1-based position.
pub fn build_excavation_prompt(answers: &[String]) -> String {
    let fragments = answers
        .iter()
        .enumerate()
        .map(|(i, answer)| format!("Fragment {}: {}", i + 1, answer.trim()))
        .collect::<Vec<_>>()
        .join("\n");

    format!("Here are the user's excavated fragments. Dig deep:\n{fragments}")
}

/// JSON schema equivalent to `TalentResult`, every field required.
pub fn talent_result_schema() -> serde_json::Value {
    let text = json!({ "type": "string" });
    json!({
        "type": "object",
        "properties": {
            "manifesto": text,
            "atomicAbilities": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": { "name": text, "description": text },
                    "required": ["name", "description"],
                    "additionalProperties": false
                }
            },
            "specificKnowledge": text,
            "futureCareers": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": { "title": text, "description": text, "leverage": text },
                    "required": ["title", "description", "leverage"],
                    "additionalProperties": false
                }
            },
            "roadmap": { "type": "array", "items": text }
        },
        "required": ["manifesto", "atomicAbilities", "specificKnowledge", "futureCareers", "roadmap"],
        "additionalProperties": false
    })
}

/// Parse raw model output into a validated `TalentResult`.
pub fn parse_talent_response(raw: &str) -> Result<TalentResult, AnalysisError> {
    let json_str = extract_json_object(raw);

    let parsed: TalentResult = serde_json::from_str(json_str).map_err(|e| {
        warn!(error = %e, "Analysis response did not match the talent schema");
        AnalysisError::MalformedResponse(e.to_string())
    })?;

    parsed.normalize().map_err(AnalysisError::MalformedResponse)
}

/// Extract a JSON object from output that may be fenced or wrapped in prose.
fn extract_json_object(text: &str) -> &str {
    let trimmed = text.trim();

    if trimmed.starts_with('{') {
        return trimmed;
    }

    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        if let Some(end) = after.find("```") {
            let inner = after[..end].trim();
            if inner.starts_with('{') {
                return inner;
            }
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if end > start {
            return &trimmed[start..=end];
        }
    }

    trimmed
}
