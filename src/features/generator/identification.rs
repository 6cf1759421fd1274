//! Plant identification prompt and best-effort response parsing

use log::warn;
use serde_json::Value;

use crate::core::strip_json_fence;
use crate::features::sessions::{clamp_confidence, PlantIdentification};

/// Caption stored with an uploaded image
pub const UPLOAD_CAPTION: &str = "Analyze this plant:";

pub const IDENTIFICATION_PROMPT: &str = concat!(
    "Identify the plant in this image. Respond ONLY with a single JSON object in the following format ",
    "(do not include ```json or ```): ",
    r###"{"plantName": "Identified Plant Name", "confidence": 85, "careInstructions": "## Watering\nWater thoroughly..."}. "###,
    "The 'plantName' should be the common name. 'confidence' must be a number representing your confidence ",
    "score as a percentage (0-100). 'careInstructions' must be a string containing detailed care instructions ",
    "formatted with markdown."
);

/// Parse a model reply into an identification record
///
/// Returns `None` when the reply is not a JSON object carrying a non-empty
/// `plantName`, a numeric `confidence` and non-empty `careInstructions`;
/// callers then keep the raw text as a plain message.
pub fn parse_identification(response: &str) -> Option<PlantIdentification> {
    let cleaned = strip_json_fence(response);
    let value: Value = match serde_json::from_str(&cleaned) {
        Ok(value) => value,
        Err(e) => {
            warn!("Could not parse plant identification JSON, falling back to text: {e}");
            return None;
        }
    };

    let plant_name = value.get("plantName").and_then(Value::as_str).map(str::trim);
    let confidence = value.get("confidence").and_then(Value::as_f64);
    let care = value.get("careInstructions").and_then(Value::as_str);

    match (plant_name, confidence, care) {
        (Some(name), Some(confidence), Some(care)) if !name.is_empty() && !care.trim().is_empty() => {
            Some(PlantIdentification {
                plant_name: name.to_string(),
                confidence: clamp_confidence(confidence),
                care_instructions: care.to_string(),
                user_feedback: None,
                corrected_name: None,
            })
        }
        _ => {
            warn!("Identification JSON did not match the expected shape, falling back to text");
            None
        }
    }
}
