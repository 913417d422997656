//! Extraction result interpreter — turns the IRIS server's response into
//! identification fields and a completeness class.
//!
//! The server's payload shape is not guaranteed: keys may be missing, `null`,
//! empty, or the whole body may not be JSON at all. Interpretation is total
//! and never fails — a malformed payload simply yields all fields absent,
//! which classifies as `Insufficient`.

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════
// ExtractionFields
// ═══════════════════════════════════════════════════════════

/// The five identification fields read off an equipment nameplate.
///
/// Each is either a non-empty string or `None`; an empty string on the wire
/// is equivalent to absent and is normalised away at parse time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionFields {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub installation_date: Option<String>,
    pub equipment_name: Option<String>,
}

impl ExtractionFields {
    /// True when no field carries a value.
    pub fn is_empty(&self) -> bool {
        self.manufacturer.is_none()
            && self.model.is_none()
            && self.serial_number.is_none()
            && self.installation_date.is_none()
            && self.equipment_name.is_none()
    }
}

/// Completeness of an extraction result. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletenessClass {
    /// All five fields present.
    Complete,
    /// Identity triple (manufacturer, model, serial number) present but
    /// equipment name and/or installation date missing.
    Partial,
    /// Any of the identity triple missing — not enough to file the record.
    Insufficient,
}

/// Classify a field set per the identity-triple rule.
///
/// Manufacturer, model and serial number form the record's composite key;
/// without all three the capture cannot be filed and must be retaken.
pub fn classify(fields: &ExtractionFields) -> CompletenessClass {
    let identity = fields.manufacturer.is_some()
        && fields.model.is_some()
        && fields.serial_number.is_some();

    if !identity {
        CompletenessClass::Insufficient
    } else if fields.equipment_name.is_some() && fields.installation_date.is_some() {
        CompletenessClass::Complete
    } else {
        CompletenessClass::Partial
    }
}

// ═══════════════════════════════════════════════════════════
// Interpretation
// ═══════════════════════════════════════════════════════════

/// Interpret a raw response body into extraction fields.
///
/// Total: any body that is not a JSON object, or an object missing keys,
/// degrades to absent fields rather than an error.
pub fn interpret_response(body: &str) -> ExtractionFields {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "Extraction response is not valid JSON");
            return ExtractionFields::default();
        }
    };

    ExtractionFields {
        manufacturer: string_field(&value, "manufacturer"),
        model: string_field(&value, "model"),
        serial_number: string_field(&value, "serial_number"),
        installation_date: string_field(&value, "installation_date"),
        equipment_name: string_field(&value, "equipment_name"),
    }
}

/// Read one optional string key. `null`, empty/whitespace strings and
/// non-string values all normalise to `None`.
fn string_field(value: &serde_json::Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
