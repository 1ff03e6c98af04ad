//! Extracted job data - the record handed from detection to capture/storage.

use serde::{Deserialize, Serialize};

/// Best-effort job posting data.
///
/// Every field is optional: a missing field means "unknown", which is
/// different from an employer leaving it blank. Extractors never store empty
/// strings or empty lists; they leave the field out instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responsibilities: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub benefits: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_deadline: Option<String>,
}

impl JobData {
    /// True when no field carries a value
    pub fn is_empty(&self) -> bool {
        *self == JobData::default()
    }

    /// Title, present and non-blank
    pub fn has_title(&self) -> bool {
        has_text(&self.job_title)
    }

    /// Company, present and non-blank
    pub fn has_company(&self) -> bool {
        has_text(&self.company)
    }

    /// Location, present and non-blank
    pub fn has_location(&self) -> bool {
        has_text(&self.location)
    }
}

fn has_text(field: &Option<String>) -> bool {
    field.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
}

/// A single extracted value together with how much the extractor trusts it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedField<T> {
    pub value: T,
    /// Trust in this particular value (0.0 - 1.0)
    pub confidence: f64,
}

impl<T> ExtractedField<T> {
    pub fn new(value: T, confidence: f64) -> Self {
        Self {
            value,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fields_are_omitted_from_json() {
        let job = JobData {
            job_title: Some("Backend Engineer".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json, serde_json::json!({ "jobTitle": "Backend Engineer" }));
    }

    #[test]
    fn test_blank_title_does_not_count() {
        let job = JobData {
            job_title: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(!job.has_title());
        assert!(!job.is_empty());
        assert!(JobData::default().is_empty());
    }

    #[test]
    fn test_extracted_field_clamps_confidence() {
        let field = ExtractedField::new("Acme", 1.4);
        assert_eq!(field.confidence, 1.0);
    }
}
