//! JSON extraction for AI responses
//!
//! Models wrap their JSON in prose or markdown fences more often than not;
//! extraction finds the first balanced `[...]` and parses that.

use serde::Deserialize;

use crate::error::{Error, Result};

/// One mapping proposal from the semantic-match response
#[derive(Debug, Clone, Deserialize)]
pub struct AiMappingProposal {
    #[serde(default)]
    pub budget_category: String,
    #[serde(default)]
    pub budget_process: String,
    /// Possibly empty when the model found no fit
    #[serde(default)]
    pub eeff_concept: String,
    /// 0-100, trusted as reported
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Extract and parse the mapping array from a model response
pub fn parse_mapping_proposals(response: &str) -> Result<Vec<AiMappingProposal>> {
    let json_str = extract_json_array(response).ok_or_else(|| {
        Error::InvalidData(format!(
            "No JSON array found in AI response | Raw: {}",
            truncate(response, 200)
        ))
    })?;

    serde_json::from_str(json_str).map_err(|e| {
        Error::InvalidData(format!(
            "Invalid mapping JSON from AI: {} | Raw: {}",
            e,
            truncate(json_str, 200)
        ))
    })
}

/// Find the first balanced `[...]` in the response, tolerating surrounding
/// prose and ```json fences
fn extract_json_array(response: &str) -> Option<&str> {
    let start = response.find('[')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in response[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&response[start..=start + i]);
                }
            }
            _ => {}
        }
    }
    None
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() > max {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_array() {
        let response = r#"[{"budget_category": "Agroquimicos", "budget_process": "field", "eeff_concept": "AGROQUIMICOS & FOLIAR", "confidence": 92, "reason": "same expense family"}]"#;
        let proposals = parse_mapping_proposals(response).unwrap();
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].budget_category, "Agroquimicos");
        assert_eq!(proposals[0].confidence, 92.0);
        assert_eq!(proposals[0].reason.as_deref(), Some("same expense family"));
    }

    #[test]
    fn test_parse_with_markdown_fence() {
        let response = "Here are the mappings:\n```json\n[{\"budget_category\": \"Fletes\", \"budget_process\": \"packing\", \"eeff_concept\": \"TRANSPORTE DE CARGA\", \"confidence\": 88}]\n```\nDone!";
        let proposals = parse_mapping_proposals(response).unwrap();
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].eeff_concept, "TRANSPORTE DE CARGA");
    }

    #[test]
    fn test_parse_empty_concept_defaults() {
        let response = r#"[{"budget_category": "Imprevistos", "budget_process": "field", "eeff_concept": "", "confidence": 0}]"#;
        let proposals = parse_mapping_proposals(response).unwrap();
        assert!(proposals[0].eeff_concept.is_empty());
        assert!(proposals[0].reason.is_none());
    }

    #[test]
    fn test_nested_brackets_in_strings() {
        let response = r#"[{"budget_category": "Cajas [12x]", "budget_process": "packing", "eeff_concept": "MATERIALES DE EMPAQUE", "confidence": 80}]"#;
        let proposals = parse_mapping_proposals(response).unwrap();
        assert_eq!(proposals[0].budget_category, "Cajas [12x]");
    }

    #[test]
    fn test_no_array_is_error() {
        assert!(parse_mapping_proposals("I could not find any matches.").is_err());
        assert!(parse_mapping_proposals("{\"not\": \"an array\"}").is_err());
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(parse_mapping_proposals("[{\"budget_category\": }]").is_err());
    }
}
