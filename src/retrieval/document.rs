use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A product record returned by the vector index.
///
/// Structured fields are kept in their serialized form; parsing them is the
/// product list builder's concern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    /// Sanitized item number; empty when the record carries none.
    pub identifier: String,
    pub description: String,
    pub category: String,
    pub specifications: Option<String>,
    pub extra_data: Option<String>,
    /// EAN or similar secondary code.
    pub secondary_identifier: Option<String>,
    /// The text that was embedded for this record.
    pub content: String,
}

impl RetrievedDocument {
    pub fn from_metadata(content: impl Into<String>, metadata: &Map<String, Value>) -> Self {
        Self {
            identifier: metadata_string(metadata, "item_number").unwrap_or_default(),
            description: metadata_string(metadata, "description").unwrap_or_default(),
            category: metadata_string(metadata, "category").unwrap_or_default(),
            specifications: metadata_string(metadata, "specifications"),
            extra_data: metadata_string(metadata, "product_data"),
            secondary_identifier: metadata_string(metadata, "ean").filter(|v| !v.is_empty()),
            content: content.into(),
        }
    }
}

fn metadata_string(metadata: &Map<String, Value>, key: &str) -> Option<String> {
    match metadata.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_index_metadata_keys() {
        let metadata = json!({
            "item_number": "W381195-2125412",
            "description": "UM SP HW Portable Saw Blade",
            "category": "Saw Blades/Wood",
            "specifications": "[{\"Type\":\"Diameter\",\"Data\":\"254\"}]",
            "product_data": "[]",
            "ean": ""
        });
        let doc = RetrievedDocument::from_metadata("rich text", metadata.as_object().unwrap());

        assert_eq!(doc.identifier, "W381195-2125412");
        assert_eq!(doc.category, "Saw Blades/Wood");
        assert_eq!(doc.extra_data.as_deref(), Some("[]"));
        assert_eq!(doc.secondary_identifier, None);
        assert_eq!(doc.content, "rich text");
    }

    #[test]
    fn tolerates_missing_and_numeric_metadata() {
        let metadata = json!({ "item_number": 12345, "ean": 5701234567890u64 });
        let doc = RetrievedDocument::from_metadata("", metadata.as_object().unwrap());

        assert_eq!(doc.identifier, "12345");
        assert_eq!(doc.description, "");
        assert_eq!(doc.specifications, None);
        assert_eq!(doc.secondary_identifier.as_deref(), Some("5701234567890"));
    }
}
