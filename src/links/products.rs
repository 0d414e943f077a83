//! Builds the product list returned next to the rewritten answer.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::fields::{decode_unicode_escapes, has_unicode_escapes, parse_records, Record};
use super::site::ProductSite;
use super::verifier::VerificationMap;
use crate::retrieval::RetrievedDocument;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductEntry {
    pub id: String,
    pub description: String,
    pub category: String,
    pub specifications: Vec<Record>,
    #[serde(rename = "product_data")]
    pub extra_data: Vec<Record>,
    #[serde(rename = "link")]
    pub resource_link: String,
    #[serde(rename = "ean", default)]
    pub secondary_identifier: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductList {
    pub products: Vec<ProductEntry>,
    /// Documents considered, including the ones that were filtered out.
    pub source_count: usize,
}

impl ProductList {
    /// Whether `identifier` backs one of the listed products.
    pub fn lists(&self, identifier: &str) -> bool {
        self.products.iter().any(|product| product.id == identifier)
    }
}

/// Keeps verified documents in source order, first occurrence per identifier.
pub fn build_product_list(
    documents: &[RetrievedDocument],
    verification: &VerificationMap,
    site: &ProductSite,
) -> ProductList {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut products = Vec::new();

    for doc in documents {
        let id = doc.identifier.as_str();
        if id.is_empty() || seen.contains(id) || !verification.is_verified(id) {
            continue;
        }
        seen.insert(id);
        products.push(product_entry(doc, site));
    }

    tracing::debug!(
        kept = products.len(),
        considered = documents.len(),
        "Built product list"
    );

    ProductList {
        products,
        source_count: documents.len(),
    }
}

fn product_entry(doc: &RetrievedDocument, site: &ProductSite) -> ProductEntry {
    ProductEntry {
        id: doc.identifier.clone(),
        description: decode_description(&doc.identifier, &doc.description),
        category: doc.category.clone(),
        specifications: records_or_empty(&doc.identifier, "specifications", doc.specifications.as_deref()),
        extra_data: records_or_empty(&doc.identifier, "product_data", doc.extra_data.as_deref()),
        resource_link: site.product_url(&doc.identifier),
        secondary_identifier: doc.secondary_identifier.clone().unwrap_or_default(),
    }
}

fn decode_description(identifier: &str, description: &str) -> String {
    if !has_unicode_escapes(description) {
        return description.to_string();
    }
    decode_unicode_escapes(description).unwrap_or_else(|err| {
        tracing::debug!(identifier, error = %err, "Keeping raw description");
        description.to_string()
    })
}

fn records_or_empty(identifier: &str, field: &str, raw: Option<&str>) -> Vec<Record> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    parse_records(raw).unwrap_or_else(|err| {
        tracing::debug!(identifier, field, error = %err, "Dropping malformed field");
        Vec::new()
    })
}
