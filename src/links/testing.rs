//! Shared fakes for link pipeline tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::probe::{PageProbe, ProbeError};
use super::site::ProductSite;
use super::verifier::LinkVerifier;
use crate::retrieval::RetrievedDocument;

/// Answers every probe for an identifier with a fixed outcome; unknown
/// identifiers get a 404.
#[derive(Default)]
pub struct StaticProbe {
    outcomes: HashMap<String, Result<u16, ProbeError>>,
    calls: AtomicUsize,
    probed: Mutex<Vec<String>>,
}

impl StaticProbe {
    pub fn with_status(mut self, identifier: &str, status: u16) -> Self {
        self.outcomes.insert(identifier.to_string(), Ok(status));
        self
    }

    pub fn with_error(mut self, identifier: &str, error: ProbeError) -> Self {
        self.outcomes.insert(identifier.to_string(), Err(error));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Identifiers probed so far, one entry per request.
    pub fn probed(&self) -> Vec<String> {
        self.probed.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn answer(&self, url: &str) -> Result<u16, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let identifier = url.rsplit('/').next().unwrap_or_default().to_string();
        if let Ok(mut probed) = self.probed.lock() {
            probed.push(identifier.clone());
        }
        self.outcomes.get(&identifier).cloned().unwrap_or(Ok(404))
    }
}

#[async_trait]
impl PageProbe for StaticProbe {
    async fn head(&self, url: &str) -> Result<u16, ProbeError> {
        self.answer(url)
    }

    async fn get(&self, url: &str) -> Result<u16, ProbeError> {
        self.answer(url)
    }
}

pub fn site() -> ProductSite {
    ProductSite::new("host", "locale")
}

pub fn verifier(probe: Arc<StaticProbe>) -> LinkVerifier {
    LinkVerifier::new(probe, 4, Duration::from_secs(5))
}

pub fn document(identifier: &str) -> RetrievedDocument {
    RetrievedDocument {
        identifier: identifier.to_string(),
        description: format!("Product {identifier}"),
        category: "Saw Blades/Metal".to_string(),
        specifications: Some(r#"[{"Type":"Diameter","Data":"160 mm"}]"#.to_string()),
        extra_data: Some("[]".to_string()),
        secondary_identifier: None,
        content: format!("Item Number: {identifier}"),
    }
}
