use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::assistant::{ProductAssistant, RetrievalChain};
use crate::core::config::{parse_config, AppConfig, AppPaths, ConfigService};
use crate::links::{LinkVerifier, ProductSite};

pub mod error;

use error::InitializationError;

/// Application state shared across all routes.
///
/// Collaborators are built once at startup; requests only borrow them.
pub struct AppState {
    pub config: AppConfig,
    pub assistant: Arc<dyn ProductAssistant>,
    pub verifier: LinkVerifier,
    pub site: ProductSite,
    pub started_at: DateTime<Utc>,
    started: Instant,
}

impl AppState {
    /// Loads configuration and builds the production collaborators:
    /// the OpenAI-compatible chat and embedding clients, the Chroma index
    /// and the HTTP link verifier.
    pub async fn initialize(paths: Arc<AppPaths>) -> Result<Arc<Self>, InitializationError> {
        let config_service = ConfigService::new(paths.clone());
        let raw = config_service
            .load_raw()
            .map_err(|e| InitializationError::Config(e.into()))?;
        let config = parse_config(&raw).map_err(|e| InitializationError::Config(e.into()))?;

        tracing::info!(
            config_path = %config_service.config_path().display(),
            "Effective configuration: {}",
            config_service.redact_sensitive_values(&raw)
        );

        let verifier = LinkVerifier::from_config(&config.verification)
            .map_err(|e| InitializationError::Verifier(e.into()))?;
        let assistant: Arc<dyn ProductAssistant> = Arc::new(RetrievalChain::from_config(&config));

        Ok(Arc::new(Self::new(config, assistant, verifier)))
    }

    pub fn new(config: AppConfig, assistant: Arc<dyn ProductAssistant>, verifier: LinkVerifier) -> Self {
        let site = ProductSite::from(&config.site);
        Self {
            config,
            assistant,
            verifier,
            site,
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
