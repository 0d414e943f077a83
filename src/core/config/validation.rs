use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid config at '{path}': {reason}")]
    Invalid { path: String, reason: String },
    #[error("Failed to read config: {0}")]
    Parse(String),
}

pub fn validate_config(config: &Value) -> Result<(), ConfigError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(server) = expect_optional_object(root, "server")? {
        validate_optional_string_field(server, "server.host", "host")?;
        validate_u64_field(server, "server.port", "port", 0, 65_535)?;
        validate_string_array_field(
            server,
            "server.cors_allowed_origins",
            "cors_allowed_origins",
        )?;
    }

    if let Some(site) = expect_optional_object(root, "site")? {
        validate_non_empty_string_field(site, "site.host", "host")?;
        validate_non_empty_string_field(site, "site.locale", "locale")?;
        if let Some(host) = site.get("host").and_then(|v| v.as_str()) {
            if host.contains('/') || host.contains("://") {
                return Err(ConfigError::Invalid {
                    path: "site.host".to_string(),
                    reason: "expected a bare host name without scheme or path".to_string(),
                });
            }
        }
    }

    if let Some(verification) = expect_optional_object(root, "verification")? {
        validate_u64_field(
            verification,
            "verification.connect_timeout_secs",
            "connect_timeout_secs",
            1,
            60,
        )?;
        validate_u64_field(
            verification,
            "verification.timeout_secs",
            "timeout_secs",
            1,
            60,
        )?;
        validate_u64_field(
            verification,
            "verification.max_concurrency",
            "max_concurrency",
            1,
            64,
        )?;
        validate_u64_field(
            verification,
            "verification.requests_per_second",
            "requests_per_second",
            1,
            10_000,
        )?;
        validate_u64_field(
            verification,
            "verification.max_redirects",
            "max_redirects",
            0,
            32,
        )?;
    }

    if let Some(llm) = expect_optional_object(root, "llm")? {
        validate_non_empty_string_field(llm, "llm.base_url", "base_url")?;
        validate_non_empty_string_field(llm, "llm.model", "model")?;
        if let Some(value) = llm.get("temperature") {
            match value.as_f64() {
                Some(t) if (0.0..=2.0).contains(&t) => {}
                Some(_) => {
                    return Err(ConfigError::Invalid {
                        path: "llm.temperature".to_string(),
                        reason: "must be between 0 and 2".to_string(),
                    })
                }
                None => return Err(config_type_error("llm.temperature", "number")),
            }
        }
    }

    if let Some(embeddings) = expect_optional_object(root, "embeddings")? {
        validate_non_empty_string_field(embeddings, "embeddings.base_url", "base_url")?;
        validate_non_empty_string_field(embeddings, "embeddings.model", "model")?;
    }

    if let Some(retrieval) = expect_optional_object(root, "retrieval")? {
        validate_non_empty_string_field(retrieval, "retrieval.chroma_url", "chroma_url")?;
        validate_non_empty_string_field(retrieval, "retrieval.collection", "collection")?;
        validate_u64_field(retrieval, "retrieval.k", "k", 1, 1_000)?;
        validate_u64_field(retrieval, "retrieval.fetch_k", "fetch_k", 1, 10_000)?;

        let k = retrieval.get("k").and_then(|v| v.as_u64()).unwrap_or(25);
        let fetch_k = retrieval
            .get("fetch_k")
            .and_then(|v| v.as_u64())
            .unwrap_or(50);
        if fetch_k < k {
            return Err(ConfigError::Invalid {
                path: "retrieval.fetch_k".to_string(),
                reason: "must be greater than or equal to retrieval.k".to_string(),
            });
        }

        if let Some(value) = retrieval.get("lambda_mult") {
            match value.as_f64() {
                Some(l) if (0.0..=1.0).contains(&l) => {}
                Some(_) => {
                    return Err(ConfigError::Invalid {
                        path: "retrieval.lambda_mult".to_string(),
                        reason: "must be between 0 and 1".to_string(),
                    })
                }
                None => return Err(config_type_error("retrieval.lambda_mult", "number")),
            }
        }
    }

    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, ConfigError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(config_type_error(key, "object")),
    }
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.is_null() {
        return Ok(());
    }
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(ConfigError::Invalid {
            path: path.to_string(),
            reason: format!("must be between {} and {}", min, max),
        });
    }
    Ok(())
}

fn validate_non_empty_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(text) = value.as_str() else {
        return Err(config_type_error(path, "string"));
    };
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid {
            path: path.to_string(),
            reason: "value cannot be empty".to_string(),
        });
    }
    Ok(())
}

fn validate_optional_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.as_str().is_none() {
        return Err(config_type_error(path, "string"));
    }
    Ok(())
}

fn validate_string_array_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(items) = value.as_array() else {
        return Err(config_type_error(path, "array of strings"));
    };
    for (index, item) in items.iter().enumerate() {
        let Some(text) = item.as_str() else {
            return Err(config_type_error(&format!("{}[{}]", path, index), "string"));
        };
        if text.trim().is_empty() {
            return Err(ConfigError::Invalid {
                path: format!("{}[{}]", path, index),
                reason: "value cannot be empty".to_string(),
            });
        }
    }
    Ok(())
}

fn config_type_error(path: &str, expected: &str) -> ConfigError {
    ConfigError::Invalid {
        path: path.to_string(),
        reason: format!("expected {}", expected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_empty_and_partial_configs() {
        assert!(validate_config(&json!({})).is_ok());
        assert!(validate_config(&json!({
            "site": { "host": "www.example.com", "locale": "en-gb" },
            "verification": { "max_concurrency": 8, "requests_per_second": null }
        }))
        .is_ok());
    }

    #[test]
    fn rejects_site_host_with_scheme() {
        let err = validate_config(&json!({
            "site": { "host": "https://www.example.com" }
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref path, .. } if path == "site.host"));
    }

    #[test]
    fn rejects_out_of_range_verification_limits() {
        let err = validate_config(&json!({
            "verification": { "timeout_secs": 0 }
        }))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                path: "verification.timeout_secs".to_string(),
                reason: "must be between 1 and 60".to_string(),
            }
        );

        assert!(validate_config(&json!({
            "verification": { "max_concurrency": 1000 }
        }))
        .is_err());
    }

    #[test]
    fn rejects_fetch_k_below_k() {
        let err = validate_config(&json!({
            "retrieval": { "k": 30, "fetch_k": 10 }
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref path, .. } if path == "retrieval.fetch_k"));
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(validate_config(&json!([])).is_err());
        assert!(validate_config(&json!({ "server": "nope" })).is_err());
        assert!(validate_config(&json!({ "llm": { "temperature": "hot" } })).is_err());
        assert!(validate_config(&json!({ "server": { "cors_allowed_origins": [""] } })).is_err());
    }
}
