use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::llm_client::{DEFAULT_API_BASE, DEFAULT_MODEL};

const API_KEY_VAR: &str = "GOOGLE_API_KEY";
const DEFAULT_SECRETS_PATH: &str = ".streamlit/secrets.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API key missing: set GOOGLE_API_KEY in the environment, .env, or {0}")]
    CredentialMissing(String),

    #[error("Secrets file {path} is not valid TOML: {source}")]
    InvalidSecrets {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Application configuration loaded from environment variables.
/// Startup halts if no API credential can be found.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    /// Ordered model candidates, tried first to last.
    pub model_candidates: Vec<String>,
    pub api_base: String,
    pub port: u16,
    pub rust_log: String,
    pub ats_use_idf: bool,
    pub ats_sublinear_tf: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let secrets_path = std::env::var("SECRETS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SECRETS_PATH));

        let google_api_key = resolve_api_key(std::env::var(API_KEY_VAR).ok(), &secrets_path)?;

        Ok(Config {
            google_api_key,
            model_candidates: parse_model_list(
                &std::env::var("GEMINI_MODELS").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            ),
            api_base: std::env::var("GEMINI_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            ats_use_idf: env_flag("ATS_USE_IDF")?,
            ats_sublinear_tf: env_flag("ATS_SUBLINEAR_TF")?,
        })
    }
}

/// Environment first, then the secrets file. Blank values count as missing.
pub fn resolve_api_key(from_env: Option<String>, secrets_path: &Path) -> Result<String, ConfigError> {
    if let Some(key) = from_env.filter(|k| !k.trim().is_empty()) {
        return Ok(key);
    }

    let missing = || ConfigError::CredentialMissing(secrets_path.display().to_string());

    let Ok(raw) = std::fs::read_to_string(secrets_path) else {
        return Err(missing());
    };

    let table: toml::Table = raw.parse().map_err(|source| ConfigError::InvalidSecrets {
        path: secrets_path.display().to_string(),
        source,
    })?;

    table
        .get(API_KEY_VAR)
        .and_then(|v| v.as_str())
        .filter(|k| !k.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(missing)
}

fn parse_model_list(raw: &str) -> Vec<String> {
    let models: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect();

    if models.is_empty() {
        vec![DEFAULT_MODEL.to_string()]
    } else {
        models
    }
}

fn env_flag(key: &str) -> Result<bool> {
    match std::env::var(key) {
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            other => anyhow::bail!("{key} must be a boolean, got '{other}'"),
        },
        Err(_) => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_env_key_takes_precedence_over_secrets() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "GOOGLE_API_KEY = \"from-secrets\"").unwrap();

        let key = resolve_api_key(Some("from-env".to_string()), file.path()).unwrap();
        assert_eq!(key, "from-env");
    }

    #[test]
    fn test_secrets_file_used_when_env_missing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "GOOGLE_API_KEY = \"from-secrets\"").unwrap();

        let key = resolve_api_key(None, file.path()).unwrap();
        assert_eq!(key, "from-secrets");
    }

    #[test]
    fn test_blank_env_key_falls_through_to_secrets() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "GOOGLE_API_KEY = \"from-secrets\"").unwrap();

        let key = resolve_api_key(Some("   ".to_string()), file.path()).unwrap();
        assert_eq!(key, "from-secrets");
    }

    #[test]
    fn test_missing_everywhere_is_credential_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = resolve_api_key(None, &path).unwrap_err();
        assert!(matches!(err, ConfigError::CredentialMissing(_)));
    }

    #[test]
    fn test_secrets_without_key_is_credential_missing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "OTHER = \"x\"").unwrap();

        let err = resolve_api_key(None, file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::CredentialMissing(_)));
    }

    #[test]
    fn test_malformed_secrets_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "GOOGLE_API_KEY = ").unwrap();

        let err = resolve_api_key(None, file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSecrets { .. }));
    }

    #[test]
    fn test_parse_model_list_keeps_order() {
        assert_eq!(
            parse_model_list("gemini-2.0-flash, gemini-1.5-flash ,,"),
            vec!["gemini-2.0-flash", "gemini-1.5-flash"]
        );
    }

    #[test]
    fn test_parse_model_list_empty_falls_back_to_default() {
        assert_eq!(parse_model_list(" , "), vec![DEFAULT_MODEL.to_string()]);
    }
}
