use serde::{Deserialize, Serialize};

use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{validate_non_empty, validate_url, Validate};

/// Env var names checked in order for the project URL. Different deployment
/// platforms (Vite, Next, plain) prefix the same credentials differently.
const URL_VARS: [&str; 3] = [
    "VITE_SUPABASE_URL",
    "NEXT_PUBLIC_SUPABASE_URL",
    "SUPABASE_URL",
];

const KEY_VARS: [&str; 3] = [
    "VITE_SUPABASE_ANON_KEY",
    "NEXT_PUBLIC_SUPABASE_PUBLISHABLE_KEY",
    "SUPABASE_ANON_KEY",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
        }
    }

    /// Resolves credentials from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::resolve(|name| std::env::var(name).ok())
    }

    /// Pure resolution over an injected lookup, so the fallback order is
    /// testable without touching the process environment.
    pub fn resolve<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = first_present(&lookup, &URL_VARS);
        let anon_key = first_present(&lookup, &KEY_VARS);

        match (url, anon_key) {
            (Some(url), Some(anon_key)) => Ok(Self { url, anon_key }),
            (url, key) => Err(SyncError::ConfigError {
                message: format!(
                    "Supabase credentials not found (url: {}, key: {}); checked {} and {}",
                    presence(&url),
                    presence(&key),
                    URL_VARS.join("/"),
                    KEY_VARS.join("/"),
                ),
            }),
        }
    }
}

impl Validate for SupabaseConfig {
    fn validate(&self) -> Result<()> {
        validate_url("supabase_url", &self.url)?;
        validate_non_empty("supabase_anon_key", &self.anon_key)?;
        Ok(())
    }
}

fn first_present<F>(lookup: &F, names: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.is_empty())
}

fn presence(value: &Option<String>) -> &'static str {
    if value.is_some() {
        "present"
    } else {
        "missing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn resolve_from(vars: HashMap<String, String>) -> Result<SupabaseConfig> {
        SupabaseConfig::resolve(|name| vars.get(name).cloned())
    }

    #[test]
    fn prefers_vite_prefixed_vars() {
        let config = resolve_from(env(&[
            ("VITE_SUPABASE_URL", "https://vite.supabase.co"),
            ("SUPABASE_URL", "https://plain.supabase.co"),
            ("VITE_SUPABASE_ANON_KEY", "vite-key"),
            ("SUPABASE_ANON_KEY", "plain-key"),
        ]))
        .unwrap();

        assert_eq!(config.url, "https://vite.supabase.co");
        assert_eq!(config.anon_key, "vite-key");
    }

    #[test]
    fn falls_back_to_next_public_vars() {
        let config = resolve_from(env(&[
            ("NEXT_PUBLIC_SUPABASE_URL", "https://next.supabase.co"),
            ("NEXT_PUBLIC_SUPABASE_PUBLISHABLE_KEY", "next-key"),
        ]))
        .unwrap();

        assert_eq!(config.url, "https://next.supabase.co");
        assert_eq!(config.anon_key, "next-key");
    }

    #[test]
    fn falls_back_to_unprefixed_vars() {
        let config = resolve_from(env(&[
            ("SUPABASE_URL", "https://plain.supabase.co"),
            ("SUPABASE_ANON_KEY", "plain-key"),
        ]))
        .unwrap();

        assert_eq!(config.url, "https://plain.supabase.co");
        assert_eq!(config.anon_key, "plain-key");
    }

    #[test]
    fn empty_value_falls_through_to_next_var() {
        let config = resolve_from(env(&[
            ("VITE_SUPABASE_URL", ""),
            ("SUPABASE_URL", "https://plain.supabase.co"),
            ("SUPABASE_ANON_KEY", "plain-key"),
        ]))
        .unwrap();

        assert_eq!(config.url, "https://plain.supabase.co");
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let err = resolve_from(env(&[("SUPABASE_URL", "https://plain.supabase.co")])).unwrap_err();
        match err {
            SyncError::ConfigError { message } => {
                assert!(message.contains("url: present"));
                assert!(message.contains("key: missing"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_bad_scheme() {
        let config = SupabaseConfig::new("ws://abc.supabase.co", "key");
        assert!(config.validate().is_err());
    }
}
