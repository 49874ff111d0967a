//! Loading `ClientConfig` from property maps, JSON files and the environment

use crate::config::{parse_csv, ClientConfig};
use crate::error::ConfigError;
use crate::mode::ProviderMode;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

pub const SECURITY_ID_KEY: &str = "tessera.security.id";
pub const CLIENT_MODE_KEY: &str = "tessera.security.client.mode";
pub const USE_MOCK_KEY: &str = "tessera.security.client.use.mock";
pub const MOCK_USER_KEY: &str = "tessera.security.client.mock.user";
pub const MOCK_TARGET_KEY: &str = "tessera.security.client.mock.target.id";
pub const MOCK_AUTHS_KEY: &str = "tessera.security.client.mock.auths";
pub const CACHE_MAX_SIZE_KEY: &str = "tessera.security.cache.max.size";
pub const CACHE_TTL_KEY: &str = "tessera.security.cache.ttl.seconds";
pub const SERVICE_NAME_KEY: &str = "tessera.security.service.name";
pub const APP_PRIVATE_KEY_KEY: &str = "tessera.security.app.private.key";
pub const ISSUER_PUBLIC_KEY_KEY: &str = "tessera.security.issuer.public.key";
pub const FRONT_END_PUBLIC_KEY_KEY: &str = "tessera.security.frontend.public.key";

pub const ENV_CLIENT_MODE: &str = "TESSERA_CLIENT_MODE";
pub const ENV_USE_MOCK: &str = "TESSERA_USE_MOCK";
pub const ENV_MOCK_USER: &str = "TESSERA_MOCK_USER";
pub const ENV_SECURITY_ID: &str = "TESSERA_SECURITY_ID";

impl ClientConfig {
    /// Build from dotted `tessera.security.*` properties; unknown keys are ignored
    pub fn from_properties(props: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut config = ClientConfig::default();
        let get = |key: &str| props.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        if let Some(id) = get(SECURITY_ID_KEY) {
            config.security_id = id.to_string();
        }
        if let Some(mode) = get(CLIENT_MODE_KEY) {
            config.mode = ProviderMode::from(mode);
        }
        if let Some(value) = get(USE_MOCK_KEY) {
            config.use_mock = parse_bool(USE_MOCK_KEY, value)?;
        }
        if let Some(user) = get(MOCK_USER_KEY) {
            config.mock_user = user.to_string();
        }
        config.mock_target = get(MOCK_TARGET_KEY).map(str::to_string);
        if let Some(auths) = get(MOCK_AUTHS_KEY) {
            config.mock_token_auths = parse_csv(auths);
        }
        if let Some(value) = get(CACHE_MAX_SIZE_KEY) {
            config.cache_max_size = parse_number(CACHE_MAX_SIZE_KEY, value)?;
        }
        if let Some(value) = get(CACHE_TTL_KEY) {
            config.cache_default_ttl_secs = parse_number(CACHE_TTL_KEY, value)?;
        }
        if let Some(name) = get(SERVICE_NAME_KEY) {
            config.service_name = name.to_string();
        }
        config.app_private_key = get(APP_PRIVATE_KEY_KEY).map(str::to_string);
        config.issuer_public_key = get(ISSUER_PUBLIC_KEY_KEY).map(str::to_string);
        config.front_end_public_key = get(FRONT_END_PUBLIC_KEY_KEY).map(str::to_string);

        debug!(mode = %config.mode, security_id = %config.security_id, "loaded client configuration from properties");
        Ok(config)
    }

    /// Read a JSON document; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ClientConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), mode = %config.mode, "loaded client configuration file");
        Ok(config)
    }

    /// Apply `TESSERA_*` variables from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup(ENV_CLIENT_MODE) {
            self.mode = ProviderMode::from(mode);
        }
        if let Some(value) = lookup(ENV_USE_MOCK) {
            self.use_mock = parse_bool(ENV_USE_MOCK, &value)?;
        }
        if let Some(user) = lookup(ENV_MOCK_USER) {
            self.mock_user = user;
        }
        if let Some(id) = lookup(ENV_SECURITY_ID) {
            self.security_id = id;
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid_value(key, value, "expected a boolean")),
    }
}

fn parse_number<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid_value(key, value, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn props(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn reads_every_property() {
        let config = ClientConfig::from_properties(&props(&[
            (SECURITY_ID_KEY, "123"),
            (CLIENT_MODE_KEY, "dev"),
            (USE_MOCK_KEY, "true"),
            (MOCK_USER_KEY, "CN=alice"),
            (MOCK_TARGET_KEY, "456"),
            (MOCK_AUTHS_KEY, "U,S"),
            (CACHE_MAX_SIZE_KEY, "50"),
            (CACHE_TTL_KEY, "30"),
            (SERVICE_NAME_KEY, "issuer"),
            (ISSUER_PUBLIC_KEY_KEY, "abc"),
        ]))
        .unwrap();

        assert_eq!(config.security_id, "123");
        assert_eq!(config.mode, ProviderMode::Unauthenticated);
        assert!(config.use_mock);
        assert_eq!(config.mock_user, "CN=alice");
        assert_eq!(config.mock_target.as_deref(), Some("456"));
        assert_eq!(config.mock_token_auths.len(), 2);
        assert_eq!(config.cache_max_size, 50);
        assert_eq!(config.cache_default_ttl_secs, 30);
        assert_eq!(config.service_name, "issuer");
        assert_eq!(config.issuer_public_key.as_deref(), Some("abc"));
        assert_eq!(config.app_private_key, None);
    }

    #[test]
    fn bad_numbers_and_booleans_are_rejected() {
        let err =
            ClientConfig::from_properties(&props(&[(CACHE_MAX_SIZE_KEY, "lots")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == CACHE_MAX_SIZE_KEY
        ));

        let err = ClientConfig::from_properties(&props(&[(USE_MOCK_KEY, "maybe")])).unwrap_err();
        assert!(err.to_string().contains("expected a boolean"));
    }

    #[test]
    fn json_file_with_partial_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"security_id": "123", "mode": "mock", "mock_token_auths": ["U", "S"]}}"#
        )
        .unwrap();

        let config = ClientConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.security_id, "123");
        assert_eq!(config.mode, ProviderMode::Mock);
        assert_eq!(config.mock_token_auths.len(), 2);
        assert_eq!(config.cache_max_size, 1000);
    }

    #[test]
    fn json_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            ClientConfig::from_json_file(&missing),
            Err(ConfigError::Io { .. })
        ));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{").unwrap();
        assert!(matches!(
            ClientConfig::from_json_file(&broken),
            Err(ConfigError::Json { .. })
        ));
    }

    #[test]
    fn overrides_from_lookup() {
        let mut config = ClientConfig::new("123");
        config
            .apply_overrides_from(|name| match name {
                ENV_CLIENT_MODE => Some("mock".into()),
                ENV_USE_MOCK => Some("1".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.mode, ProviderMode::Mock);
        assert!(config.use_mock);
        assert_eq!(config.security_id, "123");
    }

    #[test]
    #[serial]
    fn overrides_from_process_environment() {
        std::env::set_var(ENV_SECURITY_ID, "999");
        std::env::set_var(ENV_MOCK_USER, "CN=bob");

        let mut config = ClientConfig::new("123");
        let result = config.apply_env_overrides();

        std::env::remove_var(ENV_SECURITY_ID);
        std::env::remove_var(ENV_MOCK_USER);

        result.unwrap();
        assert_eq!(config.security_id, "999");
        assert_eq!(config.mock_user, "CN=bob");
    }
}
