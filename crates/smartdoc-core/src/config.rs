use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConfigError, ValidationError};
use crate::store::KeyValueStore;

pub const API_URL_KEY: &str = "smartdoc_api_url";
pub const USER_ID_KEY: &str = "smartdoc_user_id";
pub const DEFAULT_USER_ID: &str = "user_marie_123";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub user_id: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            user_id: DEFAULT_USER_ID.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn has_api_url(&self) -> bool {
        !self.api_base_url.is_empty()
    }

    /// Build `{base}/{path}` without doubling the separator.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url.trim_end_matches('/'), path)
    }

    /// Check a candidate configuration. Inputs are trimmed first.
    pub fn validate(api_base_url: &str, user_id: &str) -> Result<Self, ValidationError> {
        let api_base_url = api_base_url.trim();
        let user_id = user_id.trim();

        if api_base_url.is_empty() {
            return Err(ValidationError::MissingApiUrl);
        }
        if user_id.is_empty() {
            return Err(ValidationError::MissingUserId);
        }

        let parsed = Url::parse(api_base_url)
            .map_err(|e| ValidationError::InvalidApiUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ValidationError::InvalidApiUrl(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }

        Ok(Self {
            api_base_url: api_base_url.to_string(),
            user_id: user_id.to_string(),
        })
    }
}

/// Holds the live [`ClientConfig`] and mirrors it into a [`KeyValueStore`].
pub struct ConfigStore<S> {
    store: S,
    current: ClientConfig,
}

impl<S: KeyValueStore> ConfigStore<S> {
    /// Read persisted settings, falling back to defaults for anything absent.
    pub fn load(store: S) -> Self {
        let defaults = ClientConfig::default();
        let current = ClientConfig {
            api_base_url: store.get(API_URL_KEY).unwrap_or(defaults.api_base_url),
            user_id: store.get(USER_ID_KEY).unwrap_or(defaults.user_id),
        };
        Self { store, current }
    }

    pub fn current(&self) -> &ClientConfig {
        &self.current
    }

    pub fn save(&mut self, api_base_url: &str, user_id: &str) -> Result<ClientConfig, ConfigError> {
        let config = ClientConfig::validate(api_base_url, user_id)?;

        self.store.set_many(&[
            (API_URL_KEY, config.api_base_url.as_str()),
            (USER_ID_KEY, config.user_id.as_str()),
        ])?;
        self.current = config.clone();

        tracing::info!(api = %config.api_base_url, user = %config.user_id, "configuration saved");
        Ok(config)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryStore;

    /// Accepts every key except the user id.
    struct UserIdWriteFails(MemoryStore);

    impl KeyValueStore for UserIdWriteFails {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            if key == USER_ID_KEY {
                return Err(StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "read-only")));
            }
            self.0.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.0.remove(key)
        }
    }

    #[test]
    fn test_load_defaults_when_empty() {
        let config = ConfigStore::load(MemoryStore::new());
        assert_eq!(config.current().api_base_url, "");
        assert_eq!(config.current().user_id, DEFAULT_USER_ID);
        assert!(!config.current().has_api_url());
    }

    #[test]
    fn test_load_reads_persisted_values() {
        let store = MemoryStore::new()
            .with(API_URL_KEY, "https://api.example.com")
            .with(USER_ID_KEY, "bob");
        let config = ConfigStore::load(store);
        assert_eq!(config.current().api_base_url, "https://api.example.com");
        assert_eq!(config.current().user_id, "bob");
    }

    #[test]
    fn test_save_rejects_non_url() {
        let mut config = ConfigStore::load(MemoryStore::new());
        let err = config.save("not a url", "bob").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ValidationError::InvalidApiUrl(_))
        ));
        assert_eq!(config.store().get(API_URL_KEY), None);
        assert_eq!(config.store().get(USER_ID_KEY), None);
        assert_eq!(config.current(), &ClientConfig::default());
    }

    #[test]
    fn test_save_rejects_empty_fields() {
        let mut config = ConfigStore::load(MemoryStore::new());
        assert!(matches!(
            config.save("   ", "bob"),
            Err(ConfigError::Validation(ValidationError::MissingApiUrl))
        ));
        assert!(matches!(
            config.save("https://api.example.com", ""),
            Err(ConfigError::Validation(ValidationError::MissingUserId))
        ));
    }

    #[test]
    fn test_save_rejects_non_http_scheme() {
        assert!(matches!(
            ClientConfig::validate("mailto:bob@example.com", "bob"),
            Err(ValidationError::InvalidApiUrl(_))
        ));
    }

    #[test]
    fn test_save_persists_trimmed_values() {
        let mut config = ConfigStore::load(MemoryStore::new());
        let saved = config.save(" https://api.example.com ", " bob ").unwrap();
        assert_eq!(saved.api_base_url, "https://api.example.com");
        assert_eq!(config.store().get(API_URL_KEY).as_deref(), Some("https://api.example.com"));
        assert_eq!(config.store().get(USER_ID_KEY).as_deref(), Some("bob"));
        assert_eq!(config.current(), &saved);
    }

    #[test]
    fn test_endpoint_drops_trailing_slash() {
        let config = ClientConfig {
            api_base_url: "https://api.example.com/prod/".to_string(),
            user_id: "bob".to_string(),
        };
        assert_eq!(config.endpoint("chat"), "https://api.example.com/prod/chat");
    }

    #[test]
    fn test_failed_save_leaves_persisted_settings_alone() {
        let store = UserIdWriteFails(
            MemoryStore::new()
                .with(API_URL_KEY, "https://old.example.com")
                .with(USER_ID_KEY, "alice"),
        );
        let mut config = ConfigStore::load(store);

        let err = config.save("https://new.example.com", "bob").unwrap_err();
        assert!(matches!(err, ConfigError::Store(_)));
        assert_eq!(config.current().api_base_url, "https://old.example.com");

        let reloaded = ConfigStore::load(config.store().0.clone());
        assert_eq!(
            reloaded.current(),
            &ClientConfig {
                api_base_url: "https://old.example.com".to_string(),
                user_id: "alice".to_string(),
            }
        );
    }

    #[test]
    fn test_failed_first_save_leaves_store_empty() {
        let mut config = ConfigStore::load(UserIdWriteFails(MemoryStore::new()));
        assert!(config.save("https://new.example.com", "bob").is_err());
        assert_eq!(config.store().get(API_URL_KEY), None);
    }
}
