//! Configuration management for Omnicast
//!
//! Configuration is loaded once at process start into an immutable [`Config`]
//! snapshot. Values come from a TOML file and are then overlaid with the
//! provider environment variables, so a deployment can be configured with
//! either (or both). Each provider adapter captures its own section of the
//! snapshot at construction time.
//!
//! ```toml
//! [bluesky]
//! identifier = "alice.bsky.social"
//! app_password = "xxxx-xxxx-xxxx-xxxx"
//!
//! [mastodon]
//! instance = "mastodon.social"
//! access_token = "..."
//!
//! [slack]
//! webhook_url = "https://hooks.slack.com/services/..."
//!
//! [discord]
//! webhook_url = "https://discord.com/api/webhooks/..."
//!
//! [defaults]
//! providers = ["bluesky", "mastodon"]
//! timeout_secs = 30
//! ```

use secrecy::SecretString;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::providers::ProviderKind;

/// Environment variable pointing at an explicit config file
pub const CONFIG_ENV_VAR: &str = "OMNICAST_CONFIG";

pub const DEFAULT_BLUESKY_SERVICE: &str = "https://bsky.social";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Immutable configuration snapshot.
///
/// A provider section is `Some` only when every required field is present
/// and non-empty.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub bluesky: Option<BlueskyConfig>,
    pub mastodon: Option<MastodonConfig>,
    pub slack: Option<WebhookConfig>,
    pub discord: Option<WebhookConfig>,
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone)]
pub struct BlueskyConfig {
    pub identifier: String,
    pub app_password: SecretString,
    /// PDS base URL used for login and record creation
    pub service: String,
}

#[derive(Debug, Clone)]
pub struct MastodonConfig {
    /// Instance host (`mastodon.social`) or full base URL
    pub instance: String,
    pub access_token: SecretString,
}

impl MastodonConfig {
    /// Base URL of the instance, defaulting to https when no scheme is given
    pub fn base_url(&self) -> String {
        let instance = self.instance.trim_end_matches('/');
        if instance.starts_with("http://") || instance.starts_with("https://") {
            instance.to_string()
        } else {
            format!("https://{}", instance)
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub webhook_url: SecretString,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Providers used when the caller names none
    pub providers: Vec<String>,
    /// Per-call timeout applied to provider requests; must be non-zero
    pub timeout_secs: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// On-disk shape: every field optional so the environment can fill gaps.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    bluesky: BlueskySection,
    mastodon: MastodonSection,
    slack: WebhookSection,
    discord: WebhookSection,
    defaults: DefaultsConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BlueskySection {
    identifier: Option<String>,
    app_password: Option<String>,
    service: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MastodonSection {
    instance: Option<String>,
    access_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WebhookSection {
    webhook_url: Option<String>,
}

impl ConfigFile {
    fn overlay_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        overlay(&mut self.bluesky.identifier, lookup("BLUESKY_IDENTIFIER"));
        overlay(&mut self.bluesky.app_password, lookup("BLUESKY_APP_PASSWORD"));
        overlay(&mut self.bluesky.service, lookup("BLUESKY_SERVICE"));
        overlay(&mut self.mastodon.instance, lookup("MASTODON_INSTANCE"));
        overlay(&mut self.mastodon.access_token, lookup("MASTODON_ACCESS_TOKEN"));
        overlay(&mut self.slack.webhook_url, lookup("SLACK_WEBHOOK_URL"));
        overlay(&mut self.discord.webhook_url, lookup("DISCORD_WEBHOOK_URL"));
    }

    fn into_config(self) -> Config {
        let bluesky = match (
            non_empty(self.bluesky.identifier),
            non_empty(self.bluesky.app_password),
        ) {
            (Some(identifier), Some(password)) => Some(BlueskyConfig {
                identifier,
                app_password: SecretString::from(password),
                service: non_empty(self.bluesky.service)
                    .unwrap_or_else(|| DEFAULT_BLUESKY_SERVICE.to_string()),
            }),
            _ => None,
        };

        let mastodon = match (
            non_empty(self.mastodon.instance),
            non_empty(self.mastodon.access_token),
        ) {
            (Some(instance), Some(token)) => Some(MastodonConfig {
                instance,
                access_token: SecretString::from(token),
            }),
            _ => None,
        };

        Config {
            bluesky,
            mastodon,
            slack: self.slack.into_webhook(),
            discord: self.discord.into_webhook(),
            defaults: self.defaults,
        }
    }
}

impl WebhookSection {
    fn into_webhook(self) -> Option<WebhookConfig> {
        non_empty(self.webhook_url).map(|url| WebhookConfig {
            webhook_url: SecretString::from(url),
        })
    }
}

fn overlay(slot: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        *slot = Some(value);
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from the default location, overlaid with the
    /// process environment
    ///
    /// A missing file at the default location is not an error; a missing file
    /// named by `OMNICAST_CONFIG` is.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        let explicit = std::env::var_os(CONFIG_ENV_VAR).is_some();

        let content = if explicit || config_path.exists() {
            Some(std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?)
        } else {
            tracing::debug!("No config file at {}, using environment only", config_path.display());
            None
        };

        Self::from_sources(content.as_deref(), |key| std::env::var(key).ok())
    }

    /// Load configuration from a specific path, ignoring the environment
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text, ignoring the environment
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::from_sources(Some(content), |_| None)
    }

    /// Build configuration from the process environment only
    pub fn from_env() -> Self {
        let mut file = ConfigFile::default();
        file.overlay_env(|key| std::env::var(key).ok());
        file.into_config()
    }

    /// Build configuration from optional TOML text and an environment lookup.
    /// Environment values take precedence over file values.
    pub fn from_sources<F>(content: Option<&str>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut file: ConfigFile = match content {
            Some(content) => toml::from_str(content).map_err(ConfigError::ParseError)?,
            None => ConfigFile::default(),
        };
        if file.defaults.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "defaults.timeout_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        file.overlay_env(lookup);
        Ok(file.into_config())
    }

    /// Whether the given built-in provider has all of its settings
    pub fn is_configured(&self, kind: ProviderKind) -> bool {
        match kind {
            ProviderKind::Bluesky => self.bluesky.is_some(),
            ProviderKind::Mastodon => self.mastodon.is_some(),
            ProviderKind::Slack => self.slack.is_some(),
            ProviderKind::Discord => self.discord.is_some(),
        }
    }

    /// Configured-ness of every built-in provider. Performs no I/O.
    pub fn capabilities(&self) -> BTreeMap<ProviderKind, bool> {
        ProviderKind::ALL
            .iter()
            .map(|kind| (*kind, self.is_configured(*kind)))
            .collect()
    }

    /// Built-in providers that are ready to publish
    pub fn configured_providers(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .iter()
            .copied()
            .filter(|kind| self.is_configured(*kind))
            .collect()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.defaults.timeout_secs)
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("omnicast").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_empty_config_has_nothing_configured() {
        let config = Config::from_toml_str("").unwrap();

        assert!(config.configured_providers().is_empty());
        assert_eq!(config.defaults.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.capabilities().values().all(|configured| !configured));
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_toml_str(
            r#"
[bluesky]
identifier = "alice.bsky.social"
app_password = "app-pass"

[mastodon]
instance = "mastodon.social"
access_token = "token"

[slack]
webhook_url = "https://hooks.slack.com/services/T/B/X"

[discord]
webhook_url = "https://discord.com/api/webhooks/1/abc"

[defaults]
providers = ["slack"]
timeout_secs = 5
"#,
        )
        .unwrap();

        let bluesky = config.bluesky.as_ref().unwrap();
        assert_eq!(bluesky.identifier, "alice.bsky.social");
        assert_eq!(bluesky.app_password.expose_secret(), "app-pass");
        assert_eq!(bluesky.service, DEFAULT_BLUESKY_SERVICE);
        assert_eq!(config.configured_providers(), ProviderKind::ALL.to_vec());
        assert_eq!(config.defaults.providers, vec!["slack".to_string()]);
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let err = Config::from_toml_str("[defaults]\ntimeout_secs = 0\n").unwrap_err();

        assert!(matches!(
            err,
            crate::error::OmnicastError::Config(ConfigError::InvalidValue { .. })
        ));
        assert!(err.to_string().contains("defaults.timeout_secs"));
    }

    #[test]
    fn test_partial_section_is_not_configured() {
        let config = Config::from_toml_str(
            r#"
[bluesky]
identifier = "alice.bsky.social"

[mastodon]
instance = "mastodon.social"
access_token = ""
"#,
        )
        .unwrap();

        assert!(!config.is_configured(ProviderKind::Bluesky));
        assert!(!config.is_configured(ProviderKind::Mastodon));
    }

    #[test]
    fn test_env_overlay_fills_and_overrides() {
        let config = Config::from_sources(
            Some(
                r#"
[slack]
webhook_url = "https://file.example/hook"
"#,
            ),
            env_of(&[
                ("SLACK_WEBHOOK_URL", "https://env.example/hook"),
                ("DISCORD_WEBHOOK_URL", "https://discord.example/hook"),
                ("MASTODON_INSTANCE", "fosstodon.org"),
            ]),
        )
        .unwrap();

        assert_eq!(
            config.slack.as_ref().unwrap().webhook_url.expose_secret(),
            "https://env.example/hook"
        );
        assert!(config.is_configured(ProviderKind::Discord));
        // Instance without a token is still unconfigured
        assert!(!config.is_configured(ProviderKind::Mastodon));
    }

    #[test]
    fn test_empty_env_value_is_ignored() {
        let config = Config::from_sources(
            Some("[slack]\nwebhook_url = \"https://file.example/hook\"\n"),
            env_of(&[("SLACK_WEBHOOK_URL", "")]),
        )
        .unwrap();

        assert_eq!(
            config.slack.as_ref().unwrap().webhook_url.expose_secret(),
            "https://file.example/hook"
        );
    }

    #[test]
    fn test_capabilities_are_ordered() {
        let config = Config::from_sources(None, env_of(&[("DISCORD_WEBHOOK_URL", "x")])).unwrap();
        let caps: Vec<_> = config.capabilities().into_iter().collect();

        assert_eq!(
            caps,
            vec![
                (ProviderKind::Bluesky, false),
                (ProviderKind::Mastodon, false),
                (ProviderKind::Slack, false),
                (ProviderKind::Discord, true),
            ]
        );
    }

    #[test]
    fn test_mastodon_base_url() {
        let bare = MastodonConfig {
            instance: "mastodon.social".to_string(),
            access_token: SecretString::from("t".to_string()),
        };
        assert_eq!(bare.base_url(), "https://mastodon.social");

        let explicit = MastodonConfig {
            instance: "http://127.0.0.1:8080/".to_string(),
            access_token: SecretString::from("t".to_string()),
        };
        assert_eq!(explicit.base_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let result = Config::from_toml_str("[slack\nwebhook_url = 1");
        assert!(matches!(
            result,
            Err(crate::error::OmnicastError::Config(ConfigError::ParseError(_)))
        ));
    }

    #[test]
    fn test_secrets_are_redacted_in_debug() {
        let config = Config::from_sources(
            None,
            env_of(&[
                ("BLUESKY_IDENTIFIER", "alice"),
                ("BLUESKY_APP_PASSWORD", "super-secret"),
            ]),
        )
        .unwrap();

        assert!(!format!("{:?}", config).contains("super-secret"));
    }

    #[test]
    fn test_load_from_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[discord]\nwebhook_url = \"https://d.example/h\"\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.configured_providers(), vec![ProviderKind::Discord]);
    }

    #[test]
    #[serial]
    fn test_load_honours_config_env_var() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("omnicast.toml");
        std::fs::write(&path, "[defaults]\ntimeout_secs = 7\n").unwrap();

        std::env::set_var(CONFIG_ENV_VAR, &path);
        let config = Config::load();
        std::env::remove_var(CONFIG_ENV_VAR);

        assert_eq!(config.unwrap().defaults.timeout_secs, 7);
    }

    #[test]
    #[serial]
    fn test_load_missing_explicit_file_is_error() {
        std::env::set_var(CONFIG_ENV_VAR, "/nonexistent/omnicast/config.toml");
        let result = Config::load();
        std::env::remove_var(CONFIG_ENV_VAR);

        assert!(matches!(
            result,
            Err(crate::error::OmnicastError::Config(ConfigError::ReadError(_)))
        ));
    }
}
