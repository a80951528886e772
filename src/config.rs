//! Configuration file handling.
//!
//! The ledger home directory (`$LEDGER_HOME`) holds `config.json`, the file-backed key-value
//! store `store.json`, and `session.json` while a user is signed in.

use crate::error::{ErrorType, IntoResult, Res};
use crate::format::{Formatter, Locale};
use crate::ledger::{Ledger, LedgerKey, DEFAULT_NAMESPACE};
use crate::model::User;
use crate::session::Session;
use crate::store::{FileStore, KeyValueStore};
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const APP_NAME: &str = "ledger";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const STORE_JSON: &str = "store.json";
const SESSION_JSON: &str = "session.json";
/// A fixed offset must stay strictly within one day of UTC.
const MAX_OFFSET_MINUTES: i32 = 24 * 60 - 1;

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$LEDGER_HOME` and from there it loads `$LEDGER_HOME/config.json`. It provides
/// the store, the session and the formatter that commands need.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    store: Arc<FileStore>,
    session: Session,
}

impl Config {
    /// Creates the ledger home directory, if needed, and writes an initial `config.json`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the ledger home, e.g. `$HOME/gofinances`
    /// - `namespace` - The prefix of every ledger key, `@gofinances` when `None`
    /// - `locale` - How amounts and dates are displayed
    ///
    /// # Errors
    /// - Returns an `ErrorType::Config` error if a config file already exists or any file
    ///   operation fails.
    pub async fn create(
        dir: impl Into<PathBuf>,
        namespace: Option<&str>,
        locale: Locale,
    ) -> Result<Self> {
        create(dir.into(), namespace, locale)
            .await
            .pub_result(ErrorType::Config)
    }

    /// This will
    /// - validate that the ledger home and its config file exist
    /// - load the config file
    /// - return the loaded configuration object
    pub async fn load(ledger_home: impl Into<PathBuf>) -> Result<Self> {
        load(ledger_home.into()).await.pub_result(ErrorType::Config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn store_path(&self) -> &Path {
        self.store.path()
    }

    pub fn namespace(&self) -> &str {
        &self.config_file.namespace
    }

    pub fn locale(&self) -> Locale {
        self.config_file.locale
    }

    /// The formatter for the configured locale and UTC offset.
    pub fn formatter(&self) -> Formatter {
        let formatter = Formatter::new(self.locale());
        match self
            .config_file
            .utc_offset_minutes
            .and_then(|m| m.checked_mul(60))
            .and_then(FixedOffset::east_opt)
        {
            Some(offset) => formatter.with_offset(offset),
            None => formatter,
        }
    }

    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        self.store.clone()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The ledger of `user` in the configured store and namespace.
    pub fn ledger(&self, user: &User) -> Ledger {
        Ledger::new(self.store(), LedgerKey::new(self.namespace(), &user.id))
    }
}

async fn create(maybe_relative: PathBuf, namespace: Option<&str>, locale: Locale) -> Res<Config> {
    utils::make_dir(&maybe_relative)
        .await
        .context("Unable to create the ledger home directory")?;
    let root = utils::canonicalize(&maybe_relative).await?;
    let config_path = root.join(CONFIG_JSON);
    if config_path.exists() {
        bail!(
            "A config file already exists at '{}'",
            config_path.display()
        );
    }

    let namespace = namespace.unwrap_or(DEFAULT_NAMESPACE).trim();
    ensure!(!namespace.is_empty(), "The namespace cannot be empty");
    let config_file = ConfigFile {
        namespace: namespace.to_string(),
        locale,
        ..ConfigFile::default()
    };
    config_file.save(&config_path).await?;
    Ok(Config::assemble(root, config_path, config_file))
}

async fn load(maybe_relative: PathBuf) -> Res<Config> {
    let root = utils::canonicalize(&maybe_relative)
        .await
        .context("The ledger home is missing, run `ledger init` first")?;
    let config_path = root.join(CONFIG_JSON);
    if !config_path.is_file() {
        bail!("The config file is missing '{}'", config_path.display())
    }
    let config_file = ConfigFile::load(&config_path).await?;
    Ok(Config::assemble(root, config_path, config_file))
}

impl Config {
    fn assemble(root: PathBuf, config_path: PathBuf, config_file: ConfigFile) -> Self {
        Self {
            store: Arc::new(FileStore::new(root.join(STORE_JSON))),
            session: Session::new(root.join(SESSION_JSON)),
            root,
            config_path,
            config_file,
        }
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "ledger",
///   "config_version": 1,
///   "namespace": "@gofinances",
///   "locale": "pt-BR",
///   "utc_offset_minutes": -180
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "ledger"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Prefix of every ledger key in the store
    namespace: String,

    /// Display locale for amounts and dates
    #[serde(default)]
    locale: Locale,

    /// Offset from UTC, in minutes, used to display dates. UTC if not specified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    utc_offset_minutes: Option<i32>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            namespace: DEFAULT_NAMESPACE.to_string(),
            locale: Locale::default(),
            utc_offset_minutes: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        if let Some(minutes) = config.utc_offset_minutes {
            ensure!(
                (-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes),
                "Invalid utc_offset_minutes in config file: expected -{max}..={max}, got {minutes}",
                max = MAX_OFFSET_MINUTES
            );
        }

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create_and_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("ledger_home");
        let created = Config::create(&home, Some("@test"), Locale::EnUs)
            .await
            .unwrap();
        assert_eq!(created.namespace(), "@test");
        assert!(created.config_path().is_file());

        let loaded = Config::load(&home).await.unwrap();
        assert_eq!(loaded.namespace(), "@test");
        assert_eq!(loaded.locale(), Locale::EnUs);
        assert_eq!(loaded.store_path(), loaded.root().join(STORE_JSON));
    }

    #[tokio::test]
    async fn test_config_create_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path(), None, Locale::default())
            .await
            .unwrap();
        assert_eq!(config.namespace(), DEFAULT_NAMESPACE);
        assert_eq!(config.locale(), Locale::PtBr);
    }

    #[tokio::test]
    async fn test_config_create_twice_fails() {
        let dir = TempDir::new().unwrap();
        Config::create(dir.path(), None, Locale::default())
            .await
            .unwrap();
        let err = Config::create(dir.path(), None, Locale::default())
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nope")).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }

    #[tokio::test]
    async fn test_config_file_load_minimal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let json = r#"{
            "app_name": "ledger",
            "config_version": 1,
            "namespace": "@gofinances"
        }"#;
        utils::write(&path, json).await.unwrap();
        let config = ConfigFile::load(&path).await.unwrap();
        assert_eq!(config.locale, Locale::PtBr);
        assert_eq!(config.utc_offset_minutes, None);
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let json = r#"{"app_name": "tiller", "config_version": 1, "namespace": "x"}"#;
        utils::write(&path, json).await.unwrap();
        let err = ConfigFile::load(&path).await.unwrap_err();
        assert!(err.to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_offset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        for minutes in [1440, -1440, i32::MAX, i32::MIN] {
            let json = format!(
                r#"{{"app_name": "ledger", "config_version": 1, "namespace": "x", "utc_offset_minutes": {minutes}}}"#
            );
            utils::write(&path, json).await.unwrap();
            let err = ConfigFile::load(&path).await.unwrap_err();
            assert!(err.to_string().contains("Invalid utc_offset_minutes"), "{minutes}");
        }

        let err = Config::load(dir.path()).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }

    #[tokio::test]
    async fn test_config_file_load_extreme_valid_offset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let json = r#"{"app_name": "ledger", "config_version": 1, "namespace": "x", "utc_offset_minutes": -1439}"#;
        utils::write(&path, json).await.unwrap();
        let config = Config::load(dir.path()).await.unwrap();
        assert_eq!(
            config.formatter().offset(),
            FixedOffset::west_opt(1439 * 60).unwrap()
        );
    }

    #[tokio::test]
    async fn test_formatter_uses_offset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let config_file = ConfigFile {
            utc_offset_minutes: Some(-180),
            ..ConfigFile::default()
        };
        config_file.save(&path).await.unwrap();
        let config = Config::load(dir.path()).await.unwrap();
        assert_eq!(
            config.formatter().offset(),
            FixedOffset::west_opt(3 * 3600).unwrap()
        );
    }

    #[test]
    fn test_config_file_serialization_omits_none_fields() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("utc_offset_minutes"));
        assert!(json.contains("\"pt-BR\""));
    }
}
