//! Layered job configuration: defaults, then the TOML file, then
//! `MEDIASCAN_*` environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use mediascan_core::classify::Category;
use mediascan_engine::{RetryPolicy, ScanConfig};
use mediascan_storage_http::StorageConfig;
use serde::Deserialize;

/// Everything the scan job can be told, deserialised from config sources.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub database_path:          PathBuf,
  pub storage_base_url:       String,
  pub request_timeout_secs:   u64,
  pub batch_size:             usize,
  pub inter_request_delay_ms: u64,
  pub inter_batch_delay_ms:   u64,
  pub retry_budget:           u32,
  pub retry_backoff_ms:       u64,
  pub concurrency:            usize,
  pub variants:               Vec<String>,
  pub preview_limit:          usize,
  pub only:                   Vec<Category>,
}

impl Default for Settings {
  fn default() -> Self {
    let scan = ScanConfig::default();
    Self {
      database_path:          PathBuf::from("subjects.db"),
      storage_base_url:       String::new(),
      request_timeout_secs:   10,
      batch_size:             scan.batch_size,
      inter_request_delay_ms: scan.inter_request_delay.as_millis() as u64,
      inter_batch_delay_ms:   scan.inter_batch_delay.as_millis() as u64,
      retry_budget:           scan.retry.budget,
      retry_backoff_ms:       scan.retry.backoff.as_millis() as u64,
      concurrency:            scan.concurrency,
      variants:               scan.variants,
      preview_limit:          3,
      only:                   Vec::new(),
    }
  }
}

impl Settings {
  /// Read `path` if it exists, then overlay the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    Self::from_file_source(config::File::from(path).required(false))
  }

  fn from_file_source<S>(file: S) -> Result<Self, config::ConfigError>
  where
    S: config::Source + Send + Sync + 'static,
  {
    config::Config::builder()
      .add_source(file)
      .add_source(
        config::Environment::with_prefix("MEDIASCAN")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("variants")
          .with_list_parse_key("only"),
      )
      .build()?
      .try_deserialize()
  }

  pub fn scan_config(&self) -> ScanConfig {
    ScanConfig {
      batch_size:          self.batch_size,
      inter_request_delay: Duration::from_millis(self.inter_request_delay_ms),
      inter_batch_delay:   Duration::from_millis(self.inter_batch_delay_ms),
      retry:               RetryPolicy {
        budget:  self.retry_budget,
        backoff: Duration::from_millis(self.retry_backoff_ms),
      },
      concurrency:         self.concurrency,
      variants:            self.variants.clone(),
    }
  }

  pub fn storage_config(&self) -> StorageConfig {
    StorageConfig {
      base_url: self.storage_base_url.clone(),
      timeout:  Duration::from_secs(self.request_timeout_secs),
    }
  }
}

#[cfg(test)]
mod tests {
  use config::{File, FileFormat};

  use super::*;

  fn from_toml(toml: &str) -> Settings {
    Settings::from_file_source(File::from_str(toml, FileFormat::Toml)).unwrap()
  }

  #[test]
  fn empty_file_gives_defaults() {
    let s = from_toml("");
    assert_eq!(s.batch_size, 10);
    assert_eq!(s.inter_request_delay_ms, 500);
    assert_eq!(s.inter_batch_delay_ms, 2000);
    assert_eq!(s.retry_budget, 2);
    assert_eq!(s.concurrency, 1);
    assert_eq!(s.variants, ["jpg", "jpeg", "png", "webp"]);
    assert!(s.only.is_empty());
    s.scan_config().validate().unwrap();
  }

  #[test]
  fn file_values_flow_into_scan_config() {
    let s = from_toml(
      r#"
      storage_base_url = "https://storage.example.com"
      batch_size = 15
      inter_request_delay_ms = 300
      inter_batch_delay_ms = 1500
      retry_backoff_ms = 100
      concurrency = 3
      variants = ["png"]
      only = ["independent", "club"]
      "#,
    );
    let scan = s.scan_config();
    assert_eq!(scan.batch_size, 15);
    assert_eq!(scan.inter_request_delay, Duration::from_millis(300));
    assert_eq!(scan.inter_batch_delay, Duration::from_millis(1500));
    assert_eq!(scan.retry.backoff, Duration::from_millis(100));
    assert_eq!(scan.concurrency, 3);
    assert_eq!(scan.variants, ["png"]);
    assert_eq!(s.only, [Category::Independent, Category::Club]);
    assert_eq!(s.storage_config().base_url, "https://storage.example.com");
  }

  #[test]
  fn missing_file_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let s = Settings::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(s.batch_size, 10);
  }

  #[test]
  fn unknown_category_is_rejected() {
    let result =
      Settings::from_file_source(File::from_str(r#"only = ["coach"]"#, FileFormat::Toml));
    assert!(result.is_err());
  }
}
