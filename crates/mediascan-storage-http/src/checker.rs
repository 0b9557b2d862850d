//! [`HttpExistenceChecker`] is the HTTP implementation of [`ExistenceChecker`].

use std::time::Duration;

use mediascan_core::{
  location::Location,
  storage::{Descriptor, ExistenceChecker, TransientError},
};
use reqwest::{Client, StatusCode, Url};
use tracing::trace;

use crate::{Error, Result};

const PUBLIC_OBJECT_PATH: [&str; 4] = ["storage", "v1", "object", "public"];

/// Connection settings for the storage backend.
#[derive(Debug, Clone)]
pub struct StorageConfig {
  pub base_url: String,
  /// Upper bound on a single `HEAD` request, connect included.
  pub timeout:  Duration,
}

/// Checks artifact existence with metadata-only `HEAD` requests.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct HttpExistenceChecker {
  client: Client,
  base:   Url,
}

impl HttpExistenceChecker {
  pub fn new(config: StorageConfig) -> Result<Self> {
    let invalid = |reason: String| Error::InvalidBaseUrl {
      url: config.base_url.clone(),
      reason,
    };
    let base = Url::parse(&config.base_url).map_err(|e| invalid(e.to_string()))?;
    if base.cannot_be_a_base() {
      return Err(invalid("URL cannot have path segments".into()));
    }

    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, base })
  }

  /// The public URL of `file` in `location`. Segments are percent-encoded.
  pub fn object_url(&self, location: &Location, file: &str) -> Url {
    let mut url = self.base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
      segments
        .pop_if_empty()
        .extend(PUBLIC_OBJECT_PATH)
        .extend([location.as_str(), file]);
    }
    url
  }
}

/// Map a `HEAD` response status onto an existence answer.
///
/// 2xx is present. 408, 429 and 5xx are transient. Any other status is a
/// definitive "not present".
pub fn classify_status(status: StatusCode) -> Result<bool, TransientError> {
  if status.is_success() {
    Ok(true)
  } else if status.is_server_error()
    || status == StatusCode::REQUEST_TIMEOUT
    || status == StatusCode::TOO_MANY_REQUESTS
  {
    Err(TransientError(format!("storage responded {status}")))
  } else {
    Ok(false)
  }
}

impl ExistenceChecker for HttpExistenceChecker {
  fn resolve_descriptor(
    &self,
    subject_id: &str,
    variant: &str,
    location: &Location,
  ) -> Descriptor {
    Descriptor::new(self.object_url(location, &format!("{subject_id}.{variant}")))
  }

  async fn exists(&self, descriptor: &Descriptor) -> Result<bool, TransientError> {
    let response = self
      .client
      .head(descriptor.as_str())
      .send()
      .await
      .map_err(|e| TransientError(format!("HEAD {descriptor} failed: {e}")))?;
    let status = response.status();
    trace!(%descriptor, %status, "existence check");
    classify_status(status)
  }
}

#[cfg(test)]
mod tests {
  use std::net::SocketAddr;

  use axum::{Router, extract::Path, http::StatusCode as AxumStatus, routing::get};
  use tokio::net::TcpListener;

  use super::*;

  fn checker(base_url: &str) -> HttpExistenceChecker {
    HttpExistenceChecker::new(StorageConfig {
      base_url: base_url.into(),
      timeout:  Duration::from_secs(5),
    })
    .unwrap()
  }

  #[test]
  fn descriptor_is_public_object_url() {
    let c = checker("https://storage.example.com/");
    let d = c.resolve_descriptor("abc123", "png", &Location::from("playerclub"));
    assert_eq!(
      d.as_str(),
      "https://storage.example.com/storage/v1/object/public/playerclub/abc123.png"
    );
  }

  #[test]
  fn descriptor_keeps_base_path_and_encodes_ids() {
    let c = checker("https://example.com/proxy");
    let d = c.resolve_descriptor("a b/c", "jpg", &Location::from("avatars"));
    assert_eq!(
      d.as_str(),
      "https://example.com/proxy/storage/v1/object/public/avatars/a%20b%2Fc.jpg"
    );
  }

  #[test]
  fn invalid_base_url_is_rejected() {
    let err = HttpExistenceChecker::new(StorageConfig {
      base_url: "not a url".into(),
      timeout:  Duration::from_secs(1),
    })
    .unwrap_err();
    assert!(matches!(err, Error::InvalidBaseUrl { .. }));

    assert!(
      HttpExistenceChecker::new(StorageConfig {
        base_url: "mailto:ops@example.com".into(),
        timeout:  Duration::from_secs(1),
      })
      .is_err()
    );
  }

  #[test]
  fn status_classification() {
    assert!(classify_status(StatusCode::OK).unwrap());
    assert!(classify_status(StatusCode::NO_CONTENT).unwrap());
    assert!(!classify_status(StatusCode::NOT_FOUND).unwrap());
    assert!(!classify_status(StatusCode::BAD_REQUEST).unwrap());
    assert!(!classify_status(StatusCode::FORBIDDEN).unwrap());
    assert!(classify_status(StatusCode::TOO_MANY_REQUESTS).is_err());
    assert!(classify_status(StatusCode::REQUEST_TIMEOUT).is_err());
    assert!(classify_status(StatusCode::SERVICE_UNAVAILABLE).is_err());
    assert!(classify_status(StatusCode::INTERNAL_SERVER_ERROR).is_err());
  }

  async fn object(Path((bucket, file)): Path<(String, String)>) -> AxumStatus {
    match (bucket.as_str(), file.as_str()) {
      ("playerclub", "p1.jpg") => AxumStatus::OK,
      ("playeragent", _) => AxumStatus::SERVICE_UNAVAILABLE,
      _ => AxumStatus::NOT_FOUND,
    }
  }

  async fn serve() -> SocketAddr {
    let app = Router::new().route("/storage/v1/object/public/{bucket}/{file}", get(object));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    addr
  }

  #[tokio::test]
  async fn head_requests_against_live_server() {
    let addr = serve().await;
    let c = checker(&format!("http://{addr}"));

    let present = c.resolve_descriptor("p1", "jpg", &Location::from("playerclub"));
    assert!(c.exists(&present).await.unwrap());

    let missing = c.resolve_descriptor("p1", "png", &Location::from("playerclub"));
    assert!(!c.exists(&missing).await.unwrap());

    let flaky = c.resolve_descriptor("p1", "jpg", &Location::from("playeragent"));
    assert!(c.exists(&flaky).await.is_err());
  }

  #[tokio::test]
  async fn connection_failure_is_transient() {
    // Bind then drop to get a port with nothing listening.
    let addr = TcpListener::bind("127.0.0.1:0")
      .await
      .unwrap()
      .local_addr()
      .unwrap();
    let c = checker(&format!("http://{addr}"));
    let d = c.resolve_descriptor("p1", "jpg", &Location::from("avatars"));
    assert!(c.exists(&d).await.is_err());
  }
}
