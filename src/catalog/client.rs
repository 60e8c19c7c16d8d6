use chrono::Utc;
use color_eyre::Result;
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::{debug, warn};

use crate::config::{CatalogConfig, Credentials};
use crate::error::CatalogError;

use super::api_types::{ApiAssociated, ApiEntity, ApiEntityDetail, ApiEnvelope, Page, ResultSet};
use super::signer::RequestSigner;

/// Page size sent with every request.
pub const PAGE_SIZE: u64 = 100;

/// The three catalog endpoints the engine reads from.
///
/// `CatalogClient` talks to the real API; tests substitute a scripted fake.
pub trait CatalogApi {
  fn list_entities(&self, offset: u64) -> impl Future<Output = Result<Page<ApiEntity>>>;

  fn get_entity(&self, id: i64) -> impl Future<Output = Result<ResultSet<ApiEntityDetail>>>;

  fn list_associated(
    &self,
    id: i64,
    offset: u64,
  ) -> impl Future<Output = Result<Page<ApiAssociated>>>;
}

/// Authenticated catalog API client
#[derive(Clone)]
pub struct CatalogClient {
  http: reqwest::Client,
  base_url: String,
  entity_path: String,
  associated_path: String,
  signer: RequestSigner,
}

impl CatalogClient {
  pub fn new(config: &CatalogConfig, credentials: Credentials) -> Self {
    Self {
      http: reqwest::Client::new(),
      base_url: config.url.trim_end_matches('/').to_string(),
      entity_path: config.entity_path.trim_matches('/').to_string(),
      associated_path: config.associated_path.trim_matches('/').to_string(),
      signer: RequestSigner::new(credentials),
    }
  }

  /// Signed GET against `{base}/{endpoint}`, returning the `data` payload.
  async fn call<D: DeserializeOwned>(&self, endpoint: &str, offset: u64) -> Result<D> {
    let ts = Utc::now().timestamp_millis().to_string();
    let hash = self.signer.sign(&ts);
    let url = format!("{}/{}", self.base_url, endpoint);

    debug!(endpoint, offset, "Calling catalog API");

    let response = self
      .http
      .get(&url)
      .query(&[
        ("offset", offset.to_string()),
        ("limit", PAGE_SIZE.to_string()),
        ("ts", ts),
        ("hash", hash),
        ("apikey", self.signer.public_key().to_string()),
      ])
      .send()
      .await
      .map_err(CatalogError::from)?;

    let status = response.status();
    let body = response.text().await.map_err(CatalogError::from)?;

    if !status.is_success() {
      warn!(endpoint, status = status.as_u16(), "Catalog API call failed");
      return Err(
        CatalogError::RemoteApi {
          status: status.as_u16(),
          body,
        }
        .into(),
      );
    }

    let envelope: ApiEnvelope<D> = serde_json::from_str(&body).map_err(CatalogError::from)?;
    Ok(envelope.data)
  }
}

impl CatalogApi for CatalogClient {
  async fn list_entities(&self, offset: u64) -> Result<Page<ApiEntity>> {
    self.call(&self.entity_path, offset).await
  }

  async fn get_entity(&self, id: i64) -> Result<ResultSet<ApiEntityDetail>> {
    let endpoint = format!("{}/{}", self.entity_path, id);
    self.call(&endpoint, 0).await
  }

  async fn list_associated(&self, id: i64, offset: u64) -> Result<Page<ApiAssociated>> {
    let endpoint = format!("{}/{}/{}", self.entity_path, id, self.associated_path);
    self.call(&endpoint, offset).await
  }
}
