//! Request signing required by the catalog API.

use md5::{Digest, Md5};

use crate::config::Credentials;

/// Produces the `hash` query parameter for a request timestamp.
///
/// The remote contract fixes the digest: MD5 over `ts || private || public`,
/// rendered as lowercase hex.
#[derive(Clone)]
pub struct RequestSigner {
  credentials: Credentials,
}

impl RequestSigner {
  pub fn new(credentials: Credentials) -> Self {
    Self { credentials }
  }

  pub fn public_key(&self) -> &str {
    &self.credentials.public_key
  }

  pub fn sign(&self, ts: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(ts.as_bytes());
    hasher.update(self.credentials.private_key.as_bytes());
    hasher.update(self.credentials.public_key.as_bytes());
    hex::encode(hasher.finalize())
  }
}
