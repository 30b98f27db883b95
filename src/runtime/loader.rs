//! Manifest fetching, memoization, and lookup.
//!
//! The manifest is optional by design: a site that never ran the build tool
//! must keep working untouched. Everything here is therefore fail-open —
//! network failures, non-success statuses, and malformed payloads all come
//! back as `None`, and the caller keeps the original image sources. No error
//! type crosses this API.
//!
//! Fetching happens at most once per loader lifetime. The result (including
//! a failed result) is memoized in a [`OnceLock`]: concurrent first callers
//! block on a single in-flight fetch, later callers get the cached handle,
//! and nothing ever invalidates or refreshes it. There is deliberately no
//! timeout beyond the transport's own — a hung request just means affected
//! images keep their unoptimized sources.

use crate::manifest::{ManifestEntry, ManifestImages, parse_runtime_payload};
use crate::normalize::{encode_asset_path, normalize_source};
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Site-relative location the build stage publishes the manifest to.
pub const DEFAULT_MANIFEST_PATH: &str = "assets/images/optimized/manifest.json";

#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Raw result of one manifest GET.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The seam between the loader and the network.
///
/// `Err` means the transport itself failed (unreachable host, refused
/// connection); an HTTP error status is a successful fetch with a
/// non-success code. The loader treats both the same way.
pub trait ManifestTransport: Sync {
    fn fetch(&self, url: &str) -> Result<TransportResponse, TransportError>;
}

/// HTTP transport via reqwest's blocking client.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestTransport for HttpTransport {
    fn fetch(&self, url: &str) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| TransportError(e.to_string()))?
            .to_vec();
        Ok(TransportResponse { status, body })
    }
}

/// Fetch-once accessor for the manifest lookup table.
///
/// One loader per page/process lifetime; the memoized handle is shared by
/// every caller via `Arc`.
pub struct ManifestLoader<T: ManifestTransport> {
    transport: T,
    url: String,
    cell: OnceLock<Option<Arc<ManifestImages>>>,
}

impl<T: ManifestTransport> ManifestLoader<T> {
    pub fn new(transport: T, url: impl Into<String>) -> Self {
        Self {
            transport,
            url: url.into(),
            cell: OnceLock::new(),
        }
    }

    /// The parsed lookup table, fetching on first call.
    ///
    /// `None` means "optimization unavailable" — absent file, bad status,
    /// unparseable payload, or wrong shape — and is itself memoized, so a
    /// missing manifest costs exactly one request per page load.
    pub fn images(&self) -> Option<Arc<ManifestImages>> {
        self.cell.get_or_init(|| self.fetch_images()).clone()
    }

    fn fetch_images(&self) -> Option<Arc<ManifestImages>> {
        let response = self.transport.fetch(&self.url).ok()?;
        if !response.is_success() {
            return None;
        }
        let payload: Value = serde_json::from_slice(&response.body).ok()?;
        parse_runtime_payload(&payload).map(Arc::new)
    }
}

/// Look up the manifest entry for an arbitrary source string.
///
/// Tries the normalized (decoded) key first, then its URI-encoded form —
/// manifests may store either spelling depending on how the source path was
/// recorded. A miss is not an error; the caller keeps the original markup.
pub fn resolve_entry<'a>(images: &'a ManifestImages, source: &str) -> Option<&'a ManifestEntry> {
    let key = normalize_source(source);
    if key.is_empty() {
        return None;
    }
    if let Some(entry) = images.get(&key) {
        return Some(entry);
    }
    let encoded = encode_asset_path(&key);
    if encoded != key { images.get(&encoded) } else { None }
}
