//! Remote source retrieval with content digests for change detection.

use log::debug;
use md5::Md5;
use sha2::{Digest, Sha512};

use crate::error_handling::PipelineError;

/// A fetched remote source: raw bytes plus the digest pair used purely for
/// equality comparison against the previous run. Not a security boundary.
#[derive(Debug, Clone)]
pub struct FetchedSource {
    pub bytes: Vec<u8>,
    /// Fast weak digest, lowercase hex.
    pub md5: String,
    /// Strong digest, lowercase hex.
    pub sha512: String,
}

/// Fetches a source URL and computes its content digests.
///
/// One GET, single attempt; any transport error propagates and is fatal for
/// the run. Retry policy, if any, belongs to the caller.
///
/// # Errors
///
/// Returns `PipelineError::Transport` if the request fails or the body
/// cannot be read.
pub async fn fetch_source(
    client: &reqwest::Client,
    url: &str,
) -> Result<FetchedSource, PipelineError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| PipelineError::Transport {
            url: url.to_string(),
            source,
        })?;
    let bytes = response
        .bytes()
        .await
        .map_err(|source| PipelineError::Transport {
            url: url.to_string(),
            source,
        })?
        .to_vec();

    let md5 = hex_string(&Md5::digest(&bytes));
    let sha512 = hex_string(&Sha512::digest(&bytes));
    debug!("fetched {} ({} bytes, md5 {})", url, bytes.len(), md5);

    Ok(FetchedSource { bytes, md5, sha512 })
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
