//! `X-Hub-Signature-256` verification for webhook deliveries.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::common::error::{ChannelError, ChannelResult};

type HmacSha256 = Hmac<Sha256>;

const PREFIX: &str = "sha256=";

/// Check `header` (`sha256=<hex>`) against the HMAC-SHA256 of `body`.
pub fn verify_signature(app_secret: &str, body: &[u8], header: Option<&str>) -> ChannelResult<()> {
    let expected = header
        .and_then(|h| h.trim().strip_prefix(PREFIX))
        .and_then(|digest| hex::decode(digest).ok())
        .ok_or(ChannelError::BadSignature)?;

    let mut mac =
        HmacSha256::new_from_slice(app_secret.as_bytes()).map_err(|_| ChannelError::BadSignature)?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| ChannelError::BadSignature)
}
