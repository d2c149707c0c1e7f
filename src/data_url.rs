//! `data:<mime>;base64,<payload>` strings, the form in which screenshots
//! cross the native boundary and in which exports leave the rasterizer.

use base64::{engine::general_purpose, Engine as _};
use thiserror::Error;

pub const PNG_MIME: &str = "image/png";

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

#[derive(Error, Debug)]
pub enum DataUrlError {
    #[error("Not a data URL")]
    MissingScheme,
    #[error("Data URL is not base64 encoded")]
    NotBase64,
    #[error("Invalid base64 payload: {0}")]
    Payload(#[from] base64::DecodeError),
}

/// Wrap `bytes` into a base64 data URL of type `mime`.
pub fn encode(mime: &str, bytes: &[u8]) -> String {
    let payload = general_purpose::STANDARD.encode(bytes);
    format!("{SCHEME}{mime}{BASE64_MARKER}{payload}")
}

pub fn encode_png(bytes: &[u8]) -> String {
    encode(PNG_MIME, bytes)
}

/// The MIME type and the still-encoded payload, with the prefix stripped.
pub fn split(url: &str) -> Result<(&str, &str), DataUrlError> {
    let rest = url
        .trim()
        .strip_prefix(SCHEME)
        .ok_or(DataUrlError::MissingScheme)?;
    let (mime, payload) = rest
        .split_once(BASE64_MARKER)
        .ok_or(DataUrlError::NotBase64)?;
    Ok((mime, payload))
}

/// Strip the prefix and decode the payload to raw bytes.
pub fn decode(url: &str) -> Result<Vec<u8>, DataUrlError> {
    let (_, payload) = split(url)?;
    Ok(general_purpose::STANDARD.decode(payload)?)
}
