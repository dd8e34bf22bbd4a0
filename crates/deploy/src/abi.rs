//! Compact encoding for contract interface descriptions.
//!
//! An ABI is serialized to JSON, zlib-deflated and base64-encoded so it can be
//! carried around as a single opaque string.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use flate2::{Compression, read::ZlibDecoder, write::ZlibEncoder};
use serde::{Serialize, de::DeserializeOwned};

/// Compress an interface description into a base64 string.
pub fn compress_abi<T: Serialize + ?Sized>(abi: &T) -> Result<String> {
    let json = serde_json::to_vec(abi).context("Failed to serialize ABI to JSON")?;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&json)
        .context("Failed to deflate ABI")?;
    let deflated = encoder.finish().context("Failed to finish ABI deflate stream")?;

    Ok(STANDARD.encode(deflated))
}

/// Decompress a string produced by [`compress_abi`].
pub fn decompress_abi<T: DeserializeOwned>(encoded: &str) -> Result<T> {
    let deflated = STANDARD
        .decode(encoded.trim())
        .context("Compressed ABI is not valid base64")?;

    let mut json = String::new();
    ZlibDecoder::new(deflated.as_slice())
        .read_to_string(&mut json)
        .context("Failed to inflate compressed ABI")?;

    serde_json::from_str(&json).context("Inflated ABI is not valid JSON")
}
