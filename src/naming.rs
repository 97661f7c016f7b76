//! Source URL parsing and local name derivation
//!
//! A transfer is named after the URL it came from: the MD5 digest of the URL
//! text followed by the final path segment, e.g.
//! `https://example.com/img/cat.png` becomes `<md5>-cat.png`. The same URL
//! always produces the same name, so repeated submissions overwrite rather
//! than accumulate.

use crate::error::{FetchError, Result};
use url::Url;

/// Characters that may not survive into a file name
const PATH_SEPARATORS: [char; 2] = ['/', '\\'];

/// Trim and validate a submitted image URL
///
/// Only absolute `http` and `https` URLs are accepted.
///
/// # Examples
///
/// ```
/// use image_relay::naming::parse_source_url;
///
/// let url = parse_source_url("  https://example.com/img/cat.png\n").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/img/cat.png");
/// assert!(parse_source_url("ftp://example.com/cat.png").is_err());
/// ```
pub fn parse_source_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid(trimmed, "no image URL was provided"));
    }

    let url = Url::parse(trimmed).map_err(|e| invalid(trimmed, &e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(trimmed, &format!("unsupported scheme '{other}'"))),
    }
    if url.host_str().is_none() {
        return Err(invalid(trimmed, "URL has no host"));
    }

    Ok(url)
}

fn invalid(url: &str, reason: &str) -> crate::error::Error {
    FetchError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

/// Derive the deterministic local name for a source URL
///
/// The result is `hex(md5(url)) + "-" + basename`, where `basename` is the
/// percent-decoded final path segment. When the path has no final segment the
/// name is the digest alone. Separators produced by decoding are replaced
/// with `_`.
///
/// # Examples
///
/// ```
/// use image_relay::naming::derive_local_name;
///
/// let name = derive_local_name("https://example.com/img/cat.png");
/// assert!(name.ends_with("-cat.png"));
/// assert_eq!(name, derive_local_name("https://example.com/img/cat.png"));
/// ```
pub fn derive_local_name(source_url: &str) -> String {
    let source_url = source_url.trim();
    let digest = format!("{:x}", md5::compute(source_url.as_bytes()));

    match basename(source_url) {
        Some(base) => format!("{digest}-{base}"),
        None => digest,
    }
}

/// Final path segment of a URL, percent-decoded and made filesystem-safe
fn basename(source_url: &str) -> Option<String> {
    let segment = match Url::parse(source_url) {
        Ok(url) => url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_string),
        // Unparsable input still gets a stable name
        Err(_) => source_url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .map(str::to_string),
    }?;

    if segment.is_empty() {
        return None;
    }

    let decoded = match urlencoding::decode(&segment) {
        Ok(text) => text.into_owned(),
        Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(segment.as_bytes()))
            .into_owned(),
    };

    let safe: String = decoded
        .chars()
        .map(|c| if PATH_SEPARATORS.contains(&c) { '_' } else { c })
        .collect();

    (!safe.is_empty()).then_some(safe)
}
