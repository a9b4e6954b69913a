//! Decoding of Bing's `/ck/a` click-tracking links.
//!
//! Result links often point at `https://www.bing.com/ck/a?...&u=a1<b64>`
//! where `u` is a two character scheme tag followed by the destination URL
//! as unpadded base64url.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;

use crate::{BingError, Result};

/// Prefix of every click-tracking link.
pub const REDIRECT_PREFIX: &str = "https://www.bing.com/ck/a?";

/// Length of the scheme tag in front of the encoded destination.
const SCHEME_TAG_LEN: usize = 2;

/// Whether `url` is a click-tracking link that needs decoding.
pub fn is_redirect(url: &str) -> bool {
    url.starts_with(REDIRECT_PREFIX)
}

/// Returns the destination of `href`, decoding it when it is a redirect.
pub fn resolve_url(href: &str) -> Result<String> {
    if is_redirect(href) {
        decode_redirect(href)
    } else {
        Ok(href.to_string())
    }
}

/// Decodes a click-tracking link into its destination URL.
///
/// Never falls back to the wrapper: any malformed step is an error.
pub fn decode_redirect(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url)?;
    let param_u = parsed
        .query_pairs()
        .find(|(key, _)| key == "u")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| BingError::RedirectDecode("missing u parameter".into()))?;

    let encoded = param_u.get(SCHEME_TAG_LEN..).unwrap_or_default();
    if encoded.is_empty() {
        return Err(BingError::RedirectDecode(format!(
            "u parameter too short: {:?}",
            param_u
        )));
    }

    let mut padded = encoded.to_string();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }

    let bytes = URL_SAFE
        .decode(padded.as_bytes())
        .map_err(|e| BingError::RedirectDecode(format!("invalid base64: {}", e)))?;
    let destination = String::from_utf8(bytes)
        .map_err(|e| BingError::RedirectDecode(format!("invalid UTF-8: {}", e)))?;

    url::Url::parse(&destination).map_err(|e| {
        BingError::RedirectDecode(format!("not an absolute URL {:?}: {}", destination, e))
    })?;
    Ok(destination)
}

/// Wraps `destination` the way Bing does (`a1` + unpadded base64url).
///
/// Returns only the `u` parameter value.
pub fn encode_redirect_param(destination: &str) -> String {
    let encoded = URL_SAFE.encode(destination.as_bytes());
    format!("a1{}", encoded.trim_end_matches('='))
}
