//! Source-string normalization for manifest keys.
//!
//! The same logical asset reaches the pipeline under many spellings: a bare
//! relative path, a `./`-prefixed path, an absolute URL, a CDN-prefixed path,
//! percent-encoded or decoded, with or without a query string. All of them
//! must collapse to one canonical key so the build stage and the runtime
//! resolver agree on identity.
//!
//! A key is the substring starting at `assets/images/` with POSIX separators,
//! decoded percent-escapes, and no query/hash or scheme/host prefix:
//!
//! ```text
//! https://cdn.example/site/assets/images/a%20b.jpg?v=2  →  assets/images/a b.jpg
//! ./assets/images/a b.jpg#frag                          →  assets/images/a b.jpg
//! assets\images\a b.jpg                                 →  assets/images/a b.jpg
//! ```
//!
//! Decoding is best-effort: a malformed escape keeps the string as-is rather
//! than failing, so a broken path degrades to a lookup miss instead of an
//! aborted rewrite.

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use url::Url;

/// Directory marker that anchors every manifest key.
const KEY_MARKER: &str = "assets/images/";

/// Characters escaped in web-servable asset paths.
///
/// Alphanumerics and the URI reserved set (`;,/?:@&=+$-_.!~*'()#`) pass
/// through untouched; space, quotes, brackets, control bytes, `%`, and all
/// non-ASCII are percent-encoded. Matches what browsers accept verbatim in
/// `src`/`srcset` attributes.
const ASSET_PATH_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Canonicalize an arbitrary image-source string into a manifest key.
///
/// Returns the empty string when the input is blank. Idempotent for every
/// spelling the site can produce: feeding a key back in returns it unchanged.
pub fn normalize_source(source: &str) -> String {
    let trimmed = source.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut cleaned = trimmed.to_string();

    // Absolute URLs are reduced to their path component. Unparseable ones
    // fall through with the original string, like every other malformed form.
    let lower = cleaned.to_ascii_lowercase();
    if (lower.starts_with("http://") || lower.starts_with("https://"))
        && let Ok(parsed) = Url::parse(&cleaned)
    {
        let path = parsed.path();
        if !path.is_empty() {
            cleaned = path.to_string();
        }
    }

    // Query string and fragment never participate in identity.
    if let Some(cut) = cleaned.find(['?', '#']) {
        cleaned.truncate(cut);
    }

    // Best-effort decode: malformed escapes keep the encoded spelling.
    if let Ok(decoded) = percent_decode_str(&cleaned).decode_utf8() {
        cleaned = decoded.into_owned();
    }

    cleaned = cleaned.replace('\\', "/");
    if let Some(rest) = cleaned.strip_prefix("./") {
        cleaned = rest.to_string();
    }

    // Discard any site/CDN prefix before the canonical root. The marker
    // search is ASCII case-insensitive, so byte offsets line up.
    let lower = cleaned.to_ascii_lowercase();
    if let Some(idx) = lower.find(KEY_MARKER) {
        cleaned = cleaned[idx..].to_string();
    }

    cleaned.trim_start_matches('/').to_string()
}

/// Percent-encode a POSIX path for embedding in HTML or the manifest.
///
/// The inverse-ish of the decode step in [`normalize_source`]: keys store the
/// decoded spelling, `src` values store this encoded one.
pub fn encode_asset_path(path: &str) -> String {
    utf8_percent_encode(path, ASSET_PATH_SET).to_string()
}
