//! Referrer normalisation for analytics breakdowns.

use url::Url;

/// Source name used when no referrer was sent.
pub const DIRECT: &str = "direct";

/// Maps a raw referrer to the source name shown in breakdowns.
///
/// - missing or blank → `direct`
/// - parseable URL → its host, without a leading `www.`
/// - anything else → the trimmed input
pub fn referrer_source(referrer: Option<&str>) -> String {
    let Some(raw) = referrer.map(str::trim).filter(|r| !r.is_empty()) else {
        return DIRECT.to_string();
    };

    match Url::parse(raw) {
        Ok(url) => match url.host_str() {
            Some(host) if !host.is_empty() => {
                let host = host.to_ascii_lowercase();
                host.strip_prefix("www.").map(str::to_string).unwrap_or(host)
            }
            _ => raw.to_string(),
        },
        Err(_) => raw.to_string(),
    }
}
