use url::Url;

/// Returns the lower-cased network location of `url` (host, plus `:port` when the
/// URL names a non-default one). Anything that does not parse as an absolute URL
/// with a host yields an empty string, which scoring treats as an unknown source.
pub fn domain_from_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return String::new();
    };
    let Some(host) = parsed.host_str() else {
        return String::new();
    };
    let host = host.to_lowercase();
    match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host,
    }
}
