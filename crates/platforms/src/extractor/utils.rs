use regex::Regex;
use url::Url;

#[inline]
pub fn capture_group_1<'a>(re: &Regex, input: &'a str) -> Option<&'a str> {
    re.captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Undo the escaping a URL picks up when embedded in HTML attributes or inline scripts.
pub fn unescape_embedded_url(url: &str) -> String {
    url.replace("&amp;", "&")
        .replace("\\u0026", "&")
        .replace("\\/", "/")
}

/// Canonicalize a watch URL.
///
/// Forces https, rewrites hosts listed in `host_rewrites` (mobile -> desktop),
/// drops the fragment and every query parameter not listed in `keep_params`.
pub fn normalize_watch_url(
    url: &str,
    host_rewrites: &[(&str, &str)],
    keep_params: &[&str],
) -> Option<String> {
    let cleaned = unescape_embedded_url(url.trim());
    let mut parsed = Url::parse(&cleaned).ok()?;

    if parsed.scheme() == "http" {
        parsed.set_scheme("https").ok()?;
    }

    let host = parsed.host_str()?.to_ascii_lowercase();
    if let Some((_, desktop)) = host_rewrites.iter().find(|(mobile, _)| *mobile == host) {
        parsed.set_host(Some(desktop)).ok()?;
    }

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| keep_params.contains(&key.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    parsed.set_query(None);
    parsed.set_fragment(None);
    if !kept.is_empty() {
        parsed.query_pairs_mut().extend_pairs(&kept);
    }

    Some(parsed.into())
}
