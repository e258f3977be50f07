use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves a link href against the site base URL
///
/// Absolute hrefs are returned as-is (after parsing), relative hrefs are
/// joined onto `base`.
///
/// # Errors
///
/// - [`UrlError::Empty`] for empty or whitespace-only hrefs
/// - [`UrlError::NotFetchable`] for `javascript:`, `mailto:`, `tel:`, `data:`
///   and fragment-only hrefs
/// - [`UrlError::Parse`] if the href cannot be joined onto the base
/// - [`UrlError::InvalidScheme`] if the result is not HTTP(S)
///
/// # Example
///
/// ```
/// use catalog_harvest::url::resolve_url;
/// use url::Url;
///
/// let base = Url::parse("https://example.com").unwrap();
/// let url = resolve_url(&base, "/downloads/some-track/").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/downloads/some-track/");
/// ```
pub fn resolve_url(base: &Url, href: &str) -> UrlResult<Url> {
    let href = href.trim();

    if href.is_empty() {
        return Err(UrlError::Empty);
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
        || href.starts_with('#')
    {
        return Err(UrlError::NotFetchable(href.to_string()));
    }

    let resolved = base
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    match resolved.scheme() {
        "http" | "https" => Ok(resolved),
        other => Err(UrlError::InvalidScheme(other.to_string())),
    }
}

/// Resolves an href to its absolute string form, or returns an empty string
///
/// Used for record fields, where an unresolvable link is a soft miss rather
/// than an error.
pub fn resolve_or_empty(base: &Url, href: &str) -> String {
    resolve_url(base, href)
        .map(|url| url.to_string())
        .unwrap_or_default()
}
