//! URL handling module for Lecture-Harvester
//!
//! This module provides the small set of URL operations the crawl needs:
//! building paginated listing URLs, recognising target-page links and
//! resolving them against the site origin.

use url::Url;

/// Name of the query parameter carrying the pagination offset
pub const INDEX_PARAM: &str = "index";

/// Builds the listing URL for a given pagination offset
///
/// The root URL keeps its existing query; `index=<n>` is appended.
///
/// # Examples
///
/// ```
/// use lecture_harvester::url::listing_page_url;
/// use url::Url;
///
/// let root = Url::parse("http://example.com/search?type=audio").unwrap();
/// let page = listing_page_url(&root, 20);
/// assert_eq!(page.as_str(), "http://example.com/search?type=audio&index=20");
/// ```
pub fn listing_page_url(root: &Url, index: usize) -> Url {
    let mut url = root.clone();
    url.query_pairs_mut()
        .append_pair(INDEX_PARAM, &index.to_string());
    url
}

/// Returns true if a raw listing href points at a target page
pub fn is_target_link(href: &str, prefix: &str) -> bool {
    href.starts_with(prefix)
}

/// Resolves a site-relative target href to an absolute URL
///
/// Returns None if the href cannot be joined onto the site base.
pub fn resolve_target(site_base: &Url, href: &str) -> Option<Url> {
    site_base.join(href).ok()
}

/// Returns the well-known robots.txt location for a site
pub fn robots_url(site_base: &Url) -> Result<Url, url::ParseError> {
    site_base.join("/robots.txt")
}

/// Extracts the product token of a User-Agent header value
///
/// robots.txt groups are matched on the product token only, so
/// `"Morzina/1.0 (+https://example.org)"` matches `User-agent: Morzina`.
pub fn product_token(user_agent: &str) -> &str {
    let trimmed = user_agent.trim();
    let end = trimmed
        .find(|c: char| c == '/' || c.is_whitespace())
        .unwrap_or(trimmed.len());
    &trimmed[..end]
}
