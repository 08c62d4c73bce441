//! Paginated listing discovery
//!
//! The listing endpoint is paged with an `index` query parameter holding the
//! number of target links already returned. Pages are fetched lazily: the
//! next listing page is requested only once every link of the previous one
//! has been handed out, and the sequence ends at the first page that holds
//! no target link.

use crate::crawler::Fetcher;
use crate::robots::ExclusionPolicy;
use crate::url::{is_target_link, listing_page_url, resolve_target};
use crate::HarvestError;
use scraper::{Html, Selector};
use std::collections::VecDeque;
use url::Url;

/// Lazily yields target page URLs from a paginated listing
#[derive(Debug)]
pub struct PageEnumerator {
    root: Url,
    site_base: Url,
    link_prefix: String,

    /// Target links yielded so far; the `index` of the next listing page
    index: usize,
    pending: VecDeque<Url>,
    done: bool,
    root_checked: Option<bool>,
}

impl PageEnumerator {
    pub fn new(root: Url, site_base: Url, link_prefix: impl Into<String>) -> Self {
        Self {
            root,
            site_base,
            link_prefix: link_prefix.into(),
            index: 0,
            pending: VecDeque::new(),
            done: false,
            root_checked: None,
        }
    }

    /// Checks the root URL against the exclusion policy
    ///
    /// Only the first call consults the policy; later calls return the
    /// first answer. A denial is logged and enumeration still proceeds,
    /// since every target page is checked on its own.
    pub fn check_root<P>(&mut self, policy: &P, user_agent: &str) -> bool
    where
        P: ExclusionPolicy + ?Sized,
    {
        if let Some(allowed) = self.root_checked {
            return allowed;
        }

        let allowed = policy.allowed(user_agent, self.root.as_str());
        if !allowed {
            tracing::warn!(
                "Root URL {} is disallowed by robots.txt, continuing with per-page checks",
                self.root
            );
        }
        self.root_checked = Some(allowed);
        allowed
    }

    /// Returns the next target URL, fetching listing pages as needed
    ///
    /// Returns `Ok(None)` once a listing page yields no target link; the
    /// enumerator stays exhausted afterwards.
    pub async fn next_url<F>(&mut self, fetcher: &F) -> Result<Option<Url>, HarvestError>
    where
        F: Fetcher + ?Sized,
    {
        while self.pending.is_empty() {
            if self.done {
                return Ok(None);
            }
            self.fetch_listing(fetcher).await?;
        }

        Ok(self.pending.pop_front())
    }

    /// Number of target links discovered so far
    pub fn discovered(&self) -> usize {
        self.index
    }

    pub fn is_done(&self) -> bool {
        self.done && self.pending.is_empty()
    }

    async fn fetch_listing<F>(&mut self, fetcher: &F) -> Result<(), HarvestError>
    where
        F: Fetcher + ?Sized,
    {
        let page_url = listing_page_url(&self.root, self.index);
        tracing::debug!("Fetching listing page {}", page_url);

        let body = fetcher.fetch(page_url.as_str()).await?;
        let links = extract_listing_links(&body, &self.link_prefix, &self.site_base);

        if links.is_empty() {
            tracing::info!("Listing exhausted after {} target links", self.index);
            self.done = true;
            return Ok(());
        }

        tracing::debug!("Listing page {} yielded {} links", page_url, links.len());
        self.index += links.len();
        self.pending.extend(links);
        Ok(())
    }
}

/// Extracts target links from a listing page, in document order
///
/// An anchor is a target when its raw `href` starts with `prefix`; it is
/// then resolved against `site_base`. Hrefs that cannot be resolved are
/// dropped.
///
/// # Example
///
/// ```
/// use lecture_harvester::crawler::extract_listing_links;
/// use url::Url;
///
/// let html = r#"<a href="/site/a.htm">a</a><a href="/other/b.htm">b</a>"#;
/// let base = Url::parse("http://example.com").unwrap();
/// let links = extract_listing_links(html, "/site/", &base);
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].as_str(), "http://example.com/site/a.htm");
/// ```
pub fn extract_listing_links(html: &str, prefix: &str, site_base: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if !is_target_link(href, prefix) {
                continue;
            }

            match resolve_target(site_base, href) {
                Some(url) => links.push(url),
                None => tracing::debug!("Dropping unresolvable link {}", href),
            }
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const SITE: &str = "http://www.college-de-france.fr";
    const ROOT: &str = "http://www.college-de-france.fr/search?type=audio";

    /// Serves listing pages in order and records requested URLs
    struct ListingFetcher {
        pages: Mutex<VecDeque<String>>,
        requested: Mutex<Vec<String>>,
    }

    impl ListingFetcher {
        fn new(pages: &[&str]) -> Self {
            Self {
                pages: Mutex::new(pages.iter().map(|p| p.to_string()).collect()),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for ListingFetcher {
        async fn fetch(&self, url: &str) -> Result<String, HarvestError> {
            self.requested.lock().unwrap().push(url.to_string());
            Ok(self.pages.lock().unwrap().pop_front().unwrap_or_default())
        }
    }

    struct DenyAll;

    impl ExclusionPolicy for DenyAll {
        fn allowed(&self, _user_agent: &str, _url: &str) -> bool {
            false
        }
    }

    fn enumerator() -> PageEnumerator {
        PageEnumerator::new(
            Url::parse(ROOT).unwrap(),
            Url::parse(SITE).unwrap(),
            "/site/",
        )
    }

    async fn collect(enumerator: &mut PageEnumerator, fetcher: &ListingFetcher) -> Vec<String> {
        let mut urls = Vec::new();
        while let Some(url) = enumerator.next_url(fetcher).await.unwrap() {
            urls.push(url.to_string());
        }
        urls
    }

    #[tokio::test]
    async fn test_filters_prefix_and_stops_on_empty_page() {
        let fetcher = ListingFetcher::new(&[
            r#"<body><a href="/site/url1"></a><a href="/not/a/good/url"></a><a href="/site/url2"></a></body>"#,
            "<body></body>",
        ]);
        let mut enumerator = enumerator();

        let urls = collect(&mut enumerator, &fetcher).await;

        assert_eq!(
            urls,
            vec![
                "http://www.college-de-france.fr/site/url1",
                "http://www.college-de-france.fr/site/url2",
            ]
        );
        assert_eq!(fetcher.requested().len(), 2);
        assert!(enumerator.is_done());
    }

    #[tokio::test]
    async fn test_index_is_cumulative_link_count() {
        let fetcher = ListingFetcher::new(&[
            r#"<a href="/site/a"></a><a href="/site/b"></a><a href="/site/c"></a>"#,
            r#"<a href="/site/d"></a><a href="/other"></a>"#,
            "",
        ]);
        let mut enumerator = enumerator();

        let urls = collect(&mut enumerator, &fetcher).await;

        assert_eq!(urls.len(), 4);
        assert_eq!(enumerator.discovered(), 4);
        assert_eq!(
            fetcher.requested(),
            vec![
                format!("{}&index=0", ROOT),
                format!("{}&index=3", ROOT),
                format!("{}&index=4", ROOT),
            ]
        );
    }

    #[tokio::test]
    async fn test_next_page_fetched_only_when_buffer_drained() {
        let fetcher = ListingFetcher::new(&[
            r#"<a href="/site/a"></a><a href="/site/b"></a>"#,
            "",
        ]);
        let mut enumerator = enumerator();

        enumerator.next_url(&fetcher).await.unwrap();
        enumerator.next_url(&fetcher).await.unwrap();
        assert_eq!(fetcher.requested().len(), 1);

        assert!(enumerator.next_url(&fetcher).await.unwrap().is_none());
        assert_eq!(fetcher.requested().len(), 2);

        // Exhausted enumerators do not fetch again
        assert!(enumerator.next_url(&fetcher).await.unwrap().is_none());
        assert_eq!(fetcher.requested().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_first_page_yields_nothing() {
        let fetcher = ListingFetcher::new(&["<p>no results</p>"]);
        let mut enumerator = enumerator();

        assert!(collect(&mut enumerator, &fetcher).await.is_empty());
        assert_eq!(fetcher.requested().len(), 1);
    }

    #[test]
    fn test_root_check_runs_once() {
        let mut enumerator = enumerator();
        assert!(!enumerator.check_root(&DenyAll, "TestBot"));

        let allow = crate::robots::RobotsPolicy::allow_all();
        // The first answer sticks
        assert!(!enumerator.check_root(&allow, "TestBot"));
    }

    #[test]
    fn test_prefix_matches_raw_href_only() {
        let base = Url::parse(SITE).unwrap();
        let html = r#"
            <a href="http://www.college-de-france.fr/site/absolute.htm"></a>
            <a href="/site/relative.htm"></a>
            <a>no href</a>
        "#;
        let links = extract_listing_links(html, "/site/", &base);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].path(), "/site/relative.htm");
    }
}
