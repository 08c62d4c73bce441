//! Robots.txt handling module
//!
//! This module provides the crawl-exclusion check: a single allow/deny
//! answer per URL, backed by the site's robots.txt.

mod parser;

pub use parser::RobotsPolicy;

/// Answers whether a URL may be fetched
///
/// Checks are synchronous; any document behind the policy is loaded
/// before the crawl starts.
pub trait ExclusionPolicy {
    fn allowed(&self, user_agent: &str, url: &str) -> bool;
}

impl<P: ExclusionPolicy + ?Sized> ExclusionPolicy for &P {
    fn allowed(&self, user_agent: &str, url: &str) -> bool {
        (**self).allowed(user_agent, url)
    }
}
