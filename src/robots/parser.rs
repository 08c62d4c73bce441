//! Robots.txt policy implementation
//!
//! This module provides matching of URLs against robots.txt content using
//! the robotstxt crate.

use crate::crawler::Fetcher;
use crate::robots::ExclusionPolicy;
use crate::url::product_token;
use crate::HarvestError;
use robotstxt::DefaultMatcher;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Rules {
    AllowAll,
    DenyAll,
    Content(String),
}

/// A site's robots.txt, fetched once per run
///
/// This is a wrapper around the robotstxt crate's matcher, providing a
/// simplified interface for checking if URLs are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotsPolicy {
    rules: Rules,
}

impl RobotsPolicy {
    /// Creates a policy from raw robots.txt content
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    pub fn from_content(content: &str) -> Self {
        Self {
            rules: Rules::Content(content.to_string()),
        }
    }

    /// Creates a permissive policy that allows everything
    ///
    /// This is what a site without a robots.txt gets.
    pub fn allow_all() -> Self {
        Self {
            rules: Rules::AllowAll,
        }
    }

    /// Creates a policy that refuses every URL
    pub fn deny_all() -> Self {
        Self {
            rules: Rules::DenyAll,
        }
    }

    /// Fetches and parses robots.txt
    ///
    /// | Response | Policy |
    /// |----------|--------|
    /// | 2xx | parsed content |
    /// | 401, 403 | deny all |
    /// | other 4xx | allow all |
    /// | 5xx, transport failure | error |
    pub async fn load<F>(fetcher: &F, robots_url: &str) -> Result<Self, HarvestError>
    where
        F: Fetcher + ?Sized,
    {
        match fetcher.fetch(robots_url).await {
            Ok(content) => {
                tracing::debug!("Loaded robots.txt from {} ({} bytes)", robots_url, content.len());
                Ok(Self::from_content(&content))
            }
            Err(HarvestError::HttpStatus { status, .. }) if status == 401 || status == 403 => {
                tracing::warn!("robots.txt at {} returned {}, denying all", robots_url, status);
                Ok(Self::deny_all())
            }
            Err(HarvestError::HttpStatus { status, .. }) if (400..500).contains(&status) => {
                tracing::info!("No robots.txt at {} ({}), allowing all", robots_url, status);
                Ok(Self::allow_all())
            }
            Err(e) => Err(e),
        }
    }

    /// Returns the raw robots.txt content, if any was parsed
    pub fn content(&self) -> Option<&str> {
        match &self.rules {
            Rules::Content(content) => Some(content),
            _ => None,
        }
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL to check
    /// * `user_agent` - The full user agent string; only its product token is matched
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        match &self.rules {
            Rules::AllowAll => true,
            Rules::DenyAll => false,
            Rules::Content(content) if content.trim().is_empty() => true,
            Rules::Content(content) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(content, product_token(user_agent), url)
            }
        }
    }
}

impl ExclusionPolicy for RobotsPolicy {
    fn allowed(&self, user_agent: &str, url: &str) -> bool {
        self.is_allowed(url, user_agent)
    }
}
