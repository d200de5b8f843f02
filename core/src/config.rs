//! Process configuration.
//!
//! Layers, later ones winning:
//! 1. built-in defaults,
//! 2. `WORDPRESS_API_URL` and `NEXT_PUBLIC_SITE_URL`,
//! 3. any `BLOG_`-prefixed variable, `__` separating nested keys
//!    (`BLOG_SITE__NAME`, `BLOG_WORDPRESS__API_URL`).

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::repository::BlogRepository;

const API_PATH_MARKER: &str = "/wp-json/wp/v2";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Figment(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Figment(Box::new(err))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPressConfig {
    /// REST root, e.g. `https://example.com/wp-json/wp/v2`.
    pub api_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub url: String,
    pub name: String,
    pub description: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000".to_string(),
            name: "My WordPress Blog".to_string(),
            description: "A headless WordPress blog built with Next.js".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogConfig {
    pub wordpress: WordPressConfig,
    pub site: SiteConfig,
}

impl BlogConfig {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(BlogConfig::default()))
            .merge(
                Env::raw()
                    .only(&["WORDPRESS_API_URL"])
                    .map(|_| "wordpress.api_url".into()),
            )
            .merge(
                Env::raw()
                    .only(&["NEXT_PUBLIC_SITE_URL"])
                    .map(|_| "site.url".into()),
            )
            .merge(Env::prefixed("BLOG_").split("__"))
    }

    /// Load from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// Extract from an arbitrary figment. An API URL that does not look like
    /// a WordPress REST root is logged, not rejected.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: BlogConfig = figment.extract()?;
        if !validate_api_url(&config.wordpress.api_url) {
            tracing::warn!(
                api_url = %config.wordpress.api_url,
                "WordPress API URL does not point at {API_PATH_MARKER}"
            );
        }
        Ok(config)
    }

    pub fn repository(&self) -> BlogRepository {
        BlogRepository::from_api_url(&self.wordpress.api_url)
    }
}

/// Whether `url` is absolute and its path contains `/wp-json/wp/v2`.
pub fn validate_api_url(url: &str) -> bool {
    Url::parse(url)
        .map(|parsed| parsed.path().contains(API_PATH_MARKER))
        .unwrap_or(false)
}
