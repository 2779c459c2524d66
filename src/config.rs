//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to deserialize environment variables into a type-safe struct.

use serde::Deserialize;
use url::Url;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (optional): PostgreSQL connection string; without it keys
///   are kept in memory and lost on restart
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `AD_REDIRECT_URL` (optional): ad-view page users are sent to after generating a key
/// - `DASHBOARD_URL` (optional): study dashboard the ad flow returns users to, defaults to `/study`
///
/// The access key lifetime is fixed at 48 hours and cannot be configured.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: Option<String>,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_ad_redirect_url")]
    pub ad_redirect_url: String,

    #[serde(default = "default_dashboard_url")]
    pub dashboard_url: String,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_ad_redirect_url() -> String {
    "https://ads.example.com/watch".to_string()
}

fn default_dashboard_url() -> String {
    "/study".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if environment variable values cannot be parsed into
    /// expected types (e.g., a non-numeric SERVER_PORT).
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        // Field names are converted automatically: ad_redirect_url -> AD_REDIRECT_URL
        envy::from_env::<Config>()
    }

    /// Build the ad-view URL a user is redirected to after generating a key.
    ///
    /// The dashboard URL is passed along as `return_to` so the ad flow can send
    /// the user back once the ad has been viewed.
    pub fn ad_view_url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.ad_redirect_url)?;
        url.query_pairs_mut()
            .append_pair("return_to", &self.dashboard_url);
        Ok(url)
    }
}
