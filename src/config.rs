// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::fetch::TimeFilter;

const ENV_PATH: &str = "DIGEST_CONFIG_PATH";

/// What to fetch and how the digest email is labelled.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DigestConfig {
    /// Free-text arXiv topic expression.
    pub topic: String,
    pub max_papers: u32,
    pub subreddit: String,
    /// Coarse upstream bucket for the Reddit "top" listing. The strict 7-day
    /// re-filter applies regardless of this value.
    pub time_filter: TimeFilter,
    pub max_posts: u32,
    pub mail_subject: String,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            topic: "LLM".to_string(),
            max_papers: 5,
            subreddit: "LocalLLaMA".to_string(),
            time_filter: TimeFilter::Week,
            max_posts: 6,
            mail_subject: "Gen-AI weekly digest".to_string(),
        }
    }
}

impl DigestConfig {
    /// Load from an explicit TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading digest config from {}", path.display()))?;
        toml::from_str(&content).context("parsing digest config toml")
    }

    /// Load using env var + fallbacks:
    /// 1) $DIGEST_CONFIG_PATH
    /// 2) config/digest.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("DIGEST_CONFIG_PATH points to non-existent path"));
        }
        let toml_p = PathBuf::from("config/digest.toml");
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        Ok(Self::default())
    }
}

/// Reddit script-app credentials, read by the binary from the environment.
#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl RedditCredentials {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            client_id: env_var("CLIENT_ID")?,
            client_secret: env_var("SCRAPER_SECRET")?,
            user_agent: env_var("USER_AGENT")?,
        })
    }
}

/// SMTP relay settings for digest delivery.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub user: String,
    pub pass: String,
    pub from: String,
    pub to: String,
}

impl SmtpSettings {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env_var("SMTP_HOST")?,
            user: env_var("SMTP_USER")?,
            pass: env_var("SMTP_PASS")?,
            from: env_var("DIGEST_EMAIL_FROM")?,
            to: env_var("DIGEST_EMAIL_TO")?,
        })
    }
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("{name} missing from environment"))
}
