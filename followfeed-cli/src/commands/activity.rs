//! Activity command - log in, walk the feed, print the target's stories.

use anyhow::{Result, anyhow};
use followfeed_core::Credentials;
use followfeed_fetch::{
    ActivityFetcher, HttpActivityClient, PageErrorPolicy, SessionManager, filter_activities,
};
use followfeed_store::{ApiConfig, AppConfig, CredentialStore};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::Cli;
use crate::output;

/// Environment variable holding the login password.
pub const PASSWORD_ENV: &str = "FOLLOWFEED_PASSWORD";

/// Everything a run needs, resolved from flags, environment and config.
#[derive(Debug)]
pub struct RunOptions {
    /// Account whose activity is reported.
    pub target: String,
    /// Login account.
    pub credentials: Credentials,
    /// Session settings file.
    pub settings_path: PathBuf,
    /// API client settings.
    pub api: ApiConfig,
    /// What to do when a page fails.
    pub page_policy: PageErrorPolicy,
}

impl RunOptions {
    /// Merges flags over environment over config file.
    pub fn resolve(cli: &Cli, config: AppConfig, env_password: Option<String>) -> Result<Self> {
        let target = cli
            .target_username()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| anyhow!("No target username given"))?
            .to_string();

        let username = cli
            .login
            .clone()
            .or(config.username)
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                anyhow!("No login account configured (use --login or FOLLOWFEED_USERNAME)")
            })?;

        let credentials = match env_password.or(config.password) {
            Some(password) => Credentials::new(username, password),
            None => Credentials::without_password(username),
        };

        let settings_path = cli
            .settings_path
            .clone()
            .or(config.settings_path)
            .unwrap_or_else(|| AppConfig::default().settings_path());

        let mut api = config.api;
        if let Some(base) = &cli.api_base {
            api.base_url.clone_from(base);
        }

        let page_policy = if cli.strict_pages {
            PageErrorPolicy::Fail
        } else {
            PageErrorPolicy::Truncate
        };

        Ok(Self {
            target,
            credentials,
            settings_path,
            api,
            page_policy,
        })
    }
}

/// Runs the activity command.
pub async fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    let options = RunOptions::resolve(cli, config, std::env::var(PASSWORD_ENV).ok())?;

    info!(
        user = %options.target,
        login = %options.credentials.username,
        "Fetching recent activity"
    );
    if !options.credentials.has_password() {
        debug!("No password configured, relying on cached session");
    }

    let client = HttpActivityClient::new(&options.api)?;
    let store = CredentialStore::new(&options.settings_path);
    let mut manager = SessionManager::new(options.credentials, store);
    let session = manager.establish(client).await?;

    let harvest = ActivityFetcher::with_policy(options.page_policy)
        .fetch_all(session.client())
        .await?;
    if harvest.is_partial() {
        debug!(pages = harvest.pages, "Feed walk stopped early");
    }

    let records = filter_activities(&harvest.entries, &options.target);
    info!(count = records.len(), user = %options.target, "Matching activities");

    output::print_activities(&records, &options.target)
}
