pub mod api;

pub use api::{RedditApiClient, RedditCommentData, RedditListing, RedditPostData};

use adsynth_core::config::{DEFAULT_REDDIT_API_BASE, DEFAULT_REDDIT_AUTH_URL};
use adsynth_core::{CoreError, RedditApiError, RedditCredentials, ThreadSummary};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use tracing::{debug, info};

/// Number of top comments kept per thread unless configured otherwise.
pub const DEFAULT_COMMENT_LIMIT: u32 = 5;
/// The listing endpoint refuses to return more than this many items.
pub const MAX_LISTING_LIMIT: u32 = 100;
/// Comments this short rarely carry anything worth quoting.
const MIN_COMMENT_CHARS: usize = 20;
/// Tokens are refreshed this long before Reddit would reject them.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);
/// Lifetime used when the token endpoint omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);
/// Server-supplied lifetimes are capped at one day.
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct RedditOAuth2Config {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub token_url: String,
    pub api_base: String,
    pub comment_limit: u32,
}

impl RedditOAuth2Config {
    pub fn new(client_id: String, client_secret: String, user_agent: String) -> Self {
        Self {
            client_id,
            client_secret,
            user_agent,
            token_url: DEFAULT_REDDIT_AUTH_URL.to_string(),
            api_base: DEFAULT_REDDIT_API_BASE.to_string(),
            comment_limit: DEFAULT_COMMENT_LIMIT,
        }
    }

    pub fn from_credentials(credentials: &RedditCredentials) -> Self {
        Self::new(
            credentials.client_id.clone(),
            credentials.client_secret.clone(),
            credentials.user_agent.clone(),
        )
        .with_endpoints(credentials.auth_url.clone(), credentials.api_base.clone())
    }

    pub fn with_endpoints(mut self, token_url: String, api_base: String) -> Self {
        self.token_url = token_url;
        self.api_base = api_base;
        self
    }

    pub fn with_comment_limit(mut self, comment_limit: u32) -> Self {
        self.comment_limit = comment_limit;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditToken {
    pub access_token: String,
    pub expires_at: SystemTime,
    pub scope: Vec<String>,
}

impl RedditToken {
    pub fn is_expired(&self) -> bool {
        SystemTime::now() + TOKEN_EXPIRY_MARGIN >= self.expires_at
    }
}

#[derive(Debug, Clone)]
pub enum AuthState {
    NotAuthenticated,
    Authenticated { token: RedditToken },
}

/// Read-only forum client using Reddit's application-only OAuth flow.
pub struct RedditClient {
    config: RedditOAuth2Config,
    api: RedditApiClient,
    auth_state: AuthState,
}

impl RedditClient {
    pub fn new(config: RedditOAuth2Config) -> Result<Self, CoreError> {
        if config.client_id.trim().is_empty() || config.client_secret.trim().is_empty() {
            return Err(RedditApiError::AuthenticationFailed {
                reason: "Missing Reddit client credentials".to_string(),
            }
            .into());
        }

        let api = RedditApiClient::new(config.user_agent.clone(), config.api_base.clone())?;

        Ok(Self {
            config,
            api,
            auth_state: AuthState::NotAuthenticated,
        })
    }

    pub fn get_auth_state(&self) -> &AuthState {
        &self.auth_state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(&self.auth_state, AuthState::Authenticated { token } if !token.is_expired())
    }

    pub async fn authenticate(&mut self) -> Result<(), CoreError> {
        let response = self
            .api
            .request_access_token(
                &self.config.token_url,
                &self.config.client_id,
                &self.config.client_secret,
            )
            .await?;

        let access_token = response.access_token.ok_or_else(|| {
            RedditApiError::AuthenticationFailed {
                reason: "token response did not contain an access token".to_string(),
            }
        })?;

        let expires_in = response
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME)
            .min(MAX_TOKEN_LIFETIME);
        let scope = response
            .scope
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        self.auth_state = AuthState::Authenticated {
            token: RedditToken {
                access_token,
                expires_at: SystemTime::now() + expires_in,
                scope,
            },
        };
        info!("Authenticated with Reddit (token valid for {:?})", expires_in);
        Ok(())
    }

    /// Returns a usable access token, fetching a new one when needed.
    pub async fn ensure_authenticated(&mut self) -> Result<String, CoreError> {
        if let AuthState::Authenticated { token } = &self.auth_state {
            if !token.is_expired() {
                return Ok(token.access_token.clone());
            }
            debug!("Reddit token expired, requesting a new one");
        }

        self.authenticate().await?;
        match &self.auth_state {
            AuthState::Authenticated { token } => Ok(token.access_token.clone()),
            _ => Err(RedditApiError::AuthenticationFailed {
                reason: "Not authenticated after token exchange".to_string(),
            }
            .into()),
        }
    }

    /// Fetches at most `limit` hot threads from `subreddit`, each with its top comments.
    ///
    /// An empty subreddit yields an empty list; credentials are still verified
    /// even when `limit` is zero.
    pub async fn fetch_top_threads(
        &mut self,
        subreddit: &str,
        limit: u32,
    ) -> Result<Vec<ThreadSummary>, CoreError> {
        let subreddit = normalize_subreddit(subreddit)?;
        let access_token = self.ensure_authenticated().await?;

        if limit == 0 {
            return Ok(Vec::new());
        }

        info!("Scraping r/{}...", subreddit);
        let listing = self
            .api
            .get_subreddit_posts(&access_token, &subreddit, limit.min(MAX_LISTING_LIMIT))
            .await?;

        let posts: Vec<RedditPostData> = listing
            .data
            .children
            .into_iter()
            .filter(|child| child.kind == "t3")
            .map(|child| child.data)
            .take(limit as usize)
            .collect();

        let mut threads = Vec::with_capacity(posts.len());
        for post in posts {
            let comments = if post.num_comments == 0 || self.config.comment_limit == 0 {
                Vec::new()
            } else {
                self.top_comment_bodies(&access_token, &subreddit, &post.id)
                    .await?
            };
            threads.push(post.into_thread_summary(comments));
        }

        info!(
            "Scraped {} posts with {} comments",
            threads.len(),
            threads.iter().map(|t| t.comments.len()).sum::<usize>()
        );
        Ok(threads)
    }

    async fn top_comment_bodies(
        &self,
        access_token: &str,
        subreddit: &str,
        post_id: &str,
    ) -> Result<Vec<String>, CoreError> {
        let comments = self
            .api
            .get_top_comments(access_token, subreddit, post_id, self.config.comment_limit)
            .await?;

        Ok(comments
            .into_iter()
            .map(|comment| comment.body.trim().to_string())
            .filter(|body| body.chars().count() > MIN_COMMENT_CHARS)
            .take(self.config.comment_limit as usize)
            .collect())
    }
}

fn normalize_subreddit(subreddit: &str) -> Result<String, CoreError> {
    let name = subreddit.trim().trim_start_matches('/');
    let name = name
        .strip_prefix("r/")
        .unwrap_or(name)
        .trim_end_matches('/');

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(CoreError::InvalidInput {
            message: format!("'{}' is not a valid subreddit name", subreddit),
        });
    }
    Ok(name.to_string())
}
