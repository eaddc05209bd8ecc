use adsynth_core::{CoreError, RedditApiError, ThreadSummary};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    pub selftext: String,
    pub author: String,
    pub subreddit: String,
    pub permalink: String,
    pub url: String,
    pub created_utc: f64,
    pub score: i64,
    pub num_comments: u32,
    pub over_18: bool,
    pub stickied: bool,
    pub is_self: bool,
}

/// A `t1` comment. `more` placeholders deserialize into this too, with an
/// empty body, and are dropped by kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditCommentData {
    pub id: String,
    pub author: String,
    pub body: String,
    pub score: i64,
    pub stickied: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccessTokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
    pub error: Option<serde_json::Value>,
}

#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    user_agent: String,
    api_base: String,
}

impl RedditApiClient {
    pub fn new(user_agent: String, api_base: String) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(&user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            user_agent,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Application-only OAuth: exchanges the app credentials for a bearer token.
    pub(crate) async fn request_access_token(
        &self,
        token_url: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<AccessTokenResponse, CoreError> {
        info!("Requesting Reddit application token");
        let response = self
            .http_client
            .post(token_url)
            .basic_auth(client_id, Some(client_secret))
            .header("User-Agent", &self.user_agent)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| {
                error!("Network error requesting Reddit token: {}", e);
                if e.is_timeout() {
                    CoreError::RedditApi(RedditApiError::RequestTimeout)
                } else {
                    CoreError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Reddit token request failed with status {}: {}", status, body);
            return Err(RedditApiError::AuthenticationFailed {
                reason: format!("token endpoint returned {}", status),
            }
            .into());
        }

        let token: AccessTokenResponse = response.json().await.map_err(|e| {
            error!("Failed to parse token response: {}", e);
            RedditApiError::AuthenticationFailed {
                reason: "malformed token response".to_string(),
            }
        })?;

        if let Some(err) = &token.error {
            return Err(RedditApiError::AuthenticationFailed {
                reason: err
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| err.to_string()),
            }
            .into());
        }

        Ok(token)
    }

    pub async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
        query_params: Option<&[(&str, &str)]>,
    ) -> Result<Response, CoreError> {
        let url = format!("{}{}", self.api_base, endpoint);

        let mut request_builder = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(access_token)
            .header("User-Agent", &self.user_agent);

        if let Some(params) = query_params {
            request_builder = request_builder.query(params);
        }

        info!("Making Reddit API request: {} {}", method, endpoint);
        let response = match request_builder.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Network error for {} {}: {}", method, endpoint, e);
                if e.is_timeout() {
                    return Err(CoreError::RedditApi(RedditApiError::RequestTimeout));
                }
                return Err(CoreError::Network(e));
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!("Request successful: {} {}", status, endpoint);
            return Ok(response);
        }

        error!("Request failed with status: {} for {}", status, endpoint);
        let api_error = match status {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.trim().parse::<u64>().ok())
                    .unwrap_or(60);
                warn!("Rate limited, retry after {} seconds", retry_after);
                RedditApiError::RateLimitExceeded { retry_after }
            }
            StatusCode::UNAUTHORIZED => RedditApiError::InvalidToken,
            StatusCode::FORBIDDEN => RedditApiError::Forbidden {
                resource: endpoint.to_string(),
            },
            StatusCode::NOT_FOUND => RedditApiError::SubredditNotFound {
                subreddit: subreddit_of(endpoint),
            },
            s if s.is_server_error() => RedditApiError::ServerError {
                status_code: s.as_u16(),
            },
            s => RedditApiError::InvalidResponse {
                details: format!("unexpected status {} for {}", s, endpoint),
            },
        };
        Err(api_error.into())
    }

    pub async fn get_subreddit_posts(
        &self,
        access_token: &str,
        subreddit: &str,
        limit: u32,
    ) -> Result<RedditListing<RedditPostData>, CoreError> {
        let endpoint = format!("/r/{}/hot", subreddit);
        let limit_str = limit.to_string();
        let params = [("limit", limit_str.as_str()), ("raw_json", "1")];

        let response = self
            .make_request(Method::GET, &endpoint, access_token, Some(&params))
            .await?;

        let listing: RedditListing<RedditPostData> = response.json().await.map_err(|e| {
            error!("Failed to parse subreddit posts: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse posts for r/{}", subreddit),
            })
        })?;

        info!(
            "Retrieved {} posts from r/{}",
            listing.data.children.len(),
            subreddit
        );
        Ok(listing)
    }

    /// Top-level comments of a post, best first.
    pub async fn get_top_comments(
        &self,
        access_token: &str,
        subreddit: &str,
        post_id: &str,
        limit: u32,
    ) -> Result<Vec<RedditCommentData>, CoreError> {
        let endpoint = format!("/r/{}/comments/{}", subreddit, post_id);
        let limit_str = limit.to_string();
        let params = [
            ("limit", limit_str.as_str()),
            ("depth", "1"),
            ("sort", "top"),
            ("raw_json", "1"),
        ];

        let response = self
            .make_request(Method::GET, &endpoint, access_token, Some(&params))
            .await?;

        // The endpoint answers with [post listing, comment listing].
        let (_post, comments): (serde_json::Value, RedditListing<RedditCommentData>) =
            response.json().await.map_err(|e| {
                error!("Failed to parse comments for {}: {}", post_id, e);
                CoreError::RedditApi(RedditApiError::InvalidResponse {
                    details: format!("Failed to parse comments for post {}", post_id),
                })
            })?;

        let comments: Vec<RedditCommentData> = comments
            .data
            .children
            .into_iter()
            .filter(|child| child.kind == "t1")
            .map(|child| child.data)
            .collect();

        debug!("Retrieved {} comments for post {}", comments.len(), post_id);
        Ok(comments)
    }
}

impl RedditPostData {
    pub fn into_thread_summary(self, comments: Vec<String>) -> ThreadSummary {
        let url = if self.permalink.is_empty() {
            self.url
        } else {
            format!("https://www.reddit.com{}", self.permalink)
        };

        ThreadSummary {
            id: self.id,
            title: self.title,
            body: self.selftext,
            comments,
            score: self.score,
            url,
            num_comments: self.num_comments,
        }
    }
}

fn subreddit_of(endpoint: &str) -> String {
    endpoint
        .strip_prefix("/r/")
        .and_then(|rest| rest.split('/').next())
        .unwrap_or(endpoint)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post() -> RedditPostData {
        RedditPostData {
            id: "test123".to_string(),
            title: "Test Post".to_string(),
            selftext: "This is test content".to_string(),
            author: "test_user".to_string(),
            subreddit: "test".to_string(),
            permalink: "/r/test/comments/test123/test_post/".to_string(),
            url: "https://example.com/article".to_string(),
            created_utc: 1640995200.0,
            score: 42,
            num_comments: 5,
            over_18: false,
            stickied: false,
            is_self: true,
        }
    }

    #[test]
    fn test_api_client_creation() {
        let client = RedditApiClient::new(
            "test-user-agent/1.0".to_string(),
            "https://oauth.reddit.com/".to_string(),
        )
        .unwrap();
        assert_eq!(client.user_agent(), "test-user-agent/1.0");
        assert_eq!(client.api_base, "https://oauth.reddit.com");
    }

    #[test]
    fn test_thread_summary_conversion() {
        let thread = sample_post().into_thread_summary(vec!["A long enough comment".to_string()]);
        assert_eq!(thread.id, "test123");
        assert_eq!(thread.title, "Test Post");
        assert_eq!(thread.body, "This is test content");
        assert_eq!(thread.score, 42);
        assert_eq!(thread.num_comments, 5);
        assert_eq!(
            thread.url,
            "https://www.reddit.com/r/test/comments/test123/test_post/"
        );
        assert_eq!(thread.comments.len(), 1);
    }

    #[test]
    fn test_listing_tolerates_missing_fields() {
        let json = r#"{
            "kind": "Listing",
            "data": {
                "after": null,
                "before": null,
                "children": [
                    {"kind": "t3", "data": {"id": "a1", "title": "Only a title"}}
                ]
            }
        }"#;
        let listing: RedditListing<RedditPostData> = serde_json::from_str(json).unwrap();
        let post = &listing.data.children[0].data;
        assert_eq!(post.id, "a1");
        assert_eq!(post.selftext, "");
        assert_eq!(post.score, 0);
    }

    #[test]
    fn test_subreddit_of_endpoint() {
        assert_eq!(subreddit_of("/r/productivity/hot"), "productivity");
        assert_eq!(subreddit_of("/r/rust/comments/abc"), "rust");
        assert_eq!(subreddit_of("/api/v1/me"), "/api/v1/me");
    }
}
