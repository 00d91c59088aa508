use std::{num::NonZeroU32, sync::Arc, time::Duration};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

/// Outcome of a failed search against the movie database.
#[derive(Debug, thiserror::Error)]
pub enum TmdbError {
    #[error("the movie database did not answer within {} seconds", .0.as_secs_f32())]
    Timeout(Duration),

    #[error("the movie database answered with {0}")]
    Status(StatusCode),

    #[error("could not reach the movie database: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("the movie database sent a response that could not be read: {0}")]
    Decode(#[source] reqwest::Error),
}

/// One search result, not yet on the list.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Candidate {
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

pub struct TmdbClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        base_url: String,
        rps: u32,
        timeout: Duration,
    ) -> Self {
        // Warn once on app load if using mock data
        if api_key.trim().is_empty() {
            tracing::warn!("Using mock TMDB data - no TMDB_API_KEY provided");
        }

        let rps = NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(rps)));
        Self { client, api_key, base_url, timeout, limiter }
    }

    pub async fn search_movie(&self, query: &str) -> Result<Vec<Candidate>, TmdbError> {
        if self.api_key.trim().is_empty() {
            return Ok(mock_candidates());
        }

        self.limiter.until_ready().await;

        let url = format!("{}/search/movie", self.base_url.trim_end_matches('/'));
        debug!(query = %query, "searching tmdb");

        let resp = self
            .client
            .get(url)
            .timeout(self.timeout)
            .query(&[("api_key", self.api_key.as_str()), ("query", query)])
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TmdbError::Status(status));
        }

        let body: SearchResponse = resp.json().await.map_err(|err| self.classify(err))?;
        debug!(query = %query, results = body.results.len(), "tmdb search finished");
        Ok(body.results)
    }

    fn classify(&self, err: reqwest::Error) -> TmdbError {
        if err.is_timeout() {
            TmdbError::Timeout(self.timeout)
        } else if err.is_decode() {
            TmdbError::Decode(err)
        } else if let Some(status) = err.status() {
            TmdbError::Status(status)
        } else {
            TmdbError::Transport(err)
        }
    }
}

fn mock_candidates() -> Vec<Candidate> {
    vec![
        Candidate {
            title: "Fight Club".to_string(),
            release_date: Some("1999-10-15".to_string()),
            overview: Some(
                "A ticking-time-bomb insomniac and a slippery soap salesman channel primal male \
                 aggression into a shocking new form of therapy."
                    .to_string(),
            ),
            poster_path: Some("/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg".to_string()),
        },
        Candidate {
            title: "The Matrix".to_string(),
            release_date: Some("1999-03-31".to_string()),
            overview: Some(
                "A computer hacker learns about the true nature of reality and his role in the \
                 war against its controllers."
                    .to_string(),
            ),
            poster_path: Some("/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg".to_string()),
        },
    ]
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Candidate>,
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{Json, Router, extract::Query, http::StatusCode, routing::get};
    use serde_json::json;

    use super::*;

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base_url: String, timeout: Duration) -> TmdbClient {
        TmdbClient::new(reqwest::Client::new(), "test-key".to_string(), base_url, 50, timeout)
    }

    #[test]
    fn candidates_tolerate_missing_and_null_fields() {
        let body = json!({
            "page": 1,
            "results": [
                {"id": 1, "title": "Phone Booth", "release_date": "2002-11-14",
                 "overview": "Stuart is pinned down.", "poster_path": "/tjr.jpg"},
                {"id": 2, "title": "Obscure", "poster_path": null}
            ]
        });

        let resp: SearchResponse = serde_json::from_value(body).unwrap();
        assert_eq!(resp.results.len(), 2);
        assert_eq!(resp.results[0].release_date.as_deref(), Some("2002-11-14"));
        assert_eq!(resp.results[1].release_date, None);
        assert_eq!(resp.results[1].poster_path, None);
    }

    #[tokio::test]
    async fn empty_api_key_uses_mock_candidates() {
        let tmdb = TmdbClient::new(
            reqwest::Client::new(),
            String::new(),
            "http://127.0.0.1:9".to_string(),
            1,
            Duration::from_secs(1),
        );

        let results = tmdb.search_movie("anything").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Fight Club");
    }

    #[tokio::test]
    async fn search_sends_key_and_query() {
        let router = Router::new().route(
            "/search/movie",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                Json(json!({
                    "results": [{
                        "title": format!("{} / {}", params["query"], params["api_key"]),
                        "release_date": "1999-12-31",
                        "overview": "x",
                        "poster_path": "/abc.jpg"
                    }]
                }))
            }),
        );
        let base = spawn_stub(router).await;

        let results = client(base, Duration::from_secs(5)).search_movie("Heat").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Heat / test-key");
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let router =
            Router::new().route("/search/movie", get(|| async { StatusCode::UNAUTHORIZED }));
        let base = spawn_stub(router).await;

        let err = client(base, Duration::from_secs(5)).search_movie("Heat").await.unwrap_err();
        assert!(matches!(err, TmdbError::Status(code) if code == StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let router = Router::new().route("/search/movie", get(|| async { "not json" }));
        let base = spawn_stub(router).await;

        let err = client(base, Duration::from_secs(5)).search_movie("Heat").await.unwrap_err();
        assert!(matches!(err, TmdbError::Decode(_)));
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let router = Router::new().route(
            "/search/movie",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"results": []}))
            }),
        );
        let base = spawn_stub(router).await;

        let err =
            client(base, Duration::from_millis(200)).search_movie("Heat").await.unwrap_err();
        assert!(matches!(err, TmdbError::Timeout(_)));
    }
}
