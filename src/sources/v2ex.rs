//! V2EX hot topics.

use super::{FetchError, DEFAULT_TIMEOUT};
use crate::config::SourcesConfig;
use crate::models::{Platform, PlatformResult};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct Topic {
    title: Option<String>,
    url: Option<String>,
    replies: Option<u64>,
}

pub(crate) async fn fetch(
    client: &Client,
    config: &SourcesConfig,
    retry_delay: Duration,
) -> Result<PlatformResult, FetchError> {
    let mut response = get(client, &config.v2ex_url).await?;

    // V2EX rate-limits bursts; one delayed retry is allowed.
    if response.status() != StatusCode::OK {
        warn!(
            "V2EX returned {}, retrying once in {:?}",
            response.status(),
            retry_delay
        );
        tokio::time::sleep(retry_delay).await;
        response = get(client, &config.v2ex_url).await?;
    }

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let topics: Vec<Topic> = response.json().await?;
    Ok(normalize(topics))
}

async fn get(client: &Client, url: &str) -> Result<Response, FetchError> {
    debug!("GET {}", url);
    Ok(client.get(url).timeout(DEFAULT_TIMEOUT).send().await?)
}

fn normalize(topics: Vec<Topic>) -> PlatformResult {
    let entries = topics.into_iter().map(|topic| {
        (
            topic.title.unwrap_or_default(),
            topic.url.unwrap_or_default(),
            format!("💬 {}", topic.replies.unwrap_or(0)),
        )
    });

    PlatformResult::ranked(Platform::V2ex, entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::build_client;
    use crate::sources::testing::config_for;
    use serde_json::json;
    use std::time::Instant;

    fn topics(n: usize) -> String {
        let list: Vec<_> = (1..=n)
            .map(|i| {
                json!({
                    "title": format!("Topic {}", i),
                    "url": format!("https://www.v2ex.example/t/{}", i),
                    "replies": i * 3
                })
            })
            .collect();
        json!(list).to_string()
    }

    #[test]
    fn test_normalize_synthesizes_reply_label() {
        let topics: Vec<Topic> =
            serde_json::from_value(json!([{"title": "a", "replies": 7}, {"url": "u"}])).unwrap();

        let result = normalize(topics);

        assert_eq!(result.items[0].hot, "💬 7");
        assert_eq!(result.items[0].url, "");
        assert_eq!(result.items[1].title, "");
        assert_eq!(result.items[1].hot, "💬 0");
    }

    #[tokio::test]
    async fn test_retry_once_after_server_error() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", "/v2ex/hot.json")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/v2ex/hot.json")
            .with_status(200)
            .with_body(topics(12))
            .expect(1)
            .create_async()
            .await;

        let config = config_for(&server.url());
        let client = build_client(&config).unwrap();
        let delay = Duration::from_millis(50);

        let started = Instant::now();
        let result = fetch(&client, &config, delay).await.unwrap();

        assert!(started.elapsed() >= delay);
        assert_eq!(result.len(), 10);
        let ranks: Vec<usize> = result.items.iter().map(|i| i.rank).collect();
        assert_eq!(ranks, (1..=10).collect::<Vec<_>>());
        assert_eq!(result.items[9].title, "Topic 10");
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_third_attempt() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v2ex/hot.json")
            .with_status(503)
            .expect(2)
            .create_async()
            .await;

        let config = config_for(&server.url());
        let client = build_client(&config).unwrap();
        let err = fetch(&client, &config, Duration::from_millis(10))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status(StatusCode::SERVICE_UNAVAILABLE)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_success_first_try_does_not_retry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v2ex/hot.json")
            .with_status(200)
            .with_body(topics(4))
            .expect(1)
            .create_async()
            .await;

        let config = config_for(&server.url());
        let client = build_client(&config).unwrap();
        let result = fetch(&client, &config, Duration::from_secs(5)).await.unwrap();

        assert_eq!(result.len(), 4);
        assert_eq!(result.items[3].hot, "💬 12");
        mock.assert_async().await;
    }
}
