//! Zhihu hot list.

use super::{value_label, FetchError, ZHIHU_TIMEOUT};
use crate::config::SourcesConfig;
use crate::models::{Platform, PlatformResult};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

const UNTITLED: &str = "无标题";
const HEAT_SUFFIX: &str = "万热度";

#[derive(Debug, Default, Deserialize)]
struct HotListResponse {
    #[serde(default)]
    data: Vec<HotListEntry>,
}

#[derive(Debug, Deserialize)]
struct HotListEntry {
    target: Option<Target>,
    #[serde(default)]
    detail_text: Value,
}

#[derive(Debug, Default, Deserialize)]
struct Target {
    #[serde(default)]
    title: Value,
    #[serde(default)]
    url: Value,
}

pub(crate) async fn fetch(
    client: &Client,
    config: &SourcesConfig,
) -> Result<PlatformResult, FetchError> {
    debug!("GET {} (limit={})", config.zhihu_url, config.zhihu_limit);

    let response = client
        .get(&config.zhihu_url)
        .query(&[("limit", config.zhihu_limit)])
        .timeout(ZHIHU_TIMEOUT)
        .send()
        .await?;

    let status = response.status();
    if status == StatusCode::FORBIDDEN {
        return Err(FetchError::Blocked);
    }
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let body: HotListResponse = response.json().await?;
    Ok(normalize(body))
}

fn normalize(body: HotListResponse) -> PlatformResult {
    let entries = body.data.into_iter().map(|entry| {
        let target = entry.target.unwrap_or_default();
        let title = match target.title {
            Value::Null => UNTITLED.to_string(),
            other => value_label(&other),
        };
        (
            title,
            value_label(&target.url),
            abbreviate_heat(&value_label(&entry.detail_text)),
        )
    });

    PlatformResult::ranked(Platform::Zhihu, entries)
}

/// "1234 万热度" -> "1234 w"
fn abbreviate_heat(text: &str) -> String {
    match text.strip_suffix(HEAT_SUFFIX) {
        Some(head) => format!("{}w", head),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::testing::config_for;
    use crate::sources::build_client;
    use mockito::Matcher;
    use serde_json::json;

    fn hot_list(n: usize) -> serde_json::Value {
        let data: Vec<_> = (1..=n)
            .map(|i| {
                json!({
                    "target": {"title": format!("问题 {}", i), "url": format!("https://zhihu.example/q/{}", i)},
                    "detail_text": format!("{} 万热度", 100 - i)
                })
            })
            .collect();
        json!({ "data": data })
    }

    #[test]
    fn test_abbreviate_heat() {
        assert_eq!(abbreviate_heat("1234 万热度"), "1234 w");
        assert_eq!(abbreviate_heat("热"), "热");
        assert_eq!(abbreviate_heat(""), "");
    }

    #[test]
    fn test_normalize_fills_missing_fields() {
        let body: HotListResponse = serde_json::from_value(json!({
            "data": [
                {"target": {"url": "https://zhihu.example/q/1"}},
                {"detail_text": "12 万热度"},
                {}
            ]
        }))
        .unwrap();

        let result = normalize(body);

        assert_eq!(result.len(), 3);
        assert_eq!(result.items[0].title, UNTITLED);
        assert_eq!(result.items[0].hot, "");
        assert_eq!(result.items[1].url, "");
        assert_eq!(result.items[1].hot, "12 w");
        assert_eq!(result.items[2].rank, 3);
    }

    #[test]
    fn test_normalize_accepts_non_string_fields() {
        let body: HotListResponse = serde_json::from_value(json!({
            "data": [
                {"target": {"title": "a", "url": "u"}, "detail_text": 123},
                {"target": {"title": 42, "url": null}, "detail_text": null},
                {"target": null}
            ]
        }))
        .unwrap();

        let result = normalize(body);

        assert_eq!(result.len(), 3);
        assert_eq!(result.items[0].hot, "123");
        assert_eq!(result.items[1].title, "42");
        assert_eq!(result.items[1].url, "");
        assert_eq!(result.items[1].hot, "");
        assert_eq!(result.items[2].title, UNTITLED);
    }

    #[test]
    fn test_missing_data_array_is_empty_list() {
        let body: HotListResponse = serde_json::from_value(json!({})).unwrap();
        assert!(normalize(body).is_empty());
    }

    #[tokio::test]
    async fn test_fetch_caps_at_fifteen() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/zhihu/hot")
            .match_query(Matcher::UrlEncoded("limit".into(), "20".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(hot_list(20).to_string())
            .create_async()
            .await;

        let config = config_for(&server.url());
        let client = build_client(&config).unwrap();
        let result = fetch(&client, &config).await.unwrap();

        assert_eq!(result.len(), 15);
        let ranks: Vec<usize> = result.items.iter().map(|i| i.rank).collect();
        assert_eq!(ranks, (1..=15).collect::<Vec<_>>());
        assert_eq!(result.items[0].title, "问题 1");
        assert_eq!(result.items[0].hot, "99 w");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_403_is_blocked() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/zhihu/hot")
            .match_query(Matcher::Any)
            .with_status(403)
            .create_async()
            .await;

        let config = config_for(&server.url());
        let client = build_client(&config).unwrap();
        let err = fetch(&client, &config).await.unwrap_err();

        assert!(matches!(err, FetchError::Blocked));
    }

    #[tokio::test]
    async fn test_fetch_malformed_json_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/zhihu/hot")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let config = config_for(&server.url());
        let client = build_client(&config).unwrap();

        assert!(matches!(
            fetch(&client, &config).await,
            Err(FetchError::Http(_))
        ));
    }
}
