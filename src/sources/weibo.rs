//! Weibo hot search.
//!
//! Weibo has no usable public endpoint, so two third-party providers
//! are tried in order: the keyed Tianapi service when a key is
//! configured, then the free vvhan mirror. The first provider that
//! reports success wins.

use super::{non_empty, value_label, FetchError, DEFAULT_TIMEOUT};
use crate::config::SourcesConfig;
use crate::models::{Platform, PlatformResult};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Success value of the Tianapi `code` field.
const TIANAPI_SUCCESS: i64 = 200;

/// A Weibo hot-search provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Keyed provider. Returns no URLs.
    Tianapi { key: String },
    /// Free fallback provider.
    Vvhan,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Tianapi { .. } => "tianapi",
            Strategy::Vvhan => "vvhan",
        }
    }

    async fn run(&self, client: &Client, config: &SourcesConfig) -> Result<PlatformResult, FetchError> {
        match self {
            Strategy::Tianapi { key } => fetch_tianapi(client, &config.tianapi_url, key).await,
            Strategy::Vvhan => fetch_vvhan(client, &config.vvhan_url).await,
        }
    }
}

/// Candidate providers, in the order they are tried.
pub fn strategies(config: &SourcesConfig) -> Vec<Strategy> {
    let mut list = Vec::with_capacity(2);
    if let Some(key) = config.tianapi_key.as_deref().filter(|k| !k.is_empty()) {
        list.push(Strategy::Tianapi {
            key: key.to_string(),
        });
    }
    list.push(Strategy::Vvhan);
    list
}

pub(crate) async fn fetch(
    client: &Client,
    config: &SourcesConfig,
) -> Result<PlatformResult, FetchError> {
    for strategy in strategies(config) {
        match strategy.run(client, config).await.and_then(non_empty) {
            Ok(result) => {
                info!("Weibo via {}: {} items", strategy.name(), result.len());
                return Ok(result);
            }
            Err(e) => {
                warn!("Weibo provider {} failed: {}", strategy.name(), e);
            }
        }
    }

    Err(FetchError::Exhausted)
}

#[derive(Debug, Deserialize)]
struct TianapiResponse {
    code: Option<i64>,
    msg: Option<String>,
    result: Option<TianapiResult>,
}

#[derive(Debug, Deserialize)]
struct TianapiResult {
    #[serde(default)]
    list: Vec<TianapiEntry>,
}

#[derive(Debug, Deserialize)]
struct TianapiEntry {
    hotword: Option<String>,
    #[serde(default)]
    hotwordnum: Value,
}

async fn fetch_tianapi(client: &Client, url: &str, key: &str) -> Result<PlatformResult, FetchError> {
    debug!("GET {} (keyed)", url);

    let response = client
        .get(url)
        .query(&[("key", key)])
        .timeout(DEFAULT_TIMEOUT)
        .send()
        .await?;

    let body: TianapiResponse = response.json().await?;
    let code = body.code.unwrap_or_default();
    if code != TIANAPI_SUCCESS {
        return Err(FetchError::Provider {
            code,
            msg: body.msg.unwrap_or_default(),
        });
    }

    let entries = body
        .result
        .map(|r| r.list)
        .unwrap_or_default()
        .into_iter()
        .map(|entry| {
            (
                entry.hotword.unwrap_or_default(),
                String::new(),
                value_label(&entry.hotwordnum),
            )
        });

    Ok(PlatformResult::ranked(Platform::Weibo, entries))
}

#[derive(Debug, Deserialize)]
struct VvhanResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Vec<VvhanEntry>,
}

#[derive(Debug, Deserialize)]
struct VvhanEntry {
    title: Option<String>,
    url: Option<String>,
    #[serde(default)]
    hot: Value,
}

async fn fetch_vvhan(client: &Client, url: &str) -> Result<PlatformResult, FetchError> {
    debug!("GET {}", url);

    let response = client.get(url).timeout(DEFAULT_TIMEOUT).send().await?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchError::Status(status));
    }

    let body: VvhanResponse = response.json().await?;
    if !body.success {
        return Err(FetchError::Unsuccessful);
    }

    let entries = body.data.into_iter().map(|entry| {
        (
            entry.title.unwrap_or_default(),
            entry.url.unwrap_or_default(),
            value_label(&entry.hot),
        )
    });

    Ok(PlatformResult::ranked(Platform::Weibo, entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::build_client;
    use crate::sources::testing::config_for;
    use mockito::Matcher;
    use serde_json::json;

    fn vvhan_body(n: usize) -> String {
        let data: Vec<_> = (1..=n)
            .map(|i| {
                json!({
                    "title": format!("热搜 {}", i),
                    "url": format!("https://s.weibo.example/{}", i),
                    "hot": format!("{}万", 50 - i)
                })
            })
            .collect();
        json!({ "success": true, "data": data }).to_string()
    }

    #[test]
    fn test_strategies_without_key() {
        let config = SourcesConfig::default();
        assert_eq!(strategies(&config), vec![Strategy::Vvhan]);
    }

    #[test]
    fn test_strategies_with_key() {
        let config = SourcesConfig {
            tianapi_key: Some("k".to_string()),
            ..SourcesConfig::default()
        };
        assert_eq!(
            strategies(&config),
            vec![
                Strategy::Tianapi {
                    key: "k".to_string()
                },
                Strategy::Vvhan
            ]
        );
    }

    #[tokio::test]
    async fn test_no_key_uses_fallback_with_urls() {
        let mut server = mockito::Server::new_async().await;
        let tianapi = server
            .mock("GET", "/tianapi/networkhot")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        server
            .mock("GET", "/vvhan/wbHot")
            .with_status(200)
            .with_body(vvhan_body(5))
            .create_async()
            .await;

        let config = config_for(&server.url());
        let client = build_client(&config).unwrap();
        let result = fetch(&client, &config).await.unwrap();

        assert_eq!(result.len(), 5);
        let ranks: Vec<usize> = result.items.iter().map(|i| i.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
        assert!(result.items.iter().all(|i| i.url.starts_with("https://s.weibo.example/")));
        tianapi.assert_async().await;
    }

    #[tokio::test]
    async fn test_keyed_provider_success_has_no_urls() {
        let list: Vec<_> = (1..=20)
            .map(|i| json!({"hotword": format!("词 {}", i), "hotwordnum": 1000 + i}))
            .collect();

        let mut server = mockito::Server::new_async().await;
        let tianapi = server
            .mock("GET", "/tianapi/networkhot")
            .match_query(Matcher::UrlEncoded("key".into(), "secret".into()))
            .with_status(200)
            .with_body(json!({"code": 200, "msg": "success", "result": {"list": list}}).to_string())
            .create_async()
            .await;
        let vvhan = server
            .mock("GET", "/vvhan/wbHot")
            .expect(0)
            .create_async()
            .await;

        let mut config = config_for(&server.url());
        config.tianapi_key = Some("secret".to_string());
        let client = build_client(&config).unwrap();
        let result = fetch(&client, &config).await.unwrap();

        assert_eq!(result.len(), 15);
        assert!(result.items.iter().all(|i| i.url.is_empty()));
        assert_eq!(result.items[0].hot, "1001");
        tianapi.assert_async().await;
        vvhan.assert_async().await;
    }

    #[tokio::test]
    async fn test_keyed_provider_error_code_falls_through() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tianapi/networkhot")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"code": 150, "msg": "API可用次数不足"}).to_string())
            .create_async()
            .await;
        let vvhan = server
            .mock("GET", "/vvhan/wbHot")
            .with_status(200)
            .with_body(vvhan_body(3))
            .create_async()
            .await;

        let mut config = config_for(&server.url());
        config.tianapi_key = Some("secret".to_string());
        let client = build_client(&config).unwrap();
        let result = fetch(&client, &config).await.unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result.items[0].title, "热搜 1");
        vvhan.assert_async().await;
    }

    #[tokio::test]
    async fn test_keyed_provider_empty_list_falls_through() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tianapi/networkhot")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"code": 200, "msg": "success", "result": {"list": []}}).to_string())
            .create_async()
            .await;
        let vvhan = server
            .mock("GET", "/vvhan/wbHot")
            .with_status(200)
            .with_body(vvhan_body(2))
            .expect(1)
            .create_async()
            .await;

        let mut config = config_for(&server.url());
        config.tianapi_key = Some("secret".to_string());
        let client = build_client(&config).unwrap();
        let result = fetch(&client, &config).await.unwrap();

        assert_eq!(result.len(), 2);
        assert!(!result.items[0].url.is_empty());
        vvhan.assert_async().await;
    }

    #[tokio::test]
    async fn test_fallback_success_false_exhausts() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/vvhan/wbHot")
            .with_status(200)
            .with_body(json!({"success": false, "message": "down"}).to_string())
            .create_async()
            .await;

        let config = config_for(&server.url());
        let client = build_client(&config).unwrap();
        let err = fetch(&client, &config).await.unwrap_err();

        assert!(matches!(err, FetchError::Exhausted));
        assert_eq!(err.sentinel_title(), crate::sources::WEIBO_FAILED_TITLE);
    }

    #[tokio::test]
    async fn test_fallback_non_200_is_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/vvhan/wbHot")
            .with_status(502)
            .create_async()
            .await;

        let client = build_client(&SourcesConfig::default()).unwrap();
        let url = format!("{}/vvhan/wbHot", server.url());

        assert!(matches!(
            fetch_vvhan(&client, &url).await,
            Err(FetchError::Status(StatusCode::BAD_GATEWAY))
        ));
    }
}
