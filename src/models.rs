//! Data models for the trending digest.
//!
//! This module contains the normalized item shape shared by every
//! source, the per-platform result list, and the Feishu card payload
//! that gets rendered and delivered once per run.

use serde::Serialize;
use std::fmt;

/// Title used for the sentinel item when a fetch fails.
pub const FAILED_TITLE: &str = "获取失败";

/// One of the fixed platforms whose hot list is fetched.
///
/// The declaration order is the fetch order and the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Platform {
    /// Zhihu hot list.
    Zhihu,
    /// Weibo hot search.
    Weibo,
    /// V2EX hot topics.
    V2ex,
}

impl Platform {
    /// All platforms in fetch order.
    pub const ALL: [Platform; 3] = [Platform::Zhihu, Platform::Weibo, Platform::V2ex];

    /// Label used in logs and in the run summary.
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Zhihu => "知乎",
            Platform::Weibo => "微博",
            Platform::V2ex => "V2EX",
        }
    }

    /// Maximum number of items kept from a successful fetch.
    pub fn fetch_cap(&self) -> usize {
        match self {
            Platform::Zhihu | Platform::Weibo => 15,
            Platform::V2ex => 10,
        }
    }

    /// Maximum number of items shown in the rendered section.
    pub fn display_cap(&self) -> usize {
        match self {
            Platform::Zhihu | Platform::Weibo => 10,
            Platform::V2ex => 8,
        }
    }

    /// Maximum rendered title length, in characters.
    pub fn title_cap(&self) -> usize {
        match self {
            Platform::Zhihu | Platform::Weibo => 25,
            Platform::V2ex => 22,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A single normalized trending entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendingItem {
    /// Headline text.
    pub title: String,
    /// Link to the topic, empty when the source does not provide one.
    pub url: String,
    /// Free-form popularity label, may be empty.
    pub hot: String,
    /// 1-based position within the platform list.
    pub rank: usize,
}

impl TrendingItem {
    /// Creates the synthetic item that stands in for a failed fetch.
    pub fn sentinel(title: &str) -> Self {
        Self {
            title: title.to_string(),
            url: String::new(),
            hot: String::new(),
            rank: 1,
        }
    }
}

/// Ordered hot list for one platform.
///
/// Once a fetch attempt has completed the list is never empty: a
/// failure is represented by a single sentinel item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformResult {
    pub platform: Platform,
    pub items: Vec<TrendingItem>,
}

impl PlatformResult {
    /// Builds a result from `(title, url, hot)` triples, assigning
    /// ranks by position and keeping at most `platform.fetch_cap()`.
    pub fn ranked<I>(platform: Platform, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String, String)>,
    {
        let items = entries
            .into_iter()
            .take(platform.fetch_cap())
            .enumerate()
            .map(|(idx, (title, url, hot))| TrendingItem {
                title,
                url,
                hot,
                rank: idx + 1,
            })
            .collect();

        Self { platform, items }
    }

    /// Creates a failure result holding one sentinel item.
    pub fn failed(platform: Platform, title: &str) -> Self {
        Self {
            platform,
            items: vec![TrendingItem::sentinel(title)],
        }
    }

    /// Number of items held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when no item was decoded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Text node inside a card (`plain_text` or `lark_md`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardText {
    pub tag: String,
    pub content: String,
}

impl CardText {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            tag: "plain_text".to_string(),
            content: content.into(),
        }
    }

    pub fn lark_md(content: impl Into<String>) -> Self {
        Self {
            tag: "lark_md".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardConfig {
    pub wide_screen_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardHeader {
    pub title: CardText,
    /// Header color template.
    pub template: String,
}

/// Body element of an interactive card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "tag", rename_all = "lowercase")]
pub enum CardElement {
    /// Markdown text block.
    Div { text: CardText },
    /// Horizontal separator.
    Hr,
    /// Small footer note.
    Note { elements: Vec<CardText> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub config: CardConfig,
    pub header: CardHeader,
    pub elements: Vec<CardElement>,
}

/// The rendered message, serialized as the webhook JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationPayload {
    pub msg_type: String,
    pub card: Card,
}

impl NotificationPayload {
    /// Returns the markdown body of the first text block.
    pub fn body(&self) -> Option<&str> {
        self.card.elements.iter().find_map(|el| match el {
            CardElement::Div { text } => Some(text.content.as_str()),
            _ => None,
        })
    }

    /// Returns the header title line.
    pub fn title(&self) -> &str {
        &self.card.header.title.content
    }
}
