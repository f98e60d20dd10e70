//! Feishu interactive card generation.
//!
//! Rendering is pure: the same results and timestamp always produce the
//! same payload.

use crate::aggregate::AggregatedResults;
use crate::models::{
    Card, CardConfig, CardElement, CardHeader, CardText, NotificationPayload, Platform,
    PlatformResult, TrendingItem, FAILED_TITLE,
};
use chrono::NaiveDateTime;

/// Timestamp format used in the card header and body.
pub const TIME_FORMAT: &str = "%m月%d日 %H:%M";

const ELLIPSIS: &str = "...";
const HOT_MARK: &str = "🔥";
const BULLET: &str = "•";

/// Build the complete card for one run.
pub fn build_card(
    results: &AggregatedResults,
    now: NaiveDateTime,
    footer: &str,
) -> NotificationPayload {
    let stamp = now.format(TIME_FORMAT).to_string();

    NotificationPayload {
        msg_type: "interactive".to_string(),
        card: Card {
            config: CardConfig {
                wide_screen_mode: true,
            },
            header: CardHeader {
                title: CardText::plain(format!("📊 每小时热点汇总 | {}", stamp)),
                template: "blue".to_string(),
            },
            elements: vec![
                CardElement::Div {
                    text: CardText::lark_md(render_body(results, &stamp)),
                },
                CardElement::Hr,
                CardElement::Note {
                    elements: vec![CardText::plain(footer)],
                },
            ],
        },
    }
}

/// Render the markdown body with one section per platform.
fn render_body(results: &AggregatedResults, stamp: &str) -> String {
    let sections: Vec<String> = Platform::ALL
        .into_iter()
        .map(|platform| render_section(platform, results.get(platform)))
        .collect();

    format!("### 🔥 全网热点监控 - {}\n\n{}", stamp, sections.join("\n"))
}

fn section_heading(platform: Platform) -> &'static str {
    match platform {
        Platform::Zhihu => "**📖 知乎热榜**",
        Platform::Weibo => "**🎤 微博热搜**",
        Platform::V2ex => "**💻 V2EX热帖**",
    }
}

fn render_section(platform: Platform, result: Option<&PlatformResult>) -> String {
    let mut section = format!("{}\n", section_heading(platform));

    match result.filter(|r| !r.items.is_empty()) {
        Some(result) => {
            for item in result.items.iter().take(platform.display_cap()) {
                section.push_str(&render_item(platform, item));
                section.push('\n');
            }
        }
        None => {
            section.push_str(FAILED_TITLE);
            section.push('\n');
        }
    }

    section
}

fn render_item(platform: Platform, item: &TrendingItem) -> String {
    let title = truncate_title(&item.title, platform.title_cap());

    match platform {
        Platform::Zhihu => format!(
            "{} {}. [{}]({}){}",
            rank_mark(item.rank),
            item.rank,
            title,
            item.url,
            hot_suffix(&item.hot)
        ),
        Platform::Weibo => format!(
            "{} {}. {}{}",
            rank_mark(item.rank),
            item.rank,
            title,
            hot_suffix(&item.hot)
        ),
        Platform::V2ex => format!("{} [{}]({}) {}", BULLET, title, item.url, item.hot),
    }
}

fn rank_mark(rank: usize) -> &'static str {
    if rank <= 3 {
        HOT_MARK
    } else {
        BULLET
    }
}

fn hot_suffix(hot: &str) -> String {
    if hot.is_empty() {
        String::new()
    } else {
        format!(" ({})", hot)
    }
}

/// Shorten `title` to at most `cap` characters, ending in `...` when cut.
pub fn truncate_title(title: &str, cap: usize) -> String {
    if title.chars().count() <= cap {
        return title.to_string();
    }

    let keep = cap.saturating_sub(ELLIPSIS.len());
    let mut out: String = title.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}
