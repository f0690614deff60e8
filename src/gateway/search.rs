use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::types::fetched::FetchedItem;

/// 内容抓取网关 - 核心消费的外部协作方接口
///
/// 可能很慢、可能为空，但绝不让核心崩溃：任何错误都退化为空结果。
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// 根据查询返回排序后的(url, 摘录)结果列表
    async fn fetch(&self, query: &str) -> Vec<FetchedItem>;

    /// 抓取单个页面并提取正文
    async fn deepen(&self, url: &str) -> Option<String>;
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static SCRIPT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(script|style)\b.*?</(script|style)>").unwrap());
static WHITESPACE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// 把HTML降级为纯文本摘录
fn extract_page_text(html: &str, limit: usize) -> String {
    let without_scripts = SCRIPT_PATTERN.replace_all(html, " ");
    let without_tags = TAG_PATTERN.replace_all(&without_scripts, " ");
    let mut text = WHITESPACE_PATTERN
        .replace_all(&without_tags, " ")
        .trim()
        .to_string();
    if text.len() > limit {
        // 在字符边界截断
        let cut = (0..=limit).rev().find(|i| text.is_char_boundary(*i)).unwrap_or(0);
        text.truncate(cut);
    }
    text
}

/// 基于HTTP搜索服务的内容抓取网关
pub struct HttpSearchGateway {
    config: SearchConfig,
    client: reqwest::Client,
}

impl HttpSearchGateway {
    pub fn new(config: SearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { config, client })
    }

    async fn search(&self, query: &str) -> Result<Vec<FetchedItem>> {
        let request = SearchRequest {
            api_key: &self.config.api_key,
            query,
            max_results: self.config.max_results,
        };

        let response: SearchResponse = self
            .client
            .post(format!("{}/search", self.config.api_base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let items = response
            .results
            .into_iter()
            .filter(|r| !r.url.is_empty() && !r.content.is_empty())
            .take(self.config.max_results)
            .map(|r| {
                let excerpt = extract_page_text(&r.content, self.config.excerpt_limit);
                FetchedItem::new(r.url, excerpt)
            })
            .collect();
        Ok(items)
    }
}

#[async_trait]
impl ContentFetcher for HttpSearchGateway {
    async fn fetch(&self, query: &str) -> Vec<FetchedItem> {
        let mut items = match self.search(query).await {
            Ok(items) => items,
            Err(e) => {
                eprintln!("⚠️ 内容检索失败，退化为空结果: {}", e);
                return Vec::new();
            }
        };

        if self.config.deepen_pages {
            for item in items.iter_mut() {
                if let Some(page_text) = self.deepen(&item.url).await {
                    if page_text.len() > item.text.len() {
                        item.text = page_text;
                    }
                }
            }
        }

        items
    }

    async fn deepen(&self, url: &str) -> Option<String> {
        let response = self.client.get(url).send().await.ok()?;
        let html = response.error_for_status().ok()?.text().await.ok()?;
        let text = extract_page_text(&html, self.config.excerpt_limit);
        if text.is_empty() { None } else { Some(text) }
    }
}
