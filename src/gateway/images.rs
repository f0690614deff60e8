use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::config::ImageConfig;

/// 配图检索 - 纯建议性质的外部协作方接口
///
/// 任何失败都退化为None，由调用方落到固定的占位图。
#[async_trait]
pub trait ImageFinder: Send + Sync {
    async fn find(&self, query: &str, category: &str) -> Option<String>;
}

#[derive(Debug, Deserialize)]
struct PhotoSearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    src: PhotoSrc,
}

#[derive(Debug, Deserialize)]
struct PhotoSrc {
    original: String,
}

/// 基于HTTP图库服务的配图检索网关
pub struct HttpImageGateway {
    config: ImageConfig,
    client: reqwest::Client,
}

impl HttpImageGateway {
    pub fn new(config: ImageConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { config, client })
    }

    async fn search_photos(&self, query: &str) -> Result<Option<String>> {
        let response: PhotoSearchResponse = self
            .client
            .get(format!("{}/v1/search", self.config.api_base_url))
            .header("Authorization", &self.config.api_key)
            .query(&[("query", query), ("per_page", "5")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.photos.into_iter().next().map(|p| p.src.original))
    }
}

#[async_trait]
impl ImageFinder for HttpImageGateway {
    async fn find(&self, query: &str, category: &str) -> Option<String> {
        if !self.config.enabled || self.config.api_key.is_empty() {
            return None;
        }

        match self.search_photos(query).await {
            Ok(Some(url)) => Some(url),
            // 主查询无结果时按类别再试一次
            Ok(None) => match self.search_photos(category).await {
                Ok(found) => found,
                Err(_) => None,
            },
            Err(e) => {
                eprintln!("⚠️ 配图检索失败，使用占位图: {}", e);
                None
            }
        }
    }
}
