use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;

use crate::gateway::{HttpImageGateway, HttpSearchGateway};
use crate::llm::client::LLMClient;
use crate::queue::{ReportService, ReportStatus};

mod cache;
mod cli;
mod config;
mod gateway;
mod generator;
mod llm;
mod memory;
mod queue;
mod types;
mod utils;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    let query = args
        .query
        .clone()
        .context("a research query is required, pass it with --query")?;
    let force = args.force;
    let config = args.into_config();

    let llm_client = Arc::new(LLMClient::new(config.clone())?);

    // 启动时检查模型连接
    llm_client.check_connection().await?;

    let fetcher = Arc::new(HttpSearchGateway::new(config.search.clone())?);
    let image_finder = Arc::new(HttpImageGateway::new(config.images.clone())?);

    let service = ReportService::new(config.clone(), llm_client, fetcher, image_finder);
    let _worker = service.spawn_worker();

    let slug = service.request_report(&query, force).await;
    if slug.is_empty() {
        bail!("query normalized to an empty slug: {:?}", query);
    }

    // 轮询读路径直到任务终结
    loop {
        match service.get_report(&slug).await {
            ReportStatus::Cached(report) => {
                tokio::fs::create_dir_all(&config.output_path).await?;
                let output_file = config.output_path.join(format!("{}.json", slug));
                let content = serde_json::to_string_pretty(report.as_ref())?;
                tokio::fs::write(&output_file, content).await?;

                let stats = service.stats().await;
                println!("📊 队列快照: {} 排队 / {} 已缓存", stats.queued, stats.cached);
                println!("🎉 报告已写入 {:?}", output_file);
                return Ok(());
            }
            ReportStatus::Pending => {
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
            ReportStatus::NotFound => {
                bail!("report generation failed for slug {:?}, see logs above", slug);
            }
        }
    }
}
