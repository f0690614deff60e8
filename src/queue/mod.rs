use std::collections::VecDeque;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;

use crate::cache::ReportCache;
use crate::config::Config;
use crate::gateway::{ContentFetcher, ImageFinder};
use crate::generator::context::GeneratorContext;
use crate::generator::workflow::{self, WorkflowError};
use crate::llm::TextGenerator;
use crate::types::report::Report;
use crate::utils::slug::slugify;

/// 生成队列中的一项任务
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub query: String,
    pub slug: String,
    pub force: bool,
}

/// 报告读路径的返回值 - 缺失与进行中不是错误
pub enum ReportStatus {
    Cached(Arc<Report>),
    Pending,
    NotFound,
}

/// 队列与缓存的运行时快照，仅供运维观测
#[derive(Debug, Clone, Serialize)]
pub struct QueueStats {
    pub queued: usize,
    pub cached: usize,
    pub in_flight: bool,
    pub queued_slugs: Vec<String>,
}

struct QueueState {
    jobs: VecDeque<GenerationJob>,
    in_flight: Option<String>,
}

struct ServiceInner {
    config: Config,
    generator: Arc<dyn TextGenerator>,
    fetcher: Arc<dyn ContentFetcher>,
    image_finder: Arc<dyn ImageFinder>,
    cache: ReportCache,
    state: Mutex<QueueState>,
    notify: Notify,
}

/// 报告生成服务 - 缓存与单worker队列的统一入口
///
/// 进程启动时构造一次，内部持有自己的锁与worker。同一slug在
/// 队列或缓存中最多存在一份未强制的任务；worker串行处理任务，
/// 从整体上尊重外部速率限制。
pub struct ReportService {
    inner: Arc<ServiceInner>,
}

impl ReportService {
    pub fn new(
        config: Config,
        generator: Arc<dyn TextGenerator>,
        fetcher: Arc<dyn ContentFetcher>,
        image_finder: Arc<dyn ImageFinder>,
    ) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                config,
                generator,
                fetcher,
                image_finder,
                cache: ReportCache::new(),
                state: Mutex::new(QueueState {
                    jobs: VecDeque::new(),
                    in_flight: None,
                }),
                notify: Notify::new(),
            }),
        }
    }

    /// 启动后台worker，一次处理一个任务
    pub fn spawn_worker(&self) -> JoinHandle<()> {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            loop {
                if Self::process_next(&inner).await {
                    // 任务间固定停顿，是比单次调用退避更粗粒度的限流保护
                    tokio::time::sleep(inner.config.queue.inter_job_delay()).await;
                } else {
                    inner.notify.notified().await;
                }
            }
        })
    }

    /// 幂等的报告生成请求，返回查询对应的slug
    ///
    /// 未强制时，slug已缓存、已排队或正在生成都是no-op。
    pub async fn request_report(&self, query: &str, force: bool) -> String {
        let slug = slugify(query);
        if slug.is_empty() {
            eprintln!("⚠️ 查询归一化后为空，忽略: {:?}", query);
            return slug;
        }

        let mut state = self.inner.state.lock().await;
        if !force {
            let already_known = self.inner.cache.contains(&slug).await
                || state.jobs.iter().any(|job| job.slug == slug)
                || state.in_flight.as_deref() == Some(slug.as_str());
            if already_known {
                return slug;
            }
        }

        state.jobs.push_back(GenerationJob {
            query: query.to_string(),
            slug: slug.clone(),
            force,
        });
        println!("📋 任务入队: {} (队列长度 {})", slug, state.jobs.len());
        drop(state);

        self.inner.notify.notify_one();
        slug
    }

    /// 报告读路径，任何情况下都不抛错
    pub async fn get_report(&self, slug: &str) -> ReportStatus {
        if let Some(report) = self.inner.cache.get(slug).await {
            return ReportStatus::Cached(report);
        }

        let state = self.inner.state.lock().await;
        let pending = state.jobs.iter().any(|job| job.slug == slug)
            || state.in_flight.as_deref() == Some(slug);
        if pending {
            ReportStatus::Pending
        } else {
            ReportStatus::NotFound
        }
    }

    /// 队列与缓存快照
    pub async fn stats(&self) -> QueueStats {
        let state = self.inner.state.lock().await;
        QueueStats {
            queued: state.jobs.len(),
            cached: self.inner.cache.len().await,
            in_flight: state.in_flight.is_some(),
            queued_slugs: state.jobs.iter().map(|job| job.slug.clone()).collect(),
        }
    }

    /// 一致性扫描：把缺失必需章节的缓存报告强制重新排队
    ///
    /// 针对schema变更后生成器静默退化的自愈手段。
    pub async fn heal_incomplete(&self) -> usize {
        let incomplete = self.inner.cache.incomplete_entries().await;
        let mut requeued = 0;

        for (slug, report) in incomplete {
            let mut state = self.inner.state.lock().await;
            let already_queued = state.jobs.iter().any(|job| job.slug == slug)
                || state.in_flight.as_deref() == Some(slug.as_str());
            if already_queued {
                continue;
            }

            println!("🩹 报告 {} 缺失必需章节，强制重新生成", slug);
            state.jobs.push_back(GenerationJob {
                query: report.article.title.clone(),
                slug,
                force: true,
            });
            requeued += 1;
            drop(state);
            self.inner.notify.notify_one();
        }

        requeued
    }

    /// 处理队首任务；队列为空时返回false
    ///
    /// 测试经由drive_once直接驱动，生产路径经由spawn_worker循环。
    async fn process_next(inner: &Arc<ServiceInner>) -> bool {
        let job = {
            let mut state = inner.state.lock().await;
            match state.jobs.pop_front() {
                Some(job) => {
                    state.in_flight = Some(job.slug.clone());
                    job
                }
                None => return false,
            }
        };

        // 已缓存且未强制的任务直接跳过
        if !job.force && inner.cache.contains(&job.slug).await {
            let mut state = inner.state.lock().await;
            state.in_flight = None;
            return true;
        }

        println!("🚀 worker开始处理任务: {}", job.slug);
        let context = GeneratorContext::new(
            inner.config.clone(),
            inner.generator.clone(),
            inner.fetcher.clone(),
            inner.image_finder.clone(),
        );

        match workflow::run(&context, &job.query, &job.slug).await {
            Ok(report) => {
                inner.cache.insert(&job.slug, report).await;
                println!("✅ 报告已写入缓存: {}", job.slug);
            }
            Err(WorkflowError::RateLimited) => {
                // 重新排到队尾：持续失败的任务不会饿死其它任务
                eprintln!("🔁 任务 {} 被限流，重新入队", job.slug);
                let mut state = inner.state.lock().await;
                state.jobs.push_back(job.clone());
            }
            Err(e) => {
                eprintln!("❌ 任务 {} 生成失败，已丢弃: {}", job.slug, e);
            }
        }

        let mut state = inner.state.lock().await;
        state.in_flight = None;
        true
    }

    #[cfg(test)]
    pub(crate) async fn drive_once(&self) -> bool {
        Self::process_next(&self.inner).await
    }

    #[cfg(test)]
    pub(crate) async fn inject_cached(&self, slug: &str, report: Report) {
        self.inner.cache.insert(slug, report).await;
    }
}
