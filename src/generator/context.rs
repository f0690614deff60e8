use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::Config;
use crate::gateway::{ContentFetcher, ImageFinder};
use crate::llm::TextGenerator;
use crate::memory::Memory;

/// Memory作用域
pub struct MemoryScope;

impl MemoryScope {
    pub const RESEARCH: &'static str = "research";
    pub const FETCH: &'static str = "fetch";
    pub const SECTIONS: &'static str = "sections";
    pub const IMAGES: &'static str = "images";
}

/// Memory键
pub struct ScopedKeys;

impl ScopedKeys {
    pub const SEARCH_PLAN: &'static str = "search_plan";
    pub const FETCHED_ITEMS: &'static str = "fetched_items";
    pub const HERO_IMAGE: &'static str = "hero_image";
    pub const SOURCE_IMAGES: &'static str = "source_images";
}

/// 单次工作流运行的上下文
///
/// 每次运行持有独立的Memory；生成、检索、配图后端在运行之间共享。
#[derive(Clone)]
pub struct GeneratorContext {
    /// 配置
    pub config: Config,
    /// 文本生成后端
    pub generator: Arc<dyn TextGenerator>,
    /// 内容抓取网关
    pub fetcher: Arc<dyn ContentFetcher>,
    /// 配图检索
    pub image_finder: Arc<dyn ImageFinder>,
    /// 运行状态存储
    pub memory: Arc<RwLock<Memory>>,
}

impl GeneratorContext {
    /// 创建新的生成器上下文
    pub fn new(
        config: Config,
        generator: Arc<dyn TextGenerator>,
        fetcher: Arc<dyn ContentFetcher>,
        image_finder: Arc<dyn ImageFinder>,
    ) -> Self {
        Self {
            config,
            generator,
            fetcher,
            image_finder,
            memory: Arc::new(RwLock::new(Memory::new())),
        }
    }

    /// 存储数据到 Memory
    pub async fn store_to_memory<T>(&self, scope: &str, key: &str, data: T) -> Result<()>
    where
        T: Serialize + Send + Sync,
    {
        let mut memory = self.memory.write().await;
        memory.store(scope, key, data)
    }

    /// 从 Memory 获取数据
    pub async fn get_from_memory<T>(&self, scope: &str, key: &str) -> Option<T>
    where
        T: for<'a> Deserialize<'a> + Send + Sync,
    {
        let memory = self.memory.read().await;
        memory.get(scope, key)
    }

    /// 检查Memory中是否存在指定数据
    pub async fn has_memory_data(&self, scope: &str, key: &str) -> bool {
        let memory = self.memory.read().await;
        memory.has_data(scope, key)
    }

    /// 获取Memory使用统计
    pub async fn get_memory_stats(&self) -> HashMap<String, usize> {
        let memory = self.memory.read().await;
        memory.scope_stats()
    }
}
