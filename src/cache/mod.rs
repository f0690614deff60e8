use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::types::report::Report;

/// 报告缓存 - slug到已装配报告的进程级映射
///
/// 无TTL、无淘汰。任意数量的并发读者，写入只来自队列的单个
/// 后台worker；单条slug的替换是原子的，强制重新生成时后写者胜出。
pub struct ReportCache {
    entries: RwLock<HashMap<String, Arc<Report>>>,
}

impl Default for ReportCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// 写入报告，已存在时整体替换（不做新旧章节合并）
    pub async fn insert(&self, slug: &str, report: Report) {
        let mut entries = self.entries.write().await;
        if entries.insert(slug.to_string(), Arc::new(report)).is_some() {
            println!("🔄 缓存条目已整体替换: {}", slug);
        }
    }

    pub async fn get(&self, slug: &str) -> Option<Arc<Report>> {
        let entries = self.entries.read().await;
        entries.get(slug).cloned()
    }

    pub async fn contains(&self, slug: &str) -> bool {
        let entries = self.entries.read().await;
        entries.contains_key(slug)
    }

    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// 找出缺失必需章节的缓存报告，供自愈扫描重新排队
    pub async fn incomplete_entries(&self) -> Vec<(String, Arc<Report>)> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|(_, report)| !report.is_complete())
            .map(|(slug, report)| (slug.clone(), report.clone()))
            .collect()
    }
}
