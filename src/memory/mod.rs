use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Memory元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryMetadata {
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub write_counts: HashMap<String, u64>,
}

impl Default for MemoryMetadata {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMetadata {
    pub fn new() -> Self {
        Self {
            created_at: Utc::now(),
            last_updated: Utc::now(),
            write_counts: HashMap::new(),
        }
    }
}

/// 单次工作流运行的状态存储
///
/// 以`scope:key`组织的JSON值表。并发的章节生成分支各自写入
/// 互不相同的key，因此map插入是唯一的共享可变操作，合并满足
/// 交换律与结合律。
#[derive(Debug, Default)]
pub struct Memory {
    data: HashMap<String, Value>,
    metadata: MemoryMetadata,
}

impl Memory {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            metadata: MemoryMetadata::new(),
        }
    }

    /// 存储数据到指定作用域和键
    pub fn store<T>(&mut self, scope: &str, key: &str, data: T) -> Result<()>
    where
        T: Serialize,
    {
        let full_key = format!("{}:{}", scope, key);
        let serialized = serde_json::to_value(data)?;

        *self
            .metadata
            .write_counts
            .entry(full_key.clone())
            .or_insert(0) += 1;
        self.metadata.last_updated = Utc::now();

        self.data.insert(full_key, serialized);
        Ok(())
    }

    /// 从指定作用域和键获取数据
    pub fn get<T>(&self, scope: &str, key: &str) -> Option<T>
    where
        T: for<'a> Deserialize<'a>,
    {
        let full_key = format!("{}:{}", scope, key);
        self.data
            .get(&full_key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// 检查是否存在指定数据
    pub fn has_data(&self, scope: &str, key: &str) -> bool {
        let full_key = format!("{}:{}", scope, key);
        self.data.contains_key(&full_key)
    }

    /// 列出指定作用域的所有键
    pub fn list_keys(&self, scope: &str) -> Vec<String> {
        let prefix = format!("{}:", scope);
        self.data
            .keys()
            .filter(|key| key.starts_with(&prefix))
            .map(|key| key[prefix.len()..].to_string())
            .collect()
    }

    /// 获取各作用域的条目数统计
    pub fn scope_stats(&self) -> HashMap<String, usize> {
        let mut stats = HashMap::new();
        for key in self.data.keys() {
            let scope = key.split(':').next().unwrap_or("unknown").to_string();
            *stats.entry(scope).or_insert(0) += 1;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::Memory;

    #[test]
    fn test_store_and_get_roundtrip() {
        let mut memory = Memory::new();
        memory
            .store("sections", "raw_facts", vec!["a", "b"])
            .unwrap();

        let facts: Option<Vec<String>> = memory.get("sections", "raw_facts");
        assert_eq!(facts, Some(vec!["a".to_string(), "b".to_string()]));
        assert!(memory.has_data("sections", "raw_facts"));
        assert!(!memory.has_data("sections", "perspectives"));
    }

    #[test]
    fn test_keys_are_scoped() {
        let mut memory = Memory::new();
        memory.store("sections", "article", "x").unwrap();
        memory.store("images", "hero", "y").unwrap();

        assert_eq!(memory.list_keys("sections"), vec!["article".to_string()]);
        assert_eq!(memory.scope_stats().get("images"), Some(&1));
    }

    #[test]
    fn test_last_write_wins() {
        let mut memory = Memory::new();
        memory.store("sections", "article", "old").unwrap();
        memory.store("sections", "article", "new").unwrap();

        assert_eq!(
            memory.get::<String>("sections", "article"),
            Some("new".to_string())
        );
    }
}
