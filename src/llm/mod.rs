use async_trait::async_trait;

use crate::types::fetched::SearchPlan;

pub mod client;
pub mod decode;
pub mod invoker;

pub use invoker::{CallError, InvokeError, RetryPolicy, with_retry};

/// 文本生成后端 - 核心消费的外部协作方接口
///
/// 输出是未受信任的文本，只做解析，不做执行。
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// 单轮补全，失败按可重试/致命分类返回
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, CallError>;

    /// 从查询生成检索计划
    ///
    /// 默认实现走complete加宽容解码；具备结构化提取能力的后端可覆写。
    async fn formulate_search(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<SearchPlan, CallError> {
        let raw = self.complete(system_prompt, user_prompt).await?;
        decode::lenient_decode::<SearchPlan>(&raw)
            .map_err(|e| CallError::Decode(e.to_string()))
    }
}
