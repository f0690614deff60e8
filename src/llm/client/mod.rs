//! LLM客户端 - 提供统一的LLM服务接口

use anyhow::Result;
use async_trait::async_trait;

use crate::config::Config;
use crate::llm::invoker::{CallError, classify_failure};
use crate::llm::TextGenerator;
use crate::types::fetched::SearchPlan;

mod providers;

use providers::ProviderClient;

/// 长提示词阈值，超过则改用高质量模型
const POWERFUL_MODEL_THRESHOLD: usize = 32 * 1024;

/// LLM客户端 - 提供统一的LLM服务接口
#[derive(Clone)]
pub struct LLMClient {
    config: Config,
    client: ProviderClient,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: Config) -> Result<Self> {
        let client = ProviderClient::new(&config.llm)?;
        Ok(Self { client, config })
    }

    /// 检查模型连接和功能是否正常
    pub async fn check_connection(&self) -> Result<()> {
        println!("🔄 正在检查模型连接...");
        match self
            .complete("System: You are a helpful assistant.", "Hello")
            .await
        {
            Ok(_) => {
                println!("✅ 模型连接正常");
                Ok(())
            }
            Err(e) => {
                eprintln!("❌ 模型连接失败: {}", e);
                Err(anyhow::anyhow!(e))
            }
        }
    }

    /// 按提示词规模选择模型
    fn evaluate_befitting_model(&self, system_prompt: &str, user_prompt: &str) -> String {
        let llm_config = &self.config.llm;
        if system_prompt.len() + user_prompt.len() <= POWERFUL_MODEL_THRESHOLD {
            llm_config.model_efficient.clone()
        } else {
            llm_config.model_powerful.clone()
        }
    }
}

#[async_trait]
impl TextGenerator for LLMClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, CallError> {
        let model = self.evaluate_befitting_model(system_prompt, user_prompt);
        let agent = self
            .client
            .create_agent(&model, system_prompt, &self.config.llm);

        agent.prompt(user_prompt).await.map_err(classify_failure)
    }

    /// 覆写默认实现，使用provider的结构化提取能力
    async fn formulate_search(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<SearchPlan, CallError> {
        let model = self.evaluate_befitting_model(system_prompt, user_prompt);
        let extractor =
            self.client
                .create_extractor::<SearchPlan>(&model, system_prompt, &self.config.llm);

        extractor.extract(user_prompt).await.map_err(classify_failure)
    }
}
