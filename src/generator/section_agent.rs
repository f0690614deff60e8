use anyhow::anyhow;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::generator::context::{GeneratorContext, MemoryScope, ScopedKeys};
use crate::llm::decode::lenient_decode;
use crate::llm::invoker::{CallError, InvokeError, RetryPolicy, with_retry};
use crate::types::fetched::FetchedItem;
use crate::types::report::SectionKind;

/// 所有章节写作代理共享的行为准则
///
/// 引号守则：引号内的内容必须与原始出处逐字一致，仅允许省略号与
/// 方括号两类编辑；引号外的内容可以转述。
pub const WRITER_PREAMBLE: &str = r#"You are an expert writing agent focused on real-time, non-partisan research. Your sole purpose is to generate a specific section of a research report based on provided web content.

IMPORTANT: You NEVER fabricate data, quotes, articles, or URLs. You only work with real content from the provided sources.

Quote guide: Any content you write within "" must never be paraphrased or rewritten, while content you write outside of "" can be paraphrased. They must be shown exactly as originally published. The only permitted edits to a quote are:
    a. Ellipses: to remove extraneous content and make the quote more concise
    b. Square brackets: to clarify a word or replace a pronoun with a noun for better readability

You MUST generate a valid JSON output that strictly follows the structure and field names of the example below.
Do not add any commentary, explanations, or any text outside of the JSON output."#;

/// 章节提示词模板
#[derive(Debug, Clone)]
pub struct SectionPrompt {
    /// 章节专属的任务设定与内容约束
    pub role_instruction: String,
    /// 嵌入提示词的输出格式示例
    pub example: serde_json::Value,
    /// 结尾的强调性指令
    pub closing_instruction: String,
}

impl SectionPrompt {
    /// 拼装完整的系统提示词
    pub fn system_prompt(&self) -> String {
        format!(
            "{}\n\n{}\n\n### EXAMPLE FORMAT ###\n```json\n{}\n```",
            self.role_instruction,
            WRITER_PREAMBLE,
            serde_json::to_string_pretty(&self.example).unwrap_or_default()
        )
    }
}

/// 章节生成代理 - 每种SectionKind一个实现
///
/// execute为完全标准化的默认实现：拼装提示词、带退避调用生成后端、
/// 宽容解码、写入运行状态。各实现只需声明类型与提示词模板。
#[async_trait]
pub trait SectionAgent: Send + Sync {
    /// 章节payload类型 - 必须支持JSON序列化
    type Output: JsonSchema + for<'a> Deserialize<'a> + Serialize + Send + Sync + 'static;

    /// 本代理负责的章节
    fn kind(&self) -> SectionKind;

    /// 章节提示词模板
    fn prompt_template(&self) -> SectionPrompt;

    /// 默认实现的execute方法
    async fn execute(&self, context: &GeneratorContext) -> Result<(), InvokeError> {
        let fetched: Vec<FetchedItem> = context
            .get_from_memory(MemoryScope::FETCH, ScopedKeys::FETCHED_ITEMS)
            .await
            .ok_or_else(|| InvokeError::Fatal(anyhow!("fetched items unavailable in memory")))?;

        let template = self.prompt_template();
        let system_prompt = template.system_prompt();
        let user_prompt = build_user_prompt(self.kind(), &template, &fetched);

        let policy = RetryPolicy::from_llm_config(&context.config.llm);
        let generator = context.generator.clone();

        let payload: Self::Output = with_retry(&policy, || async {
            let raw = generator.complete(&system_prompt, &user_prompt).await?;
            lenient_decode::<Self::Output>(&raw).map_err(|e| CallError::Decode(e.to_string()))
        })
        .await?;

        context
            .store_to_memory(MemoryScope::SECTIONS, self.kind().as_str(), &payload)
            .await
            .map_err(InvokeError::Fatal)?;

        Ok(())
    }
}

/// 构建标准的用户提示词：检索素材 + 结尾指令
fn build_user_prompt(kind: SectionKind, template: &SectionPrompt, fetched: &[FetchedItem]) -> String {
    let mut prompt = format!(
        "Generate the '{}' section of the report based on the following researched web content:\n\n",
        kind.as_str()
    );

    if fetched.is_empty() {
        prompt.push_str("(No web content could be retrieved for this query.)\n\n");
    }
    for item in fetched {
        prompt.push_str(&format!("URL: {}\nContent: {}\n\n", item.url, item.text));
    }

    prompt.push_str(&template.closing_instruction);
    prompt
}
