use crate::generator::context::{GeneratorContext, MemoryScope, ScopedKeys};
use crate::llm::invoker::{InvokeError, RetryPolicy, with_retry};
use crate::types::fetched::SearchPlan;

/// 调研阶段系统提示词
///
/// 源自实时、无党派立场的调研助手设定：只允许基于真实来源作答。
const RESEARCH_SYSTEM_PROMPT: &str = r#"You are a real-time, non-partisan research assistant. You NEVER fabricate data, quotes, articles, or URLs.

Your task is to turn a raw user query into a focused web-search request. Favor primary sources when available: official statements, government documents, original press releases, and reputable news outlets. Places where US law text and congress hearings can be found include https://www.congress.gov/ and https://www.govinfo.gov/; official statements from the White House are published at https://www.whitehouse.gov/news/.

Return a JSON object with exactly two fields:
- "focused_query": a single search query optimized to surface primary and authoritative sources for the topic
- "category": one broad topic category in lowercase (politics, technology, business, health, environment, international, or general)

Do not add any commentary outside of the JSON output."#;

/// Research状态：把原始查询提炼为聚焦的检索计划
///
/// provider致命错误会中止整个运行；速率限制耗尽向上传播由队列重排；
/// 仅解码失败退化为直接使用原始查询。
pub async fn formulate(context: &GeneratorContext, query: &str) -> Result<SearchPlan, InvokeError> {
    println!("🔬 调研阶段：提炼检索计划...");

    let policy = RetryPolicy::from_llm_config(&context.config.llm);
    let user_prompt = format!("Today you are researching \"{}\". Formulate the search request.", query);
    let generator = context.generator.clone();

    let plan = match with_retry(&policy, || async {
        generator
            .formulate_search(RESEARCH_SYSTEM_PROMPT, &user_prompt)
            .await
    })
    .await
    {
        Ok(plan) => plan,
        Err(InvokeError::Decode(e)) => {
            eprintln!("⚠️ 检索计划解码失败，退化为原始查询: {}", e);
            SearchPlan::fallback(query)
        }
        Err(other) => return Err(other),
    };

    context
        .store_to_memory(MemoryScope::RESEARCH, ScopedKeys::SEARCH_PLAN, &plan)
        .await
        .map_err(InvokeError::Fatal)?;

    println!("✅ 调研完成：聚焦查询 \"{}\"", plan.focused_query);
    Ok(plan)
}
