use thiserror::Error;

use crate::generator::assembler;
use crate::generator::context::{GeneratorContext, MemoryScope, ScopedKeys};
use crate::generator::research;
use crate::generator::sections;
use crate::llm::invoker::InvokeError;
use crate::types::report::Report;
use crate::utils::threads::do_parallel_with_limit;

/// 工作流状态
///
/// 状态沿固定DAG单向推进：Research → Fetching → Generating →
/// Aggregating → Complete/Failed，没有回边。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowPhase {
    Research,
    Fetching,
    Generating,
    Aggregating,
    Complete,
    Failed,
}

impl WorkflowPhase {
    fn as_str(&self) -> &'static str {
        match self {
            WorkflowPhase::Research => "research",
            WorkflowPhase::Fetching => "fetching",
            WorkflowPhase::Generating => "generating",
            WorkflowPhase::Aggregating => "aggregating",
            WorkflowPhase::Complete => "complete",
            WorkflowPhase::Failed => "failed",
        }
    }
}

/// 工作流终态错误
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// 速率限制耗尽导致整个运行被饿死，任务由队列重排重试
    #[error("generation starved by provider rate limits")]
    RateLimited,

    /// Research状态的致命失败，中止整个运行
    #[error("research stage failed: {0}")]
    ResearchFailed(String),

    /// 装配后的报告未通过结构校验，属于结构性缺陷，不自动重试
    #[error("assembled report failed validation: {0}")]
    Validation(String),
}

fn transition(verbose: bool, phase: WorkflowPhase) {
    if verbose {
        println!("   ▸ 工作流进入 {} 状态", phase.as_str());
    }
}

/// 对单个查询执行一次完整的报告生成工作流
///
/// 章节分支各自带退避重试；重试耗尽的分支降级为缺失章节而不是
/// 让整个运行失败。引擎层不再叠加重试。
pub async fn run(
    context: &GeneratorContext,
    query: &str,
    slug: &str,
) -> Result<Report, WorkflowError> {
    let verbose = context.config.verbose;
    println!("🚀 开始生成研究报告: \"{}\"", query);

    // Research：提炼检索计划，此处的致命失败中止整个运行
    transition(verbose, WorkflowPhase::Research);
    let plan = match research::formulate(context, query).await {
        Ok(plan) => plan,
        Err(InvokeError::RateLimitExceeded { .. }) => {
            transition(verbose, WorkflowPhase::Failed);
            return Err(WorkflowError::RateLimited);
        }
        Err(e) => {
            transition(verbose, WorkflowPhase::Failed);
            return Err(WorkflowError::ResearchFailed(e.to_string()));
        }
    };

    // Fetching：抓取失败已在网关内退化为空结果
    transition(verbose, WorkflowPhase::Fetching);
    println!("🔍 检索网络内容...");
    let fetched = context.fetcher.fetch(&plan.focused_query).await;
    println!("   🔭 获取到 {} 条内容", fetched.len());
    if context
        .store_to_memory(MemoryScope::FETCH, ScopedKeys::FETCHED_ITEMS, &fetched)
        .await
        .is_err()
    {
        transition(verbose, WorkflowPhase::Failed);
        return Err(WorkflowError::ResearchFailed(
            "failed to persist fetched items".to_string(),
        ));
    }

    // Generating：七个章节分支并发展开，分支间无顺序保证
    transition(verbose, WorkflowPhase::Generating);
    let max_parallels = context.config.llm.max_parallels;
    println!("🤖 并发生成报告章节，最大并发数：{}", max_parallels);

    let branches = sections::branch_futures(context, query);
    let outcomes = do_parallel_with_limit(branches, max_parallels).await;

    for (kind, outcome) in outcomes {
        match outcome {
            Ok(()) => println!("✅ 章节 {} 生成完成", kind),
            Err(InvokeError::Decode(e)) => {
                eprintln!("⚠️ 章节 {} 输出解码失败，将使用占位内容: {}", kind, e)
            }
            Err(InvokeError::RateLimitExceeded { attempts }) => {
                eprintln!(
                    "⚠️ 章节 {} 在 {} 次尝试后仍被限流，将使用占位内容",
                    kind, attempts
                )
            }
            Err(InvokeError::Fatal(e)) => {
                eprintln!("⚠️ 章节 {} 生成失败，将使用占位内容: {}", kind, e)
            }
        }
    }

    // Aggregating：占位补齐、冲突去重、装配与结构校验
    transition(verbose, WorkflowPhase::Aggregating);
    println!("📝 装配最终报告...");
    let report = match assembler::assemble(context, query, slug).await {
        Ok(report) => report,
        Err(message) => {
            transition(verbose, WorkflowPhase::Failed);
            return Err(WorkflowError::Validation(message));
        }
    };

    transition(verbose, WorkflowPhase::Complete);
    println!("✅ 报告生成完成，slug: {}", report.article.slug);
    Ok(report)
}

// Include tests
#[cfg(test)]
mod tests;
