use std::future::Future;
use std::pin::Pin;

use crate::generator::context::GeneratorContext;
use crate::generator::images;
use crate::generator::section_agent::SectionAgent;
use crate::llm::invoker::InvokeError;
use crate::types::report::SectionKind;

pub mod conflicts;
pub mod facts;
pub mod narrative;
pub mod perspectives;
pub mod sources;
pub mod summary;
pub mod timeline;

pub use conflicts::ConflictsWriter;
pub use facts::FactsWriter;
pub use narrative::NarrativeWriter;
pub use perspectives::PerspectivesWriter;
pub use sources::SourcesWriter;
pub use summary::SummaryWriter;
pub use timeline::TimelineWriter;

/// 章节分支的执行结果
pub type BranchOutcome = (SectionKind, Result<(), InvokeError>);

type BranchFuture = Pin<Box<dyn Future<Output = BranchOutcome> + Send>>;

fn branch<A>(agent: A, context: GeneratorContext) -> BranchFuture
where
    A: SectionAgent + 'static,
{
    Box::pin(async move {
        let kind = agent.kind();
        let result = agent.execute(&context).await;
        (kind, result)
    })
}

/// 为一次运行展开全部章节生成分支
///
/// 七个分支互相独立、无顺序保证；每个分支只写入sections中自己的键。
/// Sources分支在成功后串联ImageAttach步骤，保证图片字段单一生产者。
pub fn branch_futures(context: &GeneratorContext, query: &str) -> Vec<BranchFuture> {
    let mut futures: Vec<BranchFuture> = vec![
        branch(NarrativeWriter, context.clone()),
        branch(SummaryWriter, context.clone()),
        branch(TimelineWriter, context.clone()),
        branch(FactsWriter, context.clone()),
        branch(PerspectivesWriter, context.clone()),
        branch(ConflictsWriter, context.clone()),
    ];

    let sources_context = context.clone();
    let hero_query = query.to_string();
    futures.push(Box::pin(async move {
        let result = SourcesWriter.execute(&sources_context).await;
        if result.is_ok() {
            if let Err(e) = images::attach(&sources_context, &hero_query).await {
                eprintln!("⚠️ 配图步骤失败，保留占位引用: {}", e);
            }
        }
        (SectionKind::Sources, result)
    }));

    futures
}
