use anyhow::Result;

use crate::generator::context::{GeneratorContext, MemoryScope, ScopedKeys};
use crate::types::fetched::SearchPlan;
use crate::types::report::{CitedSource, SectionKind};

/// 主图占位引用，配图检索失败时使用
pub const FALLBACK_HERO_IMAGE: &str =
    "https://images.pexels.com/photos/12345/news-image.jpg";

/// 来源配图占位引用
pub const GENERIC_SOURCE_IMAGE: &str = "https://p-cdn.com/generic-source-logo.png";

/// ImageAttach分支：为正文与每个引用来源补充配图引用
///
/// 在Sources分支完成后由其串联触发，图片字段只有这一个生产者。
/// 配图纯属增强，任何失败都落到占位引用。
pub async fn attach(context: &GeneratorContext, query: &str) -> Result<()> {
    println!("🖼️ 检索配图...");

    let category = context
        .get_from_memory::<SearchPlan>(MemoryScope::RESEARCH, ScopedKeys::SEARCH_PLAN)
        .await
        .map(|plan| plan.category)
        .unwrap_or_else(|| "general".to_string());

    let hero_image = context
        .image_finder
        .find(query, &category)
        .await
        .unwrap_or_else(|| FALLBACK_HERO_IMAGE.to_string());
    context
        .store_to_memory(MemoryScope::IMAGES, ScopedKeys::HERO_IMAGE, &hero_image)
        .await?;

    let cited_sources: Vec<CitedSource> = context
        .get_from_memory(MemoryScope::SECTIONS, SectionKind::Sources.as_str())
        .await
        .unwrap_or_default();

    let mut source_images = Vec::with_capacity(cited_sources.len());
    for source in &cited_sources {
        let image = context
            .image_finder
            .find(&source.name, &category)
            .await
            .unwrap_or_else(|| GENERIC_SOURCE_IMAGE.to_string());
        source_images.push(image);
    }
    context
        .store_to_memory(MemoryScope::IMAGES, ScopedKeys::SOURCE_IMAGES, &source_images)
        .await?;

    println!("✅ 配图完成：主图1张，来源图{}张", cited_sources.len());
    Ok(())
}
