use chrono::Utc;
use uuid::Uuid;

use crate::generator::context::{GeneratorContext, MemoryScope, ScopedKeys};
use crate::generator::dedup;
use crate::generator::images::{FALLBACK_HERO_IMAGE, GENERIC_SOURCE_IMAGE};
use crate::types::fetched::FetchedItem;
use crate::types::report::{
    Article, CitedSource, ConflictingInfo, ExecutiveSummary, Perspective, RawFactGroup, Report,
    SectionKind,
};
use crate::utils::slug::slugify;

/// 分配进程内唯一的报告标识
///
/// 取UUID低31位，保持为正数。
pub fn next_article_id() -> u32 {
    let id = (Uuid::new_v4().as_u128() & 0x7FFF_FFFF) as u32;
    if id == 0 { 1 } else { id }
}

/// 把完成与未完成的章节装配为一份完整报告
///
/// 可用性优先于完备性：缺失章节以带明确标注的占位内容补齐，
/// 而不是让整份报告失败。占位内容与生成内容一样参与冲突去重。
/// 返回Err表示结构校验失败，对本次运行是致命的。
pub async fn assemble(
    context: &GeneratorContext,
    query: &str,
    canonical_slug: &str,
) -> Result<Report, String> {
    let mut article = match context
        .get_from_memory::<Article>(MemoryScope::SECTIONS, SectionKind::Narrative.as_str())
        .await
    {
        Some(article) => article,
        None => {
            log_placeholder(SectionKind::Narrative);
            placeholder_article(query)
        }
    };

    let mut executive_summary = match context
        .get_from_memory::<ExecutiveSummary>(MemoryScope::SECTIONS, SectionKind::Summary.as_str())
        .await
    {
        Some(summary) if !summary.points.is_empty() => summary,
        _ => {
            log_placeholder(SectionKind::Summary);
            placeholder_summary(query)
        }
    };

    let mut timeline_items = context
        .get_from_memory(MemoryScope::SECTIONS, SectionKind::Timeline.as_str())
        .await
        .unwrap_or_else(|| {
            log_placeholder(SectionKind::Timeline);
            Vec::new()
        });

    let mut cited_sources: Vec<CitedSource> = context
        .get_from_memory(MemoryScope::SECTIONS, SectionKind::Sources.as_str())
        .await
        .unwrap_or_else(|| {
            log_placeholder(SectionKind::Sources);
            Vec::new()
        });

    let mut raw_facts: Vec<RawFactGroup> = match context
        .get_from_memory::<Vec<RawFactGroup>>(MemoryScope::SECTIONS, SectionKind::Facts.as_str())
        .await
    {
        Some(groups) if !groups.is_empty() => groups,
        _ => {
            log_placeholder(SectionKind::Facts);
            placeholder_facts(query)
        }
    };

    let mut perspectives: Vec<Perspective> = match context
        .get_from_memory::<Vec<Perspective>>(
            MemoryScope::SECTIONS,
            SectionKind::Perspectives.as_str(),
        )
        .await
    {
        Some(list) if list.len() >= 2 => list,
        _ => {
            log_placeholder(SectionKind::Perspectives);
            placeholder_perspectives(query)
        }
    };

    let conflicting_info: Vec<ConflictingInfo> = context
        .get_from_memory(MemoryScope::SECTIONS, SectionKind::Conflicts.as_str())
        .await
        .unwrap_or_else(|| {
            log_placeholder(SectionKind::Conflicts);
            Vec::new()
        });

    // 跨章节去重：占位内容与生成内容一视同仁
    let reserved = dedup::collect_reserved_quotes(&raw_facts, &perspectives, &timeline_items);
    let mut conflicting_info = dedup::dedupe_conflicts(conflicting_info, &reserved);
    dedup::verify_disjoint(&conflicting_info, &reserved);

    // 元数据与标识
    let fetched_count = context
        .get_from_memory::<Vec<FetchedItem>>(MemoryScope::FETCH, ScopedKeys::FETCHED_ITEMS)
        .await
        .map(|items| items.len())
        .unwrap_or(0);

    let article_id = next_article_id();
    article.id = article_id;
    article.slug = if canonical_slug.is_empty() {
        slugify(&article.title)
    } else {
        canonical_slug.to_string()
    };
    article.published_at = Utc::now().to_rfc3339();
    article.read_time = 5;
    article.source_count = fetched_count as u32;
    if article.category.trim().is_empty() {
        article.category = "Research".to_string();
    }
    if article.author_name.is_none() {
        article.author_name = Some("AI Agent".to_string());
    }
    if article.author_title.is_none() {
        article.author_title = Some("Research Specialist".to_string());
    }

    article.hero_image_url = context
        .get_from_memory::<String>(MemoryScope::IMAGES, ScopedKeys::HERO_IMAGE)
        .await
        .unwrap_or_else(|| FALLBACK_HERO_IMAGE.to_string());

    let source_images = context
        .get_from_memory::<Vec<String>>(MemoryScope::IMAGES, ScopedKeys::SOURCE_IMAGES)
        .await
        .unwrap_or_default();
    for (index, source) in cited_sources.iter_mut().enumerate() {
        let image = source_images
            .get(index)
            .cloned()
            .unwrap_or_else(|| GENERIC_SOURCE_IMAGE.to_string());
        source.image_url = Some(image);
    }

    // 为所有章节盖上同一个article_id
    executive_summary.article_id = article_id;
    for item in timeline_items.iter_mut() {
        item.article_id = article_id;
    }
    for source in cited_sources.iter_mut() {
        source.article_id = article_id;
    }
    for group in raw_facts.iter_mut() {
        group.article_id = article_id;
    }
    for perspective in perspectives.iter_mut() {
        perspective.article_id = article_id;
    }
    for (index, conflict) in conflicting_info.iter_mut().enumerate() {
        conflict.article_id = article_id;
        if conflict.conflict_id.trim().is_empty() {
            conflict.conflict_id = format!("conflict_{:03}", index + 1);
        }
    }

    let report = Report {
        article,
        executive_summary,
        timeline_items,
        cited_sources,
        raw_facts,
        perspectives,
        conflicting_info,
    };

    report.validate()?;
    Ok(report)
}

fn log_placeholder(kind: SectionKind) {
    eprintln!("⚠️ 章节 {} 缺失，使用占位内容", kind);
}

fn placeholder_article(query: &str) -> Article {
    Article {
        id: 0,
        title: format!("Research Report on {}", query),
        slug: String::new(),
        excerpt: "Placeholder report: the narrative section could not be generated.".to_string(),
        content: format!(
            "[Placeholder] The narrative for \"{}\" could not be generated. This report contains the sections that completed successfully.",
            query
        ),
        category: "Research".to_string(),
        published_at: String::new(),
        read_time: 0,
        source_count: 0,
        hero_image_url: String::new(),
        author_name: None,
        author_title: None,
    }
}

fn placeholder_summary(query: &str) -> ExecutiveSummary {
    ExecutiveSummary {
        article_id: 0,
        points: vec![format!(
            "[Placeholder] No executive summary could be generated for \"{}\".",
            query
        )],
    }
}

fn placeholder_facts(query: &str) -> Vec<RawFactGroup> {
    vec![RawFactGroup {
        article_id: 0,
        category: "Research Notes".to_string(),
        facts: vec![format!(
            "[Placeholder] No verified facts could be extracted for \"{}\".",
            query
        )],
    }]
}

fn placeholder_perspectives(query: &str) -> Vec<Perspective> {
    // 占位内容同样满足“至少2个视角”的章节下限
    ["first", "second"]
        .into_iter()
        .map(|ordinal| Perspective {
            article_id: 0,
            viewpoint: format!("[Placeholder] Coverage pending ({})", ordinal),
            description: format!(
                "No {} distinct perspective could be extracted for \"{}\".",
                ordinal, query
            ),
            source: None,
            quote: None,
            color: "gray".to_string(),
            url: None,
            reasoning: None,
            evidence: None,
            conflict_source: None,
            conflict_quote: None,
            conflict_url: None,
        })
        .collect()
}
