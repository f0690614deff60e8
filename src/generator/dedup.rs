use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::report::{ConflictingInfo, Perspective, RawFactGroup, TimelineItem};

static QUOTED_TEXT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)""#).unwrap());

/// 提取文本中双引号包裹的子串
fn quotes_in(text: &str) -> impl Iterator<Item = String> + '_ {
    QUOTED_TEXT_PATTERN
        .captures_iter(text)
        .map(|cap| cap[1].to_string())
}

/// 收集Facts、Perspectives与Timeline三个章节已占用的全部引文集合U
pub fn collect_reserved_quotes(
    raw_facts: &[RawFactGroup],
    perspectives: &[Perspective],
    timeline_items: &[TimelineItem],
) -> HashSet<String> {
    let mut reserved = HashSet::new();

    for group in raw_facts {
        for fact in &group.facts {
            reserved.extend(quotes_in(fact));
        }
    }

    for perspective in perspectives {
        if let Some(quote) = &perspective.quote {
            if !quote.is_empty() {
                reserved.insert(quote.clone());
            }
        }
        if let Some(quote) = &perspective.conflict_quote {
            if !quote.is_empty() {
                reserved.insert(quote.clone());
            }
        }
    }

    for item in timeline_items {
        reserved.extend(quotes_in(&item.description));
    }

    reserved
}

/// 跨章节去重：过滤Conflicts中复用了引文或来源的条目
///
/// 条目是原子的：任一侧的引文出现在U或先前条目中，或任一侧的
/// 来源名已被占用，则整条丢弃。保留的条目把两侧引文与来源一并
/// 登记，保证最终列表内部两两互斥。
pub fn dedupe_conflicts(
    conflicts: Vec<ConflictingInfo>,
    reserved: &HashSet<String>,
) -> Vec<ConflictingInfo> {
    let mut kept = Vec::with_capacity(conflicts.len());
    let mut used_quotes: HashSet<String> = HashSet::new();
    let mut used_sources: HashSet<String> = HashSet::new();

    for conflict in conflicts {
        let quote_a = conflict.source_a.quote.as_str();
        let quote_b = conflict.source_b.quote.as_str();
        let name_a = conflict.source_a.name.as_str();
        let name_b = conflict.source_b.name.as_str();

        let quote_collision = [quote_a, quote_b]
            .iter()
            .filter(|q| !q.is_empty())
            .any(|q| reserved.contains(*q) || used_quotes.contains(*q));
        let source_collision = [name_a, name_b]
            .iter()
            .filter(|n| !n.is_empty())
            .any(|n| used_sources.contains(*n));
        // 同一条目内部两侧也不允许重复
        let internal_collision = (!quote_a.is_empty() && quote_a == quote_b)
            || (!name_a.is_empty() && name_a == name_b);

        if quote_collision || source_collision || internal_collision {
            eprintln!(
                "⚠️ 丢弃复用引文或来源的冲突条目: {} vs {}",
                name_a, name_b
            );
            continue;
        }

        for quote in [quote_a, quote_b] {
            if !quote.is_empty() {
                used_quotes.insert(quote.to_string());
            }
        }
        for name in [name_a, name_b] {
            if !name.is_empty() {
                used_sources.insert(name.to_string());
            }
        }
        kept.push(conflict);
    }

    kept
}

/// 独立校验步骤：再次确认去重结果确实成立
///
/// 这是针对去重实现本身出错的安全网。发现残留重复时大声记录，
/// 但不中断运行。
pub fn verify_disjoint(conflicts: &[ConflictingInfo], reserved: &HashSet<String>) -> bool {
    let mut seen_quotes: HashSet<&str> = HashSet::new();
    let mut seen_sources: HashSet<&str> = HashSet::new();
    let mut clean = true;

    for (index, conflict) in conflicts.iter().enumerate() {
        for quote in [&conflict.source_a.quote, &conflict.source_b.quote] {
            if quote.is_empty() {
                continue;
            }
            if reserved.contains(quote.as_str()) {
                eprintln!(
                    "❌ 校验失败：冲突条目{}的引文与其它章节重复: {:.60}",
                    index + 1,
                    quote
                );
                clean = false;
            }
            if !seen_quotes.insert(quote) {
                eprintln!(
                    "❌ 校验失败：冲突条目{}内部存在重复引文: {:.60}",
                    index + 1,
                    quote
                );
                clean = false;
            }
        }

        for name in [&conflict.source_a.name, &conflict.source_b.name] {
            if name.is_empty() {
                continue;
            }
            if !seen_sources.insert(name) {
                eprintln!("❌ 校验失败：来源 {} 在冲突章节中被复用", name);
                clean = false;
            }
        }
    }

    if clean {
        println!("✅ 冲突章节去重校验通过：{}条冲突", conflicts.len());
    }
    clean
}
