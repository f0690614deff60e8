use serde_json::json;

use crate::generator::section_agent::{SectionAgent, SectionPrompt};
use crate::types::report::{ConflictingInfo, SectionKind};

/// 冲突检测代理 - 存在冲突时至少2条，否则为空列表
///
/// 引文与来源的唯一性最终由聚合阶段的去重兜底，提示词中的约束
/// 只是第一道防线。
#[derive(Default)]
pub struct ConflictsWriter;

impl SectionAgent for ConflictsWriter {
    type Output = Vec<ConflictingInfo>;

    fn kind(&self) -> SectionKind {
        SectionKind::Conflicts
    }

    fn prompt_template(&self) -> SectionPrompt {
        SectionPrompt {
            role_instruction: r#"You are a specialized conflict detection agent focused on identifying and analyzing conflicts between different sources in research data.

Your primary goal is to find factual disputes, contradictions, opposing claims, and conflicting interpretations in the provided web content. You NEVER fabricate conflicts or sources.

CONTENT REQUIREMENTS:
- Provide AT LEAST 2 different conflicts on the subject when conflicts exist
- Each conflict should represent a distinct factual dispute or contradiction
- Ensure each conflict has a clear, distinct description of what is being disputed
- Avoid redundant or similar conflicts

CRITICAL QUOTE AND SOURCE DEDUPLICATION RULE:
- Quotes used in this section MUST be different from quotes used in other sections (raw_facts, perspectives, timeline_items)
- NO quote may be repeated within this section itself
- NO source may be reused within this section itself; each source can appear only once across all conflicts
- If a quote or source has already been used anywhere else, find alternative quotes from different sources

Conflict types to look for:
1. Factual Disputes: different numbers, dates, statistics, or verifiable facts
2. Interpretive Differences: different conclusions drawn from the same data
3. Methodological Conflicts: different research approaches or methodologies
4. Bias Patterns: systematic differences in reporting or presentation
5. Source Credibility: conflicts between authoritative and non-authoritative sources"#
                .to_string(),

            example: json!([
                {
                    "conflict_id": "conflict_001",
                    "conflict_type": "factual_dispute",
                    "conflict_description": "Description of the specific conflict or contradiction",
                    "source_a": {
                        "name": "First Source Name",
                        "quote": "Exact quote from first source",
                        "url": "https://first-source.com/article",
                        "claim": "What this source claims"
                    },
                    "source_b": {
                        "name": "Opposing Source Name",
                        "quote": "Exact conflicting quote from opposing source",
                        "url": "https://opposing-source.com/article",
                        "claim": "What the opposing source claims"
                    },
                    "resolution_status": "unresolved",
                    "severity": "high"
                }
            ]),

            closing_instruction: "Now, analyze the provided web content to identify at least 2 different conflicts when they exist. For each conflict, clearly describe what is disputed, provide exact quotes from both sides, include source URLs for verification, categorize the conflict type and assess its severity. If no conflicts are found, return an empty array [].".to_string(),
        }
    }
}
