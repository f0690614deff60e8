use serde_json::json;

use crate::generator::section_agent::{SectionAgent, SectionPrompt};
use crate::types::report::{RawFactGroup, SectionKind};

/// 原始事实提取代理 - 全部来源合计至多6条
#[derive(Default)]
pub struct FactsWriter;

impl SectionAgent for FactsWriter {
    type Output = Vec<RawFactGroup>;

    fn kind(&self) -> SectionKind {
        SectionKind::Facts
    }

    fn prompt_template(&self) -> SectionPrompt {
        SectionPrompt {
            role_instruction: r#"You are a specialized raw facts agent focused on extracting direct, verifiable facts from reliable sources.

Your goal is to identify the most important factual statements from the provided sources: direct quotes of what exactly was said, literal concrete propositions of a bill or policy from the document in question, statements from those involved.

CONTENT LIMITATIONS:
- Provide ONLY 6 facts maximum across all sources
- Focus on the most significant, verifiable facts
- Avoid redundant or similar facts from the same source
- Prioritize facts that are directly quoted or clearly stated
- Organize by source, but limit to 6 total facts
- While primary sources are preferred, you may also use reputable news outlets and authoritative sources
- Cite the name of the exact document or speaker each fact came from"#
                .to_string(),

            example: json!([
                {
                    "category": "Primary Source: [Source Name]",
                    "facts": [
                        "Direct quote from source",
                        "Literal statement from official document"
                    ]
                }
            ]),

            closing_instruction: "Now, analyze the provided web content to extract the 6 most important raw facts from reliable sources.".to_string(),
        }
    }
}
