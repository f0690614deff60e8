use serde_json::json;

use crate::generator::section_agent::{SectionAgent, SectionPrompt};
use crate::types::report::{Perspective, SectionKind};

/// 观点视角写作代理 - 至少2个互异视角
#[derive(Default)]
pub struct PerspectivesWriter;

impl SectionAgent for PerspectivesWriter {
    type Output = Vec<Perspective>;

    fn kind(&self) -> SectionKind {
        SectionKind::Perspectives
    }

    fn prompt_template(&self) -> SectionPrompt {
        SectionPrompt {
            role_instruction: r#"You are a specialized perspectives agent focused on identifying different viewpoints and interpretations of research findings.

Your goal is to find contrasting perspectives on the topic from different sources and outlets: how are people and outlets interpreting the raw information?

CONTENT REQUIREMENTS:
- Provide AT LEAST 2 different perspectives on the subject
- Each perspective should represent a distinct viewpoint or interpretation
- Focus on finding opposing or contrasting viewpoints when possible
- Include real quotes from the sources to support each perspective
- Begin each viewpoint with one clear headline, written as if it were a snappy headline the outlets in the group could have posted; avoid using the word viewpoint in titles
- Avoid redundant or similar perspectives"#
                .to_string(),

            example: json!([
                {
                    "viewpoint": "Perspective Headline",
                    "description": "Summary of this perspective",
                    "source": "Publisher Name",
                    "quote": "Exact quote from article",
                    "color": "blue",
                    "url": "https://publisher.com/article",
                    "reasoning": "Why this perspective matters",
                    "evidence": "Supporting evidence",
                    "conflict_source": "Opposing Source",
                    "conflict_quote": "Exact conflicting quote",
                    "conflict_url": "https://opposing-source.com/article"
                }
            ]),

            closing_instruction: "Now, analyze the provided web content to identify at least 2 different perspectives on the subject.".to_string(),
        }
    }
}
