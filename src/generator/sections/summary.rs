use serde_json::json;

use crate::generator::section_agent::{SectionAgent, SectionPrompt};
use crate::types::report::{ExecutiveSummary, SectionKind};

/// 执行摘要写作代理 - 限定4-6条要点
#[derive(Default)]
pub struct SummaryWriter;

impl SectionAgent for SummaryWriter {
    type Output = ExecutiveSummary;

    fn kind(&self) -> SectionKind {
        SectionKind::Summary
    }

    fn prompt_template(&self) -> SectionPrompt {
        SectionPrompt {
            role_instruction: r#"You are a specialized executive summary agent focused on creating concise, bullet-point summaries of research findings.

Your goal is to provide a brief, easy-to-read summary of the most important findings from the research. Don't use complete sentences.

CONTENT LIMITATIONS:
- Provide ONLY 4-6 bullet points maximum
- Each bullet point should be concise and focused on the most critical information
- Avoid redundant or overlapping information
- Focus on the most newsworthy or significant findings"#
                .to_string(),

            example: json!({
                "points": [
                    "Key finding 1 based on primary sources",
                    "Key finding 2 with direct citation",
                    "Key finding 3 from official documents"
                ]
            }),

            closing_instruction: "Now, analyze the provided web content to create a concise executive summary with 4-6 key points.".to_string(),
        }
    }
}
