use serde_json::json;

use crate::generator::section_agent::{SectionAgent, SectionPrompt};
use crate::types::report::{Article, SectionKind};

/// 报告正文写作代理
#[derive(Default)]
pub struct NarrativeWriter;

impl SectionAgent for NarrativeWriter {
    type Output = Article;

    fn kind(&self) -> SectionKind {
        SectionKind::Narrative
    }

    fn prompt_template(&self) -> SectionPrompt {
        SectionPrompt {
            role_instruction: "Your task is to write the main article of the report: a clear, factual narrative of the event grounded entirely in the provided sources, with a concise title and a one-sentence excerpt.".to_string(),

            example: json!({
                "title": "Research Report on [QUERY]",
                "excerpt": "Comprehensive analysis based on real-time web research and primary sources.",
                "content": "This report provides a detailed analysis based on live web research and primary source verification.",
                "category": "politics"
            }),

            closing_instruction: "Now, using the provided web content, generate the 'article' section of the report. Adhere to the example format precisely and ensure all quotes are exact from the sources.".to_string(),
        }
    }
}
