use serde_json::json;

use crate::generator::section_agent::{SectionAgent, SectionPrompt};
use crate::types::report::{CitedSource, SectionKind};

/// 引用来源写作代理
#[derive(Default)]
pub struct SourcesWriter;

impl SectionAgent for SourcesWriter {
    type Output = Vec<CitedSource>;

    fn kind(&self) -> SectionKind {
        SectionKind::Sources
    }

    fn prompt_template(&self) -> SectionPrompt {
        SectionPrompt {
            role_instruction: "Your task is to list the sources the report draws on. Primary sources (government documents, official statements, original press releases) are preferred when available; well-established news outlets and authoritative sources are also acceptable. Describe what each source contributes.".to_string(),

            example: json!([
                {
                    "name": "Official Government Agency",
                    "type": "Primary Source",
                    "description": "Direct source of information",
                    "url": "https://official-source.gov"
                }
            ]),

            closing_instruction: "Now, using the provided web content, generate the 'cited_sources' section of the report. Adhere to the example format precisely and only cite URLs that appear in the provided content.".to_string(),
        }
    }
}
