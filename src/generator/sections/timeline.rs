use serde_json::json;

use crate::generator::section_agent::{SectionAgent, SectionPrompt};
use crate::types::report::{SectionKind, TimelineItem};

/// 时间线写作代理
#[derive(Default)]
pub struct TimelineWriter;

impl SectionAgent for TimelineWriter {
    type Output = Vec<TimelineItem>;

    fn kind(&self) -> SectionKind {
        SectionKind::Timeline
    }

    fn prompt_template(&self) -> SectionPrompt {
        SectionPrompt {
            role_instruction: "Your task is to build a bullet-point timeline of events when relevant to the topic. Each entry carries the date, what happened, and the source it came from. Return an empty list if the topic has no meaningful chronology.".to_string(),

            example: json!([
                {
                    "date": "2024-01-01T00:00:00Z",
                    "title": "Event Title",
                    "description": "Description with direct quote from source",
                    "type": "Event Type",
                    "source_label": "Official Source Name",
                    "source_url": "https://official-source.gov/document"
                }
            ]),

            closing_instruction: "Now, using the provided web content, generate the 'timeline_items' section of the report. Adhere to the example format precisely and ensure all quotes are exact from the sources.".to_string(),
        }
    }
}
