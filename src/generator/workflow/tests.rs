use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::gateway::{ContentFetcher, ImageFinder};
use crate::generator::context::GeneratorContext;
use crate::generator::workflow::{self, WorkflowError};
use crate::llm::invoker::CallError;
use crate::llm::TextGenerator;
use crate::types::fetched::FetchedItem;

/// A scripted backend that answers each section prompt with canned JSON.
struct ScriptedGenerator {
    failing_sections: HashSet<&'static str>,
    rate_limit_research: bool,
    conflicts_json: String,
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self {
            failing_sections: HashSet::new(),
            rate_limit_research: false,
            conflicts_json: "[]".to_string(),
        }
    }
}

impl ScriptedGenerator {
    fn payload_for(&self, section: &str) -> String {
        match section {
            "article" => r#"{
                "title": "City Council Budget Vote",
                "excerpt": "The council approved the annual budget.",
                "content": "The city council approved the annual budget after public comment.",
                "category": "politics"
            }"#
            .to_string(),
            "executive_summary" => r#"{
                "points": [
                    "Budget approved 7-2",
                    "Public comment lasted two hours",
                    "Parks funding increased",
                    "Transit funding unchanged"
                ]
            }"#
            .to_string(),
            "timeline_items" => r#"[
                {
                    "date": "2024-03-01T00:00:00Z",
                    "title": "Budget introduced",
                    "description": "The draft budget was introduced to the council",
                    "type": "Procedural",
                    "source_label": "City Records",
                    "source_url": "https://city.example.gov/records"
                }
            ]"#
            .to_string(),
            "cited_sources" => r#"[
                {
                    "name": "City Records Office",
                    "type": "Primary Source",
                    "description": "Official meeting minutes",
                    "url": "https://city.example.gov/records"
                },
                {
                    "name": "Local Tribune",
                    "type": "News Outlet",
                    "description": "Coverage of the vote",
                    "url": "https://tribune.example.com/budget"
                }
            ]"#
            .to_string(),
            "raw_facts" => r#"[
                {
                    "category": "Primary Source: City Records Office",
                    "facts": [
                        "The minutes state the budget passed \"with a 7-2 vote\"",
                        "Total appropriations are \"$142 million\" for the fiscal year"
                    ]
                }
            ]"#
            .to_string(),
            "perspectives" => r#"[
                {
                    "viewpoint": "A Win For Parks",
                    "description": "Supporters highlight the parks increase",
                    "source": "Local Tribune",
                    "quote": "the biggest parks investment in a decade",
                    "color": "green",
                    "url": "https://tribune.example.com/budget"
                },
                {
                    "viewpoint": "Transit Riders Left Behind",
                    "description": "Critics point to flat transit funding",
                    "source": "Transit Weekly",
                    "quote": "riders got nothing new this year",
                    "color": "red",
                    "url": "https://transit.example.com/budget"
                }
            ]"#
            .to_string(),
            "conflicting_info" => self.conflicts_json.clone(),
            other => panic!("unexpected section request: {}", other),
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, _system_prompt: &str, user_prompt: &str) -> Result<String, CallError> {
        if user_prompt.contains("Formulate the search request") {
            if self.rate_limit_research {
                return Err(CallError::RateLimited { retry_after: None });
            }
            return Ok(r#"{"focused_query": "city council budget vote official minutes", "category": "politics"}"#.to_string());
        }

        let section = [
            "article",
            "executive_summary",
            "timeline_items",
            "cited_sources",
            "raw_facts",
            "perspectives",
            "conflicting_info",
        ]
        .into_iter()
        .find(|s| user_prompt.contains(&format!("'{}'", s)))
        .expect("prompt does not name a section");

        if self.failing_sections.contains(section) {
            // Unparsable output exercises the decode-failure path
            return Ok("I could not produce JSON for this request.".to_string());
        }
        Ok(self.payload_for(section))
    }
}

struct StaticFetcher {
    items: Vec<FetchedItem>,
}

#[async_trait]
impl ContentFetcher for StaticFetcher {
    async fn fetch(&self, _query: &str) -> Vec<FetchedItem> {
        self.items.clone()
    }

    async fn deepen(&self, _url: &str) -> Option<String> {
        None
    }
}

struct StaticImageFinder {
    url: Option<String>,
}

#[async_trait]
impl ImageFinder for StaticImageFinder {
    async fn find(&self, _query: &str, _category: &str) -> Option<String> {
        self.url.clone()
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.llm.retry_attempts = 2;
    config.llm.retry_base_delay_ms = 1;
    config.llm.max_parallels = 4;
    config
}

fn two_fetched_items() -> Vec<FetchedItem> {
    vec![
        FetchedItem::new(
            "https://city.example.gov/records",
            "The budget passed with a 7-2 vote. Total appropriations are $142 million.",
        ),
        FetchedItem::new(
            "https://tribune.example.com/budget",
            "The council approved the budget after two hours of public comment.",
        ),
    ]
}

fn context_with(generator: ScriptedGenerator, items: Vec<FetchedItem>) -> GeneratorContext {
    GeneratorContext::new(
        test_config(),
        Arc::new(generator),
        Arc::new(StaticFetcher { items }),
        Arc::new(StaticImageFinder {
            url: Some("https://images.example.com/hero.jpg".to_string()),
        }),
    )
}

#[tokio::test]
async fn test_full_run_produces_valid_report() {
    let context = context_with(ScriptedGenerator::default(), two_fetched_items());

    let report = workflow::run(&context, "city council budget vote", "city-council-budget-vote")
        .await
        .unwrap();

    assert!(report.validate().is_ok());
    assert_eq!(report.article.slug, "city-council-budget-vote");
    assert_eq!(report.article.source_count, 2);
    assert_eq!(
        report.article.hero_image_url,
        "https://images.example.com/hero.jpg"
    );

    // Scenario: two agreeing fetched items produce bounded sections and no conflicts
    let total_facts: usize = report.raw_facts.iter().map(|g| g.facts.len()).sum();
    assert!(total_facts <= 6);
    assert!(report.perspectives.len() >= 2);
    assert!(report.conflicting_info.is_empty());

    // Every section carries the narrative's article id
    let id = report.article.id;
    assert!(id > 0);
    assert!(report.timeline_items.iter().all(|i| i.article_id == id));
    assert!(report.cited_sources.iter().all(|s| s.article_id == id));
    assert!(report.cited_sources.iter().all(|s| s.image_url.is_some()));
}

#[tokio::test]
async fn test_two_failed_generators_still_yield_valid_report() {
    let mut generator = ScriptedGenerator::default();
    generator.failing_sections.insert("executive_summary");
    generator.failing_sections.insert("raw_facts");

    let context = context_with(generator, two_fetched_items());
    let report = workflow::run(&context, "city council budget vote", "city-council-budget-vote")
        .await
        .unwrap();

    // Availability over completeness: placeholders round-trip validation
    assert!(report.validate().is_ok());
    assert!(report.executive_summary.points[0].contains("[Placeholder]"));
    assert!(report.raw_facts[0].facts[0].contains("[Placeholder]"));
    // Untouched sections keep their generated content
    assert_eq!(report.perspectives.len(), 2);
}

#[tokio::test]
async fn test_rate_limited_research_starves_the_run() {
    let mut generator = ScriptedGenerator::default();
    generator.rate_limit_research = true;

    let context = context_with(generator, two_fetched_items());
    let result = workflow::run(&context, "any query", "any-query").await;

    assert!(matches!(result, Err(WorkflowError::RateLimited)));
}

#[tokio::test]
async fn test_empty_fetch_degrades_instead_of_failing() {
    let context = context_with(ScriptedGenerator::default(), Vec::new());

    let report = workflow::run(&context, "obscure topic", "obscure-topic")
        .await
        .unwrap();

    assert!(report.validate().is_ok());
    assert_eq!(report.article.source_count, 0);
}

#[tokio::test]
async fn test_conflict_reusing_a_fact_quote_is_dropped() {
    let mut generator = ScriptedGenerator::default();
    // First entry reuses a quote that raw_facts already carries; second is clean
    generator.conflicts_json = r#"[
        {
            "conflict_type": "factual_dispute",
            "conflict_description": "Disputed vote margin",
            "source_a": {"name": "City Records Office", "quote": "with a 7-2 vote", "url": "", "claim": ""},
            "source_b": {"name": "Evening Post", "quote": "the vote was 6-3", "url": "", "claim": ""},
            "resolution_status": "unresolved",
            "severity": "high"
        },
        {
            "conflict_type": "factual_dispute",
            "conflict_description": "Disputed total",
            "source_a": {"name": "Budget Watch", "quote": "the real total is higher", "url": "", "claim": ""},
            "source_b": {"name": "City Hall Blog", "quote": "the published total is final", "url": "", "claim": ""},
            "resolution_status": "unresolved",
            "severity": "medium"
        }
    ]"#
    .to_string();

    let context = context_with(generator, two_fetched_items());
    let report = workflow::run(&context, "city council budget vote", "city-council-budget-vote")
        .await
        .unwrap();

    assert_eq!(report.conflicting_info.len(), 1);
    assert_eq!(report.conflicting_info[0].source_a.name, "Budget Watch");
    assert_eq!(report.conflicting_info[0].conflict_id, "conflict_001");
}
