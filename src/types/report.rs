use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// 报告章节类型 - 封闭枚举，每种类型对应一个并发生成分支
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    Narrative,
    Summary,
    Timeline,
    Sources,
    Facts,
    Perspectives,
    Conflicts,
}

impl SectionKind {
    /// 所有必需章节，工作流按此集合展开并发分支
    pub const ALL: [SectionKind; 7] = [
        SectionKind::Narrative,
        SectionKind::Summary,
        SectionKind::Timeline,
        SectionKind::Sources,
        SectionKind::Facts,
        SectionKind::Perspectives,
        SectionKind::Conflicts,
    ];

    /// 章节在Memory与提示词中的标识
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Narrative => "article",
            SectionKind::Summary => "executive_summary",
            SectionKind::Timeline => "timeline_items",
            SectionKind::Sources => "cited_sources",
            SectionKind::Facts => "raw_facts",
            SectionKind::Perspectives => "perspectives",
            SectionKind::Conflicts => "conflicting_info",
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 报告正文（叙事章节）
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Article {
    /// 进程内唯一的报告标识，由装配器分配
    #[serde(default)]
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    pub content: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub read_time: u32,
    #[serde(default)]
    pub source_count: u32,
    #[serde(default)]
    pub hero_image_url: String,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_title: Option<String>,
}

/// 执行摘要：4-6条要点
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExecutiveSummary {
    #[serde(default)]
    pub article_id: u32,
    pub points: Vec<String>,
}

/// 时间线条目
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TimelineItem {
    #[serde(default)]
    pub article_id: u32,
    pub date: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub source_label: String,
    #[serde(default)]
    pub source_url: Option<String>,
}

/// 引用来源条目
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CitedSource {
    #[serde(default)]
    pub article_id: u32,
    pub name: String,
    #[serde(rename = "type", default)]
    pub source_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// 按来源分组的原始事实
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RawFactGroup {
    #[serde(default)]
    pub article_id: u32,
    pub category: String,
    pub facts: Vec<String>,
}

/// 观点视角条目
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Perspective {
    #[serde(default)]
    pub article_id: u32,
    pub viewpoint: String,
    pub description: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub quote: Option<String>,
    #[serde(default = "default_perspective_color")]
    pub color: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub evidence: Option<String>,
    #[serde(default)]
    pub conflict_source: Option<String>,
    #[serde(default)]
    pub conflict_quote: Option<String>,
    #[serde(default)]
    pub conflict_url: Option<String>,
}

fn default_perspective_color() -> String {
    "blue".to_string()
}

/// 冲突条目的一方来源
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConflictSide {
    pub name: String,
    pub quote: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub claim: String,
}

/// 冲突信息条目：两方来源针锋相对的表述
///
/// 条目是原子的：去重时只能整条保留或整条丢弃。
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConflictingInfo {
    #[serde(default)]
    pub article_id: u32,
    #[serde(default)]
    pub conflict_id: String,
    #[serde(default)]
    pub conflict_type: String,
    pub conflict_description: String,
    pub source_a: ConflictSide,
    pub source_b: ConflictSide,
    #[serde(default)]
    pub resolution_status: String,
    #[serde(default)]
    pub severity: String,
}

/// 装配完成的不可变研究报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub article: Article,
    pub executive_summary: ExecutiveSummary,
    pub timeline_items: Vec<TimelineItem>,
    pub cited_sources: Vec<CitedSource>,
    pub raw_facts: Vec<RawFactGroup>,
    pub perspectives: Vec<Perspective>,
    pub conflicting_info: Vec<ConflictingInfo>,
}

impl Report {
    /// 结构完整性校验，失败对本次运行是致命的
    ///
    /// 校验的是结构而非内容：标题、slug、正文非空，且所有章节
    /// 携带与Narrative一致的article_id。
    pub fn validate(&self) -> Result<(), String> {
        if self.article.id == 0 {
            return Err("article id has not been assigned".to_string());
        }
        if self.article.title.trim().is_empty() {
            return Err("article title is empty".to_string());
        }
        if self.article.slug.trim().is_empty() {
            return Err("article slug is empty".to_string());
        }
        if self.article.content.trim().is_empty() {
            return Err("article content is empty".to_string());
        }

        let id = self.article.id;
        if self.executive_summary.article_id != id {
            return Err("executive summary carries a foreign article id".to_string());
        }
        if self.executive_summary.points.is_empty() {
            return Err("executive summary has no points".to_string());
        }

        for (section, mismatched) in [
            (
                "timeline_items",
                self.timeline_items.iter().any(|i| i.article_id != id),
            ),
            (
                "cited_sources",
                self.cited_sources.iter().any(|s| s.article_id != id),
            ),
            (
                "raw_facts",
                self.raw_facts.iter().any(|g| g.article_id != id),
            ),
            (
                "perspectives",
                self.perspectives.iter().any(|p| p.article_id != id),
            ),
            (
                "conflicting_info",
                self.conflicting_info.iter().any(|c| c.article_id != id),
            ),
        ] {
            if mismatched {
                return Err(format!("section {} carries a foreign article id", section));
            }
        }

        Ok(())
    }

    /// 自愈扫描使用的完整度判断
    ///
    /// 任一必需章节退化为空视为不完整，由队列以force方式重新生成。
    pub fn is_complete(&self) -> bool {
        !self.article.content.trim().is_empty()
            && !self.executive_summary.points.is_empty()
            && !self.raw_facts.is_empty()
            && !self.perspectives.is_empty()
    }
}
