use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// 内容抓取网关返回的单条检索结果
///
/// 由发起本次工作流的运行独占持有，创建后不再修改。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchedItem {
    /// 来源页面URL
    pub url: String,
    /// 页面文本摘录
    pub text: String,
}

impl FetchedItem {
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
        }
    }
}

/// 调研阶段产出的检索计划
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchPlan {
    /// 面向搜索引擎优化过的聚焦查询语句
    pub focused_query: String,
    /// 话题类别，用于配图检索的降级兜底
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "general".to_string()
}

impl SearchPlan {
    /// 调研失败以外的兜底计划：直接使用原始查询
    pub fn fallback(query: &str) -> Self {
        Self {
            focused_query: query.to_string(),
            category: default_category(),
        }
    }
}
