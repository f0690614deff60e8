use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    #[serde(rename = "openai")]
    #[default]
    OpenAI,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "openrouter")]
    OpenRouter,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::OpenRouter => write!(f, "openrouter"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "anthropic" => Ok(LLMProvider::Anthropic),
            "openrouter" => Ok(LLMProvider::OpenRouter),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// 报告JSON输出路径
    pub output_path: PathBuf,

    /// LLM模型配置
    pub llm: LLMConfig,

    /// 内容检索配置
    pub search: SearchConfig,

    /// 配图检索配置
    pub images: ImageConfig,

    /// 生成队列配置
    pub queue: QueueConfig,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 高能效模型，优先用于常规章节生成任务
    pub model_efficient: String,

    /// 高质量模型，用于超长上下文的生成任务
    pub model_powerful: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 速率受限时的最大重试次数
    pub retry_attempts: u32,

    /// 退避基准间隔（毫秒），按尝试次数指数放大
    pub retry_base_delay_ms: u64,

    /// 超时时间（秒）
    pub timeout_seconds: u64,

    /// 章节生成分支的最大并发数
    pub max_parallels: usize,
}

impl LLMConfig {
    /// 退避基准间隔
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

/// 内容检索配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SearchConfig {
    /// 搜索服务API KEY
    pub api_key: String,

    /// 搜索服务API基地址
    pub api_base_url: String,

    /// 单次检索返回的最大结果数
    pub max_results: usize,

    /// 是否抓取页面正文以加深摘录
    pub deepen_pages: bool,

    /// 单条摘录的最大字符数
    pub excerpt_limit: usize,
}

/// 配图检索配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ImageConfig {
    /// 是否启用配图检索（禁用时使用占位图）
    pub enabled: bool,

    /// 图片服务API KEY
    pub api_key: String,

    /// 图片服务API基地址
    pub api_base_url: String,
}

/// 生成队列配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct QueueConfig {
    /// 两个任务之间的固定间隔（毫秒），作为比单次调用退避更粗粒度的限流保护
    pub inter_job_delay_ms: u64,
}

impl QueueConfig {
    pub fn inter_job_delay(&self) -> Duration {
        Duration::from_millis(self.inter_job_delay_ms)
    }
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("./deepresearch.out"),
            llm: LLMConfig::default(),
            search: SearchConfig::default(),
            images: ImageConfig::default(),
            queue: QueueConfig::default(),
            verbose: false,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("DEEPRESEARCH_LLM_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://api-inference.modelscope.cn/v1"),
            model_efficient: String::from("Qwen/Qwen3-Next-80B-A3B-Instruct"),
            model_powerful: String::from("Qwen/Qwen3-235B-A22B-Instruct-2507"),
            max_tokens: 131072,
            temperature: 0.1,
            retry_attempts: 5,
            retry_base_delay_ms: 2000,
            timeout_seconds: 300,
            max_parallels: 3,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("DEEPRESEARCH_SEARCH_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://api.tavily.com"),
            max_results: 15,
            deepen_pages: false,
            excerpt_limit: 4000,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: std::env::var("DEEPRESEARCH_IMAGE_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://api.pexels.com"),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            inter_job_delay_ms: 2000,
        }
    }
}

// Include tests
#[cfg(test)]
mod tests;
