use clap::Parser;
use std::path::PathBuf;

use crate::config::{Config, LLMProvider};

/// DeepResearch-RS - 由Rust与AI驱动的研究报告生成引擎
#[derive(Parser, Debug)]
#[command(name = "deepresearch-rs")]
#[command(
    about = "AI-based research report generation engine. Given a free-text query, it orchestrates live web research, parallel section generation and cross-section deduplication, then caches and serves the assembled report."
)]
#[command(author = "Sopaco")]
#[command(version)]
pub struct Args {
    /// 研究查询
    #[arg(short, long)]
    pub query: Option<String>,

    /// 强制重新生成（替换既有缓存条目）
    #[arg(long)]
    pub force: bool,

    /// 报告JSON输出路径
    #[arg(short, long, default_value = "./deepresearch.out")]
    pub output_path: PathBuf,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,

    /// 高能效模型，优先用于常规章节生成任务
    #[arg(long)]
    pub model_efficient: Option<String>,

    /// 高质量模型，用于超长上下文的生成任务
    #[arg(long)]
    pub model_powerful: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// 最大tokens数
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// 温度参数
    #[arg(long)]
    pub temperature: Option<f64>,

    /// 章节生成分支的最大并发数
    #[arg(long)]
    pub max_parallels: Option<usize>,

    /// LLM Provider (openai, anthropic, openrouter, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// 搜索服务API KEY
    #[arg(long)]
    pub search_api_key: Option<String>,

    /// 禁用配图检索，全部使用占位图
    #[arg(long)]
    pub no_images: bool,
}

impl Args {
    /// 将CLI参数转换为配置
    pub fn into_config(self) -> Config {
        let mut config = if let Some(config_path) = &self.config {
            // 如果显式指定了配置文件路径，从该路径加载
            Config::from_file(config_path).unwrap_or_else(|_| {
                panic!("⚠️ 警告: 无法读取配置文件 {:?}", config_path)
            })
        } else {
            // 如果没有显式指定配置文件，尝试从默认位置加载
            let default_config_path = std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("deepresearch.toml");

            if default_config_path.exists() {
                Config::from_file(&default_config_path).unwrap_or_else(|_| {
                    panic!(
                        "⚠️ 警告: 无法读取默认配置文件 {:?}",
                        default_config_path
                    )
                })
            } else {
                Config::default()
            }
        };

        // CLI参数覆盖配置文件
        config.output_path = self.output_path;
        if self.verbose {
            config.verbose = true;
        }
        if let Some(model) = self.model_efficient {
            config.llm.model_efficient = model;
        }
        if let Some(model) = self.model_powerful {
            config.llm.model_powerful = model;
        }
        if let Some(base_url) = self.llm_api_base_url {
            config.llm.api_base_url = base_url;
        }
        if let Some(api_key) = self.llm_api_key {
            config.llm.api_key = api_key;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }
        if let Some(max_parallels) = self.max_parallels {
            config.llm.max_parallels = max_parallels;
        }
        if let Some(provider) = self.llm_provider {
            match provider.parse::<LLMProvider>() {
                Ok(provider) => config.llm.provider = provider,
                Err(e) => eprintln!("⚠️ 忽略无效的provider参数: {}", e),
            }
        }
        if let Some(api_key) = self.search_api_key {
            config.search.api_key = api_key;
        }
        if self.no_images {
            config.images.enabled = false;
        }

        config
    }
}
