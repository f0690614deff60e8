use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

use rand::Rng;
use regex::Regex;
use thiserror::Error;

use crate::config::LLMConfig;

/// 单次外部调用的失败分类
///
/// 速率受限是唯一可重试的类别；解码失败与其它错误不做重试。
#[derive(Debug, Error)]
pub enum CallError {
    #[error("provider rate limited")]
    RateLimited { retry_after: Option<Duration> },

    #[error("generator output could not be decoded: {0}")]
    Decode(String),

    #[error("{0}")]
    Fatal(#[from] anyhow::Error),
}

/// 重试耗尽后暴露给调用方的错误
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("rate limit exceeded after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },

    #[error("generator output could not be decoded: {0}")]
    Decode(String),

    #[error("{0}")]
    Fatal(anyhow::Error),
}

/// 重试策略 - 不可变值，无隐藏状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最大尝试次数
    pub max_retries: u32,
    /// 退避基准间隔
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            base_delay,
        }
    }

    pub fn from_llm_config(config: &LLMConfig) -> Self {
        Self::new(config.retry_attempts, config.retry_base_delay())
    }
}

static RATE_LIMIT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\b429\b").unwrap(),
        Regex::new(r"(?i)rate[_\-\s]?limit(ed|ing)?").unwrap(),
        Regex::new(r"(?i)too\s+many\s+requests").unwrap(),
        Regex::new(r"(?i)quota\s*(exceeded|limit)").unwrap(),
        Regex::new(r"(?i)overloaded").unwrap(),
    ]
});

static RETRY_AFTER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)retry[\s\-_]?after[:\s]+(\d+)").unwrap());

/// 将provider返回的错误归类为可重试或致命
///
/// provider在错误消息中携带的建议等待秒数会被透传给退避计算。
pub fn classify_failure(err: anyhow::Error) -> CallError {
    let message = format!("{:#}", err);
    if RATE_LIMIT_PATTERNS.iter().any(|re| re.is_match(&message)) {
        let retry_after = RETRY_AFTER_PATTERN
            .captures(&message)
            .and_then(|cap| cap[1].parse::<u64>().ok())
            .map(Duration::from_secs);
        return CallError::RateLimited { retry_after };
    }
    CallError::Fatal(err)
}

/// 0.1s..0.5s之间的随机抖动
pub fn jitter() -> Duration {
    let millis = rand::rng().random_range(100..=500);
    Duration::from_millis(millis)
}

/// 第attempt次失败后的退避时长
///
/// `max(base_delay * 2^attempt, provider建议值) + jitter`
pub fn backoff_delay(
    policy: &RetryPolicy,
    attempt: u32,
    retry_after: Option<Duration>,
    jitter: Duration,
) -> Duration {
    let factor = 1u32 << attempt.min(16);
    let exponential = policy.base_delay.saturating_mul(factor);
    exponential.max(retry_after.unwrap_or(Duration::ZERO)) + jitter
}

/// 带退避的统一重试入口
///
/// 每一次外部调用都经由此函数执行，其余代码因此无需关心瞬时失败。
/// 速率受限重试至多max_retries次后以RateLimitExceeded传播；
/// 其余错误立即传播，不做重试。
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, operation: F) -> Result<T, InvokeError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, CallError>>,
{
    let mut attempts = 0u32;
    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(CallError::Decode(message)) => return Err(InvokeError::Decode(message)),
            Err(CallError::Fatal(err)) => return Err(InvokeError::Fatal(err)),
            Err(CallError::RateLimited { retry_after }) => {
                attempts += 1;
                if attempts >= policy.max_retries {
                    return Err(InvokeError::RateLimitExceeded { attempts });
                }
                let delay = backoff_delay(policy, attempts - 1, retry_after, jitter());
                eprintln!(
                    "⚠️ 触发速率限制，{:.1}秒后重试 (第 {} / {} 次尝试)",
                    delay.as_secs_f64(),
                    attempts,
                    policy.max_retries
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
