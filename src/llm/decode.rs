use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// 宽容解码失败
#[derive(Debug, Error)]
#[error("{message}")]
pub struct DecodeError {
    message: String,
}

static FENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*\n?(.*?)\n?\s*```").unwrap());

/// 剥离模型输出外层的markdown代码围栏
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("```") {
        if let Some(captures) = FENCE_PATTERN.captures(trimmed) {
            return captures[1].trim().to_string();
        }
    }
    trimmed.to_string()
}

/// 模型输出的宽容解码
///
/// 修复手段仅限两种：剥离代码围栏、把裸JSON对象包装成单元素列表。
/// 输入是未受信任的原始文本，输出要么是合法的目标类型，要么是解码错误。
pub fn lenient_decode<T>(raw: &str) -> Result<T, DecodeError>
where
    T: DeserializeOwned,
{
    let cleaned = strip_code_fences(raw);
    let value: Value = serde_json::from_str(&cleaned).map_err(|e| DecodeError {
        message: format!("invalid JSON: {}", e),
    })?;

    match serde_json::from_value::<T>(value.clone()) {
        Ok(decoded) => Ok(decoded),
        Err(first_error) => {
            // 目标是列表而模型给了裸对象时，包装后重试一次
            if value.is_object() {
                if let Ok(decoded) = serde_json::from_value::<T>(Value::Array(vec![value])) {
                    return Ok(decoded);
                }
            }
            Err(DecodeError {
                message: format!("schema mismatch: {}", first_error),
            })
        }
    }
}
