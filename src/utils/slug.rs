/// 查询slug的最大长度
const MAX_SLUG_LEN: usize = 80;

/// 将查询文本转换为确定性的slug，作为缓存键使用
///
/// 同一查询（经过trim与大小写归一化后）必然得到同一个slug。
pub fn slugify(query: &str) -> String {
    let mut slug = String::with_capacity(query.len());
    let mut last_was_dash = true;

    for ch in query.trim().to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            last_was_dash = false;
        } else if !last_was_dash {
            // 标点、空白与非ASCII字符统一折叠为单个连字符
            slug.push('-');
            last_was_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn test_slug_is_deterministic_after_normalization() {
        assert_eq!(slugify("City Council Budget Vote"), slugify("  city council budget vote "));
        assert_eq!(slugify("City Council Budget Vote"), "city-council-budget-vote");
    }

    #[test]
    fn test_slug_strips_punctuation() {
        assert_eq!(slugify("What's next? AI & policy!"), "what-s-next-ai-policy");
        assert_eq!(slugify("\"quoted\" headline"), "quoted-headline");
    }

    #[test]
    fn test_slug_collapses_separator_runs() {
        assert_eq!(slugify("a   --  b"), "a-b");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_slug_is_length_bounded() {
        let long_query = "word ".repeat(100);
        let slug = slugify(&long_query);
        assert!(slug.len() <= 80);
        assert!(!slug.ends_with('-'));
    }
}
