//! Source code extraction from markdown-formatted model responses.
//!
//! Models usually wrap code in a fenced block, but short answers sometimes come
//! back bare. Extraction never fails: without a fence the whole message is
//! treated as code.
//!
//! # Example
//!
//! ```
//! use humaneval_forge::utils::code_extraction::extract_code;
//!
//! let response = "Sure:\n```python\ndef add(a, b):\n    return a + b\n```\nDone.";
//! assert_eq!(extract_code(response), "def add(a, b):\n    return a + b");
//!
//! assert_eq!(extract_code("  return a + b \n"), "return a + b");
//! ```

/// Fence that opens a block tagged with the benchmark's target language.
pub const PYTHON_FENCE: &str = "```python";

/// Plain markdown fence, used both as a fallback opener and as the closer.
pub const PLAIN_FENCE: &str = "```";

/// Extract the code block from a markdown response using the default fences.
///
/// Tries a `python`-tagged fence first and falls back to a plain fence.
pub fn extract_code(markdown: &str) -> String {
    extract_code_with_fences(markdown, &[PYTHON_FENCE, PLAIN_FENCE])
}

/// Extract the code block introduced by the first of `openers` present in `markdown`.
///
/// The result is the text between that opener and the next plain fence, or the
/// rest of the input when the block is never closed, trimmed. When none of the
/// openers occurs the trimmed input is returned.
pub fn extract_code_with_fences(markdown: &str, openers: &[&str]) -> String {
    for opener in openers {
        if let Some(idx) = markdown.find(opener) {
            let body = &markdown[idx + opener.len()..];
            let end = body.find(PLAIN_FENCE).unwrap_or(body.len());
            return body[..end].trim().to_string();
        }
    }
    markdown.trim().to_string()
}

/// Extract a direct-mode completion.
///
/// Carriage returns are removed first. Only a `python`-tagged fence counts as an
/// opener; without one the text is returned as is, indentation included, so a
/// bare continuation of the prompt's function body stays appendable.
pub fn extract_direct_completion(text: &str) -> String {
    let text = strip_carriage_returns(text);
    if text.contains(PYTHON_FENCE) {
        extract_code_with_fences(&text, &[PYTHON_FENCE])
    } else {
        text
    }
}

/// Remove carriage returns so CRLF responses extract the same as LF ones.
pub fn strip_carriage_returns(text: &str) -> String {
    text.replace('\r', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_fence() {
        let md = "Here you go:\n```python\nassert add(1, 2) == 3\n```\nHope it helps.";
        assert_eq!(extract_code(md), "assert add(1, 2) == 3");
    }

    #[test]
    fn test_tagged_fence_preferred_over_earlier_plain_fence() {
        let md = "```\nshell output\n```\nand the code:\n```python\nx = 1\n```";
        assert_eq!(extract_code(md), "x = 1");
    }

    #[test]
    fn test_first_tagged_fence_wins() {
        let md = "```python\nfirst\n```\n```python\nsecond\n```";
        assert_eq!(extract_code(md), "first");
    }

    #[test]
    fn test_plain_fence_fallback() {
        let md = "Tests:\n```\ndef test_add():\n    assert add(2, 2) == 4\n```";
        assert_eq!(
            extract_code(md),
            "def test_add():\n    assert add(2, 2) == 4"
        );
    }

    #[test]
    fn test_plain_fence_keeps_other_language_tag() {
        // Only the bare fence is stripped; an unknown tag stays in the body.
        let md = "```py\nprint(1)\n```";
        assert_eq!(extract_code(md), "py\nprint(1)");
    }

    #[test]
    fn test_unclosed_fence_returns_remainder() {
        let md = "```python\ndef f():\n    return 1\n\n";
        assert_eq!(extract_code(md), "def f():\n    return 1");
    }

    #[test]
    fn test_unclosed_plain_fence_returns_remainder() {
        let md = "text ``` tail  ";
        assert_eq!(extract_code(md), "tail");
    }

    #[test]
    fn test_no_fence_returns_trimmed_input() {
        assert_eq!(extract_code("\n    return a + b\n"), "return a + b");
        assert_eq!(extract_code(""), "");
    }

    #[test]
    fn test_empty_block() {
        assert_eq!(extract_code("```python\n```"), "");
    }

    #[test]
    fn test_custom_openers() {
        let md = "```rust\nfn main() {}\n```";
        assert_eq!(
            extract_code_with_fences(md, &["```rust", PLAIN_FENCE]),
            "fn main() {}"
        );
        assert_eq!(extract_code_with_fences("  bare  ", &[]), "bare");
    }

    #[test]
    fn test_strip_carriage_returns() {
        let md = "```python\r\nx = 1\r\n```\r\n";
        assert_eq!(extract_code(&strip_carriage_returns(md)), "x = 1");
    }

    #[test]
    fn test_direct_completion_tagged_fence() {
        let md = "Sure!\r\n```python\r\n    return a + b\r\n```\r\nDone.";
        assert_eq!(extract_direct_completion(md), "return a + b");
    }

    #[test]
    fn test_direct_completion_continuation_kept_verbatim() {
        // A closing fence alone must not be taken for an opener.
        let md = "    return a + b\r\n```\n\nThis adds the numbers.";
        assert_eq!(
            extract_direct_completion(md),
            "    return a + b\n```\n\nThis adds the numbers."
        );
        assert_eq!(extract_direct_completion("    return a + b\n"), "    return a + b\n");
    }

    #[test]
    fn test_direct_completion_ignores_plain_fence() {
        let md = "```\nx = 1\n```";
        assert_eq!(extract_direct_completion(md), md);
    }
}
