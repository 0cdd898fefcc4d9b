//! Fenced code block scanning
//!
//! Blocks are delimited by triple backticks. The first word of the opening
//! fence's info string is the language tag. An unterminated fence runs to the
//! end of the text.

use crate::transcript::types::CodeBlock;

const FENCE: &str = "```";

/// Returns the info string if `line` opens or closes a fence.
pub(crate) fn fence_info(line: &str) -> Option<&str> {
    line.trim_start().strip_prefix(FENCE)
}

/// Extract all fenced code blocks from `content` in order.
pub fn extract_code_blocks(content: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut open: Option<(String, Vec<&str>)> = None;

    for line in content.lines() {
        match open.take() {
            None => {
                if let Some(info) = fence_info(line) {
                    let language = info.split_whitespace().next().unwrap_or("").to_string();
                    open = Some((language, Vec::new()));
                }
            }
            Some((language, mut lines)) => {
                if fence_info(line).is_some() {
                    blocks.push(CodeBlock {
                        language,
                        code: lines.join("\n"),
                    });
                } else {
                    lines.push(line);
                    open = Some((language, lines));
                }
            }
        }
    }

    if let Some((language, lines)) = open {
        blocks.push(CodeBlock {
            language,
            code: lines.join("\n"),
        });
    }

    blocks
}

/// Remove fenced code blocks (fences included) from `content`.
pub fn strip_code_blocks(content: &str) -> String {
    let mut in_fence = false;
    let mut kept = Vec::new();

    for line in content.lines() {
        if fence_info(line).is_some() {
            in_fence = !in_fence;
            continue;
        }
        if !in_fence {
            kept.push(line);
        }
    }

    kept.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_language_and_code() {
        let content = "Try this:\n```rust\nfn main() {}\n```";
        let blocks = extract_code_blocks(content);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, "rust");
        assert_eq!(blocks[0].code, "fn main() {}");
    }

    #[test]
    fn test_empty_language_tag() {
        let blocks = extract_code_blocks("```\nls -la\n```");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, "");
        assert_eq!(blocks[0].code, "ls -la");
    }

    #[test]
    fn test_info_string_keeps_first_word() {
        let blocks = extract_code_blocks("```python title=\"app.py\"\nx = 1\n```");
        assert_eq!(blocks[0].language, "python");
    }

    #[test]
    fn test_multiple_blocks_in_order() {
        let content = "```js\na()\n```\ntext\n```py\nb()\n```";
        let blocks = extract_code_blocks(content);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].language, "js");
        assert_eq!(blocks[1].language, "py");
        assert_eq!(blocks[1].code, "b()");
    }

    #[test]
    fn test_unterminated_fence_runs_to_end() {
        let blocks = extract_code_blocks("```sh\necho one\necho two");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].code, "echo one\necho two");
    }

    #[test]
    fn test_strip_removes_fenced_content() {
        let content = "Before\n```py\nsecret()\n```\nAfter";
        assert_eq!(strip_code_blocks(content), "Before\nAfter");
    }

    #[test]
    fn test_no_blocks() {
        assert!(extract_code_blocks("just prose").is_empty());
        assert_eq!(strip_code_blocks("  just prose  "), "just prose");
    }
}
