//! The block layout shared by every `.test` file:
//!
//! ```text
//! # test: name
//! # key: value        (any number of header lines)
//! ---
//! input
//! ---
//! expected
//! ===
//! ```

/// One block, before any format-specific interpretation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Block {
    pub name: String,
    /// 1-indexed line of the `# test:` header.
    pub line_number: usize,
    /// `# key: value` headers in file order.
    pub headers: Vec<(String, String)>,
    pub input: String,
    /// Expected section, trimmed.
    pub expected: String,
}

impl Block {
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

pub(crate) fn parse_blocks(content: &str) -> Vec<Block> {
    let lines: Vec<&str> = content.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let Some(name) = lines[i].trim().strip_prefix("# test:") else {
            i += 1;
            continue;
        };
        let name = name.trim().to_string();
        let line_number = i + 1;
        i += 1;

        let mut headers = Vec::new();
        while i < lines.len() && lines[i].trim() != "---" {
            if let Some((key, value)) = lines[i].trim().strip_prefix('#').and_then(|h| h.split_once(':')) {
                headers.push((key.trim().to_string(), value.trim().to_string()));
            }
            i += 1;
        }
        i += 1; // skip the ---

        let mut input_lines = Vec::new();
        while i < lines.len() && lines[i].trim() != "---" {
            input_lines.push(lines[i]);
            i += 1;
        }
        i += 1; // skip the ---

        let mut expected_lines = Vec::new();
        while i < lines.len() && lines[i].trim() != "===" {
            expected_lines.push(lines[i]);
            i += 1;
        }
        i += 1; // skip the ===

        blocks.push(Block {
            name,
            line_number,
            headers,
            input: input_lines.join("\n"),
            expected: expected_lines.join("\n").trim().to_string(),
        });
    }

    blocks
}
