//! Splitting a source file into its primary body and named inline blocks.

use regex::Regex;

/// A source file cut at its block delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSource<'a> {
    /// Text before the first delimiter
    pub primary: &'a str,
    /// Named blocks in file order
    pub blocks: Vec<(String, &'a str)>,
}

/// Finds `//-- <name>.<ext>` delimiter lines.
#[derive(Debug, Clone)]
pub struct BlockSplitter {
    pattern: Regex,
}

impl BlockSplitter {
    /// Creates a splitter for templates with the given extension (without the dot).
    pub fn new(extension: &str) -> Result<Self, regex::Error> {
        let pattern = format!(r"(?m)^//--[ \t]*(\S+)\.{}\r?$", regex::escape(extension));
        Ok(Self {
            pattern: Regex::new(&pattern)?,
        })
    }

    /// Splits `text` into the primary body and its named blocks.
    ///
    /// Delimiter lines belong to neither side. A block body starts on the line
    /// after its delimiter.
    pub fn split<'a>(&self, text: &'a str) -> SplitSource<'a> {
        let mut primary_end = text.len();
        let mut blocks = Vec::new();
        let mut pending: Option<(String, usize)> = None;

        for caps in self.pattern.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };

            match pending.take() {
                Some((block_name, body_start)) => {
                    blocks.push((block_name, &text[body_start..whole.start()]));
                }
                None => primary_end = whole.start(),
            }

            pending = Some((name.as_str().to_string(), body_start_after(text, whole.end())));
        }

        if let Some((block_name, body_start)) = pending {
            blocks.push((block_name, &text[body_start..]));
        }

        SplitSource {
            primary: &text[..primary_end],
            blocks,
        }
    }
}

/// Skips the line terminator that ends a delimiter line.
fn body_start_after(text: &str, delimiter_end: usize) -> usize {
    if text[delimiter_end..].starts_with('\n') {
        delimiter_end + 1
    } else {
        delimiter_end
    }
}
