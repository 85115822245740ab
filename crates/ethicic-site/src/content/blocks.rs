use serde::{Deserialize, Serialize};

/// Words-per-minute constant for derived reading time.
pub const WORDS_PER_MINUTE: usize = 200;

/// One typed fragment of a blog post body. The ordered sequence of blocks is
/// stored as a single JSON value on the post, keyed by block type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Restricted rich text: h2-h4, bold/italic/link, lists, document links.
    RichText(String),
    KeyStatistic(KeyStatistic),
    Table(TableBlock),
    Image(ImageRef),
    Callout(Callout),
    Quote(QuoteBlock),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyStatistic {
    pub value: String,
    pub label: String,
    pub description: String,
    pub category: String,
    pub time_period: String,
    pub visualization_type: String,
    pub chart_title: Option<String>,
    pub chart_config: Option<serde_json::Value>,
    pub related_entities: Vec<String>,
}

/// Row-major table data; the first row is the header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableBlock {
    pub caption: String,
    pub description: String,
    pub rows: Vec<Vec<String>>,
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageRef {
    pub url: String,
    pub alt_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Callout {
    pub kind: CalloutKind,
    pub title: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalloutKind {
    #[default]
    Info,
    Warning,
    Success,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteBlock {
    pub text: String,
    pub author: Option<String>,
    pub source: Option<String>,
}

/// Write-time validation failure for a block sequence.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BlockError {
    #[error("table block {index} is empty")]
    EmptyTable { index: usize },
    #[error("table block {index} has ragged rows (expected width {expected}, row {row} has {found})")]
    RaggedTable {
        index: usize,
        expected: usize,
        row: usize,
        found: usize,
    },
    #[error("quote block {index} has no text")]
    EmptyQuote { index: usize },
}

/// Validate an ordered block sequence before it is persisted.
pub fn validate_blocks(blocks: &[ContentBlock]) -> Result<(), BlockError> {
    for (index, block) in blocks.iter().enumerate() {
        match block {
            ContentBlock::Table(table) => {
                let Some(header) = table.rows.first() else {
                    return Err(BlockError::EmptyTable { index });
                };
                let expected = header.len();
                for (row, cells) in table.rows.iter().enumerate().skip(1) {
                    if cells.len() != expected {
                        return Err(BlockError::RaggedTable {
                            index,
                            expected,
                            row,
                            found: cells.len(),
                        });
                    }
                }
            }
            ContentBlock::Quote(quote) if quote.text.trim().is_empty() => {
                return Err(BlockError::EmptyQuote { index });
            }
            _ => {}
        }
    }
    Ok(())
}

impl ContentBlock {
    /// Plain-text rendering used for word counts and search snippets.
    pub fn plain_text(&self) -> String {
        match self {
            ContentBlock::RichText(html) => strip_tags(html),
            ContentBlock::KeyStatistic(stat) => [
                stat.value.as_str(),
                stat.label.as_str(),
                stat.description.as_str(),
            ]
            .join(" "),
            ContentBlock::Table(table) => {
                let mut parts = vec![table.caption.clone(), table.description.clone()];
                for row in &table.rows {
                    parts.push(row.join(" "));
                }
                parts.join(" ")
            }
            ContentBlock::Image(image) => image.alt_text.clone(),
            ContentBlock::Callout(callout) => {
                let title = callout.title.as_deref().unwrap_or("");
                format!("{} {}", title, strip_tags(&callout.body))
            }
            ContentBlock::Quote(quote) => {
                let author = quote.author.as_deref().unwrap_or("");
                format!("{} {}", quote.text, author)
            }
        }
    }
}

/// Remove HTML tags, leaving the text content with single-space separators.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => {
                if in_tag {
                    in_tag = false;
                    // Keep words in adjacent elements separated.
                    if !out.ends_with(char::is_whitespace) && !out.is_empty() {
                        out.push(' ');
                    }
                } else {
                    out.push(ch);
                }
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.trim().to_string()
}

/// Derived reading time in minutes over excerpt, block content, and the
/// legacy rich-text body: `max(1, ceil(words / 200))`.
pub fn reading_time_minutes(excerpt: &str, blocks: &[ContentBlock], legacy_body: &str) -> u32 {
    let mut words = excerpt.split_whitespace().count();
    for block in blocks {
        words += block.plain_text().split_whitespace().count();
    }
    words += strip_tags(legacy_body).split_whitespace().count();

    if words == 0 {
        return 1;
    }
    (words.div_ceil(WORDS_PER_MINUTE)) as u32
}
