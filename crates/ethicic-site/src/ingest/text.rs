//! Text cleanup shared by the import jobs.

use std::sync::OnceLock;

use regex::Regex;

use crate::content::blocks::strip_tags;

fn block_comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<!--\s*/?wp:[^>]*-->").expect("valid regex"))
}

fn shortcode_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[/?wp:[^\]]*\]").expect("valid regex"))
}

fn blank_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n\s*\n+").expect("valid regex"))
}

/// Strip WordPress block-editor comments and shortcodes, then collapse runs
/// of blank lines left behind.
pub fn clean_wordpress_content(raw: &str) -> String {
    let without_comments = block_comment_re().replace_all(raw, "");
    let without_shortcodes = shortcode_re().replace_all(&without_comments, "");
    blank_run_re()
        .replace_all(&without_shortcodes, "\n\n")
        .trim()
        .to_string()
}

/// Decode the handful of HTML entities WordPress exports actually contain.
pub fn unescape_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#8217;", "\u{2019}")
        .replace("&#8216;", "\u{2018}")
        .replace("&#8220;", "\u{201c}")
        .replace("&#8221;", "\u{201d}")
        .replace("&nbsp;", " ")
}

/// First ~`limit` characters of the plain text, cut at a word boundary with
/// an ellipsis when truncated.
pub fn summarize(html: &str, limit: usize) -> String {
    let text = strip_tags(html);
    if text.chars().count() <= limit {
        return text;
    }
    let head: String = text.chars().take(limit).collect();
    let cut = head.rfind(char::is_whitespace).unwrap_or(head.len());
    format!("{}…", head[..cut].trim_end())
}

/// Pick a usable title: the given one, else the first non-empty plain-text
/// line of the content, else the slug with hyphens spaced out.
pub fn derive_title(title: &str, content: &str, slug: &str) -> String {
    let title = title.trim();
    if !title.is_empty() {
        return title.to_string();
    }
    let text = strip_tags(content);
    if let Some(line) = text.lines().map(str::trim).find(|line| !line.is_empty()) {
        let head: String = line.chars().take(80).collect();
        return head;
    }
    slug.replace('-', " ").trim().to_string()
}
