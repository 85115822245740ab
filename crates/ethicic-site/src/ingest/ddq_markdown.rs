//! PRI DDQ markdown parser.
//!
//! The due-diligence questionnaire is maintained as a markdown document with
//! seven numbered `##` sections. Each section is converted to a small HTML
//! fragment and lands in the matching rich-text field of the DDQ page.

use std::sync::OnceLock;

use regex::Regex;

use crate::content::fields::PriDdqFields;

/// The seven DDQ response sections, already converted to HTML.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DdqSections {
    pub strategy_governance: String,
    pub esg_integration: String,
    pub stewardship: String,
    pub transparency: String,
    pub climate: String,
    pub reporting_verification: String,
    pub additional: String,
}

impl DdqSections {
    /// How many sections actually carried content.
    pub fn populated(&self) -> usize {
        [
            &self.strategy_governance,
            &self.esg_integration,
            &self.stewardship,
            &self.transparency,
            &self.climate,
            &self.reporting_verification,
            &self.additional,
        ]
        .iter()
        .filter(|section| !section.is_empty())
        .count()
    }

    /// Copy non-empty sections onto the page fields.
    pub fn apply(&self, fields: &mut PriDdqFields) {
        let targets = [
            (&self.strategy_governance, &mut fields.strategy_governance_content),
            (&self.esg_integration, &mut fields.esg_integration_content),
            (&self.stewardship, &mut fields.stewardship_content),
            (&self.transparency, &mut fields.transparency_content),
            (&self.climate, &mut fields.climate_content),
            (
                &self.reporting_verification,
                &mut fields.reporting_verification_content,
            ),
            (&self.additional, &mut fields.additional_content),
        ];
        for (source, target) in targets {
            if !source.is_empty() {
                *target = source.clone();
            }
        }
    }
}

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `## 1. TITLE`, tolerating bold markers and an escaped dot.
    RE.get_or_init(|| Regex::new(r"^##\s*(?:\*\*)?([1-7])\\?\.").expect("valid regex"))
}

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid regex"))
}

fn question_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+\.\d+)\s+(.*)$").expect("valid regex"))
}

fn subitem_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^i+\)").expect("valid regex"))
}

/// Parse the questionnaire markdown into its seven HTML sections.
pub fn parse_ddq_markdown(markdown: &str) -> DdqSections {
    let mut buckets: [Vec<&str>; 7] = Default::default();
    let mut current: Option<usize> = None;
    for line in markdown.lines() {
        if let Some(captures) = header_re().captures(line.trim_start()) {
            let number: usize = captures[1].parse().unwrap_or(0);
            current = number.checked_sub(1).filter(|idx| *idx < 7);
            continue;
        }
        if let Some(idx) = current {
            buckets[idx].push(line);
        }
    }
    let mut html = buckets.iter().map(|lines| format_section(lines));
    DdqSections {
        strategy_governance: html.next().unwrap_or_default(),
        esg_integration: html.next().unwrap_or_default(),
        stewardship: html.next().unwrap_or_default(),
        transparency: html.next().unwrap_or_default(),
        climate: html.next().unwrap_or_default(),
        reporting_verification: html.next().unwrap_or_default(),
        additional: html.next().unwrap_or_default(),
    }
}

/// Light markdown-to-HTML conversion: bold, numbered questions, bullets,
/// instruction lines, paragraphs. Consecutive bullets get wrapped in one
/// `<ul>`.
fn format_section(lines: &[&str]) -> String {
    let mut formatted: Vec<String> = Vec::new();
    for raw in lines {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let line = bold_re().replace_all(line, "<strong>$1</strong>").into_owned();

        if let Some(captures) = question_re().captures(&line) {
            formatted.push(format!(
                "<h3 class=\"ddq-question\">{} {}</h3>",
                &captures[1], &captures[2]
            ));
        } else if line.starts_with('*') && line.ends_with('*') && line.len() > 2 {
            formatted.push(format!(
                "<p class=\"ddq-instruction\"><em>{}</em></p>",
                &line[1..line.len() - 1]
            ));
        } else if let Some(rest) = line.strip_prefix("* ").or_else(|| line.strip_prefix("- ")) {
            formatted.push(format!("<li>{rest}</li>"));
        } else if subitem_re().is_match(&line) {
            formatted.push(format!("<p class=\"ddq-subitem\">{line}</p>"));
        } else if line.starts_with('<') {
            formatted.push(line);
        } else {
            formatted.push(format!("<p>{line}</p>"));
        }
    }

    let mut out: Vec<String> = Vec::new();
    let mut in_list = false;
    for line in formatted {
        if line.starts_with("<li>") {
            if !in_list {
                out.push("<ul>".to_string());
                in_list = true;
            }
            out.push(line);
        } else {
            if in_list {
                out.push("</ul>".to_string());
                in_list = false;
            }
            out.push(line);
        }
    }
    if in_list {
        out.push("</ul>".to_string());
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# PRI Due Diligence Questionnaire

## 1. POLICY AND GOVERNANCE

*Please answer every question.*

1.1 Describe your **responsible investment** policy.

We maintain a written policy covering all strategies.

* Board oversight
* Annual review

## 2. INVESTMENT PROCESS

2.1 How is ESG integrated?

Screening happens before fundamental analysis.

## 3. STEWARDSHIP

We vote every proxy.

## **4\\. TRANSPARENCY**

Holdings are published monthly.
";

    #[test]
    fn sections_split_on_numbered_headers() {
        let sections = parse_ddq_markdown(SAMPLE);
        assert_eq!(sections.populated(), 4);
        assert!(!sections.strategy_governance.contains("POLICY"));
        assert!(sections.esg_integration.contains("<h3 class=\"ddq-question\">2.1"));
        assert!(sections.stewardship.contains("<p>We vote every proxy.</p>"));
        assert!(sections.transparency.contains("Holdings are published"));
        assert!(sections.climate.is_empty());
    }

    #[test]
    fn formatting_converts_bold_questions_and_bullets() {
        let sections = parse_ddq_markdown(SAMPLE);
        let html = &sections.strategy_governance;
        assert!(html.contains("<strong>responsible investment</strong>"));
        assert!(html.contains("<h3 class=\"ddq-question\">1.1"));
        assert!(html.contains("<ul>\n<li>Board oversight</li>\n<li>Annual review</li>\n</ul>"));
        assert!(html.contains("<p class=\"ddq-instruction\"><em>Please answer every question.</em></p>"));
    }

    #[test]
    fn apply_overwrites_only_populated_sections() {
        let sections = parse_ddq_markdown(SAMPLE);
        let mut fields = PriDdqFields {
            climate_content: "<p>existing climate answer</p>".into(),
            ..Default::default()
        };
        sections.apply(&mut fields);
        assert!(fields.strategy_governance_content.contains("1.1"));
        assert_eq!(fields.climate_content, "<p>existing climate answer</p>");
    }
}
