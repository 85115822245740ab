//! Rewrites rich text that still points at the retired investvegan.org
//! domain.
//!
//! URL and email replacements come from fixed tables; image URLs on the old
//! media host cannot be rewritten automatically (the files have to be
//! re-uploaded), so they are collected for review and left in place. The
//! rewrite is plain substring replacement and therefore idempotent.

use std::sync::OnceLock;

use regex::Regex;

const URL_MAP: &[(&str, &str)] = &[
    (
        "https://investvegan.org/contact-us/",
        "https://ethicic.com/contact/",
    ),
    (
        "https://investvegan.org/our-process/",
        "https://ethicic.com/process/",
    ),
    (
        "https://investvegan.org/support/",
        "https://ethicic.com/faq/",
    ),
    (
        "https://investvegan.org/stock-market-performance-what-should-you-expect/",
        "https://ethicic.com/blog/stock-market-performance-what-should-you-expect/",
    ),
    (
        "https://investvegan.org/why-we-own-farmer-mac/",
        "https://ethicic.com/blog/why-we-own-farmer-mac/",
    ),
    (
        "https://investvegan.org/strategies/",
        "https://ethicic.com/strategies/",
    ),
    // Webinar requests go to the contact page now.
    (
        "https://investvegan.org/gimmewebinar",
        "https://ethicic.com/contact/",
    ),
];

const EMAIL_MAP: &[(&str, &str)] = &[("sloane@investvegan.org", "sloane@ethicic.com")];

fn legacy_image_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"https://investvegan\.org/wp-content/uploads/[^\s\x22'<>\)]+")
            .expect("valid regex")
    })
}

/// Outcome of rewriting one piece of text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewriteOutcome {
    pub text: String,
    pub replacements: usize,
    /// Legacy-host image URLs left in place, for manual review.
    pub flagged_images: Vec<String>,
}

impl RewriteOutcome {
    pub fn changed(&self) -> bool {
        self.replacements > 0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyRewriter;

impl LegacyRewriter {
    pub fn new() -> Self {
        Self
    }

    pub fn rewrite(&self, text: &str) -> RewriteOutcome {
        let mut out = text.to_string();
        let mut replacements = 0;
        for (old, new) in URL_MAP.iter().chain(EMAIL_MAP) {
            let count = out.matches(old).count();
            if count > 0 {
                out = out.replace(old, new);
                replacements += count;
            }
        }
        let flagged_images = legacy_image_re()
            .find_iter(&out)
            .map(|m| m.as_str().to_string())
            .collect();
        RewriteOutcome {
            text: out,
            replacements,
            flagged_images,
        }
    }
}
