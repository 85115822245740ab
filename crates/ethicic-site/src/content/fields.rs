//! Per-type page attributes.
//!
//! Every page in the tree carries a [`PageBody`], a tagged union with one
//! attribute struct per page type. Rich-text fields are plain `String`s and
//! may be empty; grouped content (principles, process steps, return rows,
//! strategy child rows) is typed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::blocks::ContentBlock;
use super::kind::PageKind;

/// A titled rich-text pair used across several page types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitledSection {
    pub title: String,
    pub body: String,
}

/// Hero triple shared by the bespoke one-off page types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hero {
    pub title: String,
    pub subtitle: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageBody {
    Home(HomeFields),
    About(AboutFields),
    Contact(ContactFields),
    BlogIndex(BlogIndexFields),
    BlogPost(BlogPostFields),
    FaqIndex(FaqIndexFields),
    FaqArticle(FaqArticleFields),
    EncyclopediaIndex(EncyclopediaIndexFields),
    EncyclopediaEntry(EncyclopediaEntryFields),
    Strategy(StrategyFields),
    StrategyList(StrategyListFields),
    Media(MediaFields),
    PriDdq(PriDdqFields),
    Legal(LegalFields),
    Compliance(ComplianceFields),
    Consultation(SectionedFields),
    Guide(SectionedFields),
    Criteria(SectionedFields),
    Solutions(SectionedFields),
    Advisor(SectionedFields),
    Institutional(SectionedFields),
    Onboarding(SectionedFields),
}

impl PageBody {
    pub const fn kind(&self) -> PageKind {
        match self {
            PageBody::Home(_) => PageKind::Home,
            PageBody::About(_) => PageKind::About,
            PageBody::Contact(_) => PageKind::Contact,
            PageBody::BlogIndex(_) => PageKind::BlogIndex,
            PageBody::BlogPost(_) => PageKind::BlogPost,
            PageBody::FaqIndex(_) => PageKind::FaqIndex,
            PageBody::FaqArticle(_) => PageKind::FaqArticle,
            PageBody::EncyclopediaIndex(_) => PageKind::EncyclopediaIndex,
            PageBody::EncyclopediaEntry(_) => PageKind::EncyclopediaEntry,
            PageBody::Strategy(_) => PageKind::Strategy,
            PageBody::StrategyList(_) => PageKind::StrategyList,
            PageBody::Media(_) => PageKind::Media,
            PageBody::PriDdq(_) => PageKind::PriDdq,
            PageBody::Legal(_) => PageKind::Legal,
            PageBody::Compliance(_) => PageKind::Compliance,
            PageBody::Consultation(_) => PageKind::Consultation,
            PageBody::Guide(_) => PageKind::Guide,
            PageBody::Criteria(_) => PageKind::Criteria,
            PageBody::Solutions(_) => PageKind::Solutions,
            PageBody::Advisor(_) => PageKind::Advisor,
            PageBody::Institutional(_) => PageKind::Institutional,
            PageBody::Onboarding(_) => PageKind::Onboarding,
        }
    }
}

// ---------------------------------------------------------------------------
// Home
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeFields {
    pub hero_tagline: String,
    pub hero_title: String,
    pub hero_subtitle: String,
    pub excluded_percentage: String,
    pub since_year: String,
    pub philosophy_title: String,
    pub philosophy_content: String,
    pub philosophy_highlight: String,
    pub process_principles: [TitledSection; 3],
    pub practice_principles: [TitledSection; 3],
    pub process_steps: [TitledSection; 4],
    pub who_we_serve: [TitledSection; 3],
    pub cta_title: String,
    pub cta_description: String,
    pub minimum_investment_text: String,
    pub client_availability_text: String,
    pub disclaimer_text: String,
}

impl HomeFields {
    /// Hard-coded context used when the CMS site root is misconfigured.
    pub fn fallback() -> Self {
        fn section(title: &str, body: &str) -> TitledSection {
            TitledSection {
                title: title.to_string(),
                body: body.to_string(),
            }
        }

        Self {
            hero_tagline: "We're not like other firms. Good.".into(),
            hero_title: "Concentrated ethical portfolios for investors who refuse to compromise"
                .into(),
            hero_subtitle: "<p>We hand-screen thousands of companies, exclude 57% of the S&P \
                            500*, and build high-conviction portfolios where ethics and \
                            excellence converge.</p>"
                .into(),
            excluded_percentage: "57%".into(),
            since_year: "SINCE 2021".into(),
            philosophy_title: "Ethics Reveal Quality".into(),
            philosophy_content: "<p>We view ethical screening not as a limitation, but a luxury. \
                                 Eliminating low-quality companies upfront reveals something \
                                 profound: the businesses that survive our scrutiny are those \
                                 woven into the fabric of healthy social systems.</p>"
                .into(),
            philosophy_highlight: "When ethics and excellence converge, sustainable investing \
                                   outcomes follow."
                .into(),
            process_principles: [
                section(
                    "Rigorous Research",
                    "We conduct deep fundamental analysis on every company before inclusion.",
                ),
                section(
                    "Ethical Screening",
                    "Our comprehensive screening process excludes companies that conflict with \
                     our values.",
                ),
                section(
                    "Active Management",
                    "We continuously monitor and adjust portfolios based on changing conditions.",
                ),
            ],
            practice_principles: [
                section(
                    "Transparency",
                    "Full disclosure of holdings and methodology to all clients.",
                ),
                section(
                    "Fiduciary Standard",
                    "We are legally bound to act in your best interests at all times.",
                ),
                section(
                    "Alignment",
                    "Our interests are aligned with yours through fee structures and shared \
                     values.",
                ),
            ],
            process_steps: [
                section(
                    "Comprehensive Ethical Screening",
                    "<strong>We begin where others end.</strong> Our multi-factor screening \
                     excludes companies involved in fossil fuels, weapons systems, factory \
                     farming, tobacco, gambling, and those failing our governance standards.",
                ),
                section(
                    "Fundamental Analysis",
                    "<strong>Ethics alone don't make an investment.</strong> From the companies \
                     that pass our screens, we identify those with durable competitive \
                     advantages.",
                ),
                section(
                    "Portfolio Construction",
                    "<strong>From thousands screened to hundreds researched to 15-25 \
                     owned.</strong> We size positions based on conviction level, business \
                     quality, and risk contribution.",
                ),
                section(
                    "Continuous Monitoring and Evolution",
                    "<strong>Investing isn't static.</strong> We monitor holdings daily, \
                     reassess theses quarterly, and evolve our process continuously.",
                ),
            ],
            who_we_serve: [
                section(
                    "Individual Investors",
                    "People who want their investments to reflect their values.",
                ),
                section(
                    "Financial Advisors",
                    "Fee-only advisors seeking ethical investment solutions for their clients.",
                ),
                section(
                    "Institutions",
                    "Foundations, endowments, and other institutions with ethical mandates.",
                ),
            ],
            cta_title: "Let's start our journey together.".into(),
            cta_description: String::new(),
            minimum_investment_text: "No investment minimums".into(),
            client_availability_text: "Currently accepting new clients".into(),
            disclaimer_text: "<p>Past performance does not guarantee future results. All \
                              investments carry risk of loss.</p>"
                .into(),
        }
    }
}

// ---------------------------------------------------------------------------
// About / Contact
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturedPost {
    pub title: String,
    pub description: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLinks {
    pub linkedin: String,
    pub twitter: String,
    pub github: String,
    pub mastodon: String,
    pub bluesky: String,
    pub instagram: String,
    pub youtube: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AboutFields {
    pub headshot_url: String,
    pub headshot_alt: String,
    pub philosophy_quote: String,
    pub philosophy_attribution_url: String,
    pub name: String,
    pub professional_title: String,
    pub social_links: SocialLinks,
    pub background: TitledSection,
    pub external_roles: TitledSection,
    pub speaking_writing: TitledSection,
    pub personal_interests: TitledSection,
    pub featured_posts: [FeaturedPost; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactFields {
    pub intro_text: String,
    pub contact_description: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub show_contact_form: bool,
}

impl Default for ContactFields {
    fn default() -> Self {
        Self {
            intro_text: String::new(),
            contact_description: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            show_contact_form: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Blog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogIndexFields {
    pub intro_text: String,
    pub description: String,
    pub display_title: String,
    pub featured_title: String,
    pub featured_description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogPostFields {
    pub excerpt: String,
    /// Ordered block sequence; the preferred body representation.
    pub content: Vec<ContentBlock>,
    /// Legacy plain rich-text body kept for imported posts.
    pub body: String,
    pub featured_image: String,
    pub tags: Vec<String>,
    pub author: String,
    pub publish_date: Option<NaiveDate>,
    pub featured: bool,
    /// Minutes; derived at save time when unset.
    pub reading_time: Option<u32>,
}

// ---------------------------------------------------------------------------
// FAQ
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqIndexFields {
    pub intro_text: String,
    pub description: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub contact_address: String,
    pub meeting_url: String,
}

/// Closed category set for FAQ articles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaqCategory {
    Account,
    Investment,
    Planning,
    Company,
    Help,
    Altruist,
    #[default]
    General,
    EthicalCapital,
    HowWeInvest,
    Investing101,
    BigQuestions,
    InvestmentApproach,
    EsgIntegration,
    Stewardship,
    Reporting,
}

impl FaqCategory {
    pub const fn label(self) -> &'static str {
        match self {
            FaqCategory::Account => "Account Management & Setup",
            FaqCategory::Investment => "Investment Philosophy & Options",
            FaqCategory::Planning => "Financial Planning & Education",
            FaqCategory::Company => "Company Information",
            FaqCategory::Help => "Help & Insight",
            FaqCategory::Altruist => "Altruist Platform",
            FaqCategory::General => "General Questions",
            FaqCategory::EthicalCapital => "Ethical Capital Philosophy",
            FaqCategory::HowWeInvest => "How We Invest",
            FaqCategory::Investing101 => "Investing 101",
            FaqCategory::BigQuestions => "Big Questions",
            FaqCategory::InvestmentApproach => "Investment Approach & Philosophy",
            FaqCategory::EsgIntegration => "ESG Integration & Analysis",
            FaqCategory::Stewardship => "Stewardship & Engagement",
            FaqCategory::Reporting => "Reporting & Verification",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqArticleFields {
    pub summary: String,
    pub content: String,
    pub category: FaqCategory,
    /// Higher numbers appear first.
    pub priority: i32,
    pub featured: bool,
    /// Comma-separated related article titles.
    pub related_articles: String,
    pub keywords: String,
}

impl FaqArticleFields {
    /// Titles named by `related_articles`, trimmed, empties dropped.
    pub fn related_titles(&self) -> Vec<String> {
        self.related_articles
            .split(',')
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .map(str::to_string)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Encyclopedia
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncyclopediaIndexFields {
    pub intro_text: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncyclopediaCategory {
    Risk,
    Strategy,
    Instruments,
    Analysis,
    Ethics,
    Markets,
    Regulation,
    #[default]
    General,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    #[default]
    Unset,
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncyclopediaEntryFields {
    pub summary: String,
    pub detailed_content: String,
    pub category: EncyclopediaCategory,
    /// Comma-separated related terms.
    pub related_terms: String,
    pub difficulty_level: DifficultyLevel,
    pub examples: String,
    pub further_reading: String,
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// Strategy/benchmark/difference return triple for one time bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReturnRow {
    pub period: String,
    pub strategy: String,
    pub benchmark: String,
    pub difference: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskMetric {
    pub standard_deviation: String,
    pub sharpe_ratio: String,
    pub max_drawdown: String,
    pub beta: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeographicAllocation {
    pub region: String,
    pub weight: String,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectorPosition {
    pub sector: String,
    pub weight: String,
    pub note: String,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Holding {
    pub name: String,
    pub ticker: String,
    pub weight: String,
    pub thesis: String,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerticalAllocation {
    pub vertical: String,
    pub weight: String,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyDocumentCategory {
    #[default]
    Factsheet,
    Commentary,
    Presentation,
    Disclosure,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyDocument {
    pub title: String,
    pub url: String,
    pub category: StrategyDocumentCategory,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyFields {
    pub subtitle: String,
    pub description: String,
    pub risk_level: String,
    pub ethical_implementation: String,
    pub holdings_count: String,
    pub best_for: String,
    pub cash_allocation: String,
    pub benchmark_name: String,
    /// Four time buckets (e.g. 1Y / 3Y / 5Y / since inception).
    pub performance: Vec<ReturnRow>,
    pub inception_date: Option<NaiveDate>,
    pub sector_positioning_notes: String,
    pub commentary: String,
    pub process: String,
    pub documents_section: TitledSection,
    pub disclaimer: String,
    pub risk_metric: RiskMetric,
    pub geographic_allocations: Vec<GeographicAllocation>,
    pub sector_positions: Vec<SectorPosition>,
    pub holdings: Vec<Holding>,
    pub vertical_allocations: Vec<VerticalAllocation>,
    pub documents: Vec<StrategyDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyListFields {
    pub intro_text: String,
    pub description: String,
    pub comparison_title: String,
    pub comparison_description: String,
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaItem {
    pub title: String,
    pub description: String,
    pub publication: String,
    pub publication_date: Option<NaiveDate>,
    pub external_url: String,
    pub featured: bool,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaFields {
    pub intro_text: String,
    pub press_kit_title: String,
    pub press_kit_description: String,
    pub items: Vec<MediaItem>,
}

impl MediaFields {
    /// Items in display order: featured first, then newest publication date.
    pub fn ordered_items(&self) -> Vec<&MediaItem> {
        let mut items: Vec<&MediaItem> = self.items.iter().collect();
        items.sort_by(|a, b| {
            b.featured
                .cmp(&a.featured)
                .then(b.publication_date.cmp(&a.publication_date))
        });
        items
    }
}

// ---------------------------------------------------------------------------
// PRI DDQ / legal / sectioned one-offs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriDdqFields {
    pub hero: Hero,
    /// Display string, auto-set to the current "Month Year" on save.
    pub updated_at: String,
    pub executive_summary: String,
    pub strategy_governance_content: String,
    pub esg_integration_content: String,
    pub stewardship_content: String,
    pub transparency_content: String,
    pub climate_content: String,
    pub reporting_verification_content: String,
    pub additional_content: String,
    pub screening_policy_url: String,
    pub form_adv_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegalFields {
    pub intro_text: String,
    pub content: String,
    pub effective_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceFields {
    pub intro_text: String,
    pub content: String,
    pub effective_date: Option<NaiveDate>,
    pub document_type: String,
    pub version: String,
}

/// Generic shape for the one-off marketing pages (consultation, guide,
/// criteria, solutions, advisor, institutional, onboarding): a hero triplet
/// plus a handful of named rich-text sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionedFields {
    pub hero: Hero,
    pub sections: Vec<TitledSection>,
}
