//! Template environment and context builders.
//!
//! Every page render goes through [`base_context`] so the chrome (site
//! identity, navigation, flash) is uniform, then merges in per-kind fields.

use ethicic_site::content::blocks::ContentBlock;
use ethicic_site::content::fields::{BlogPostFields, PageBody, PriDdqFields};
use ethicic_site::content::queries::{EntryRef, FaqRef, PostRef};
use ethicic_site::content::site_config::SiteConfiguration;
use ethicic_site::content::{PageNode, PageTree};
use minijinja::{context, Environment, Value};

pub(crate) const BLOG_PAGE_SIZE: usize = 12;
pub(crate) const FILTERED_PAGE_SIZE: usize = 10;

pub(crate) fn environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    for (name, source) in [
        ("base.html", include_str!("../templates/base.html")),
        ("home.html", include_str!("../templates/home.html")),
        ("about.html", include_str!("../templates/about.html")),
        ("contact.html", include_str!("../templates/contact.html")),
        ("blog_index.html", include_str!("../templates/blog_index.html")),
        ("blog_post.html", include_str!("../templates/blog_post.html")),
        ("_post_list.html", include_str!("../templates/_post_list.html")),
        ("faq_index.html", include_str!("../templates/faq_index.html")),
        ("faq_article.html", include_str!("../templates/faq_article.html")),
        (
            "encyclopedia_index.html",
            include_str!("../templates/encyclopedia_index.html"),
        ),
        (
            "encyclopedia_entry.html",
            include_str!("../templates/encyclopedia_entry.html"),
        ),
        ("strategy.html", include_str!("../templates/strategy.html")),
        (
            "strategy_list.html",
            include_str!("../templates/strategy_list.html"),
        ),
        ("media.html", include_str!("../templates/media.html")),
        ("pri_ddq.html", include_str!("../templates/pri_ddq.html")),
        ("sectioned.html", include_str!("../templates/sectioned.html")),
    ] {
        env.add_template(name, source)?;
    }
    Ok(env)
}

/// Flash banner shown above the page content.
pub(crate) struct Flash {
    pub(crate) message: String,
    pub(crate) kind: &'static str,
}

impl Flash {
    pub(crate) fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: "success",
        }
    }

    pub(crate) fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: "error",
        }
    }
}

/// Chrome shared by every full-page render.
pub(crate) fn base_context(
    site: &SiteConfiguration,
    page_title: &str,
    meta_description: &str,
    flash: Option<&Flash>,
) -> Value {
    let meta_description = if meta_description.is_empty() {
        site.seo_default_description.as_str()
    } else {
        meta_description
    };
    context! {
        page_title => page_title,
        meta_description => meta_description,
        site => site,
        nav_items => site.nav_items(),
        footer_items => site.footer_items(),
        flash => flash.map(|flash| flash.message.as_str()),
        flash_kind => flash.map(|flash| flash.kind),
    }
}

/// One post card for the listing templates.
pub(crate) fn post_card(tree: &PageTree, post: PostRef<'_>) -> Value {
    let (node, fields) = post;
    context! {
        url => tree.url_path(node.id),
        title => node.title,
        publish_date => fields
            .publish_date
            .map(|date| date.format("%B %-d, %Y").to_string()),
        author => fields.author,
        reading_time => fields.reading_time,
        excerpt => fields.excerpt,
        tags => fields.tags,
    }
}

pub(crate) fn post_cards(tree: &PageTree, posts: &[PostRef<'_>]) -> Vec<Value> {
    posts.iter().map(|post| post_card(tree, *post)).collect()
}

/// Blog post body blocks keyed the way `blog_post.html` dispatches on them.
pub(crate) fn block_contexts(fields: &BlogPostFields) -> Vec<Value> {
    fields
        .content
        .iter()
        .map(|block| match block {
            ContentBlock::RichText(html) => context! { kind => "rich_text", html => html },
            ContentBlock::KeyStatistic(stat) => context! {
                kind => "key_statistic",
                value => stat.value,
                label => stat.label,
                description => stat.description,
            },
            ContentBlock::Table(table) => context! {
                kind => "table",
                caption => table.caption,
                rows => table.rows,
            },
            ContentBlock::Image(image) => context! {
                kind => "image",
                url => image.url,
                alt_text => image.alt_text,
            },
            ContentBlock::Callout(callout) => context! {
                kind => "callout",
                style => format!("{:?}", callout.kind).to_lowercase(),
                title => callout.title,
                body => callout.body,
            },
            ContentBlock::Quote(quote) => context! {
                kind => "quote",
                text => quote.text,
                author => quote.author,
            },
        })
        .collect()
}

pub(crate) fn faq_card(tree: &PageTree, article: FaqRef<'_>) -> Value {
    let (node, fields) = article;
    context! {
        url => tree.url_path(node.id),
        title => node.title,
        summary => fields.summary,
    }
}

pub(crate) fn entry_card(tree: &PageTree, entry: EntryRef<'_>) -> Value {
    let (node, fields) = entry;
    context! {
        url => tree.url_path(node.id),
        title => node.title,
        summary => fields.summary,
    }
}

/// The DDQ page's seven section bodies with their display headings, empty
/// sections dropped.
pub(crate) fn ddq_sections(fields: &PriDdqFields) -> Vec<Value> {
    [
        ("Strategy & Governance", &fields.strategy_governance_content),
        ("ESG Integration", &fields.esg_integration_content),
        ("Stewardship", &fields.stewardship_content),
        ("Transparency", &fields.transparency_content),
        ("Climate", &fields.climate_content),
        (
            "Reporting & Verification",
            &fields.reporting_verification_content,
        ),
        ("Additional Information", &fields.additional_content),
    ]
    .into_iter()
    .filter(|(_, html)| !html.is_empty())
    .map(|(title, html)| context! { title => title, html => html })
    .collect()
}

/// Strategy child pages of the strategies index, as list cards.
pub(crate) fn strategy_cards(tree: &PageTree, index: &PageNode) -> Vec<Value> {
    tree.children(index.id)
        .into_iter()
        .filter(|node| node.live)
        .filter_map(|node| match &node.body {
            PageBody::Strategy(fields) => Some(context! {
                url => tree.url_path(node.id),
                title => node.title,
                subtitle => fields.subtitle,
                risk_level => fields.risk_level,
                holdings_count => fields.holdings_count,
            }),
            _ => None,
        })
        .collect()
}
