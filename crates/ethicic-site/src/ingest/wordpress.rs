//! WordPress WXR export importer.
//!
//! Streams the export with `quick-xml` and collects `<item>` and `<wp:term>`
//! records, then applies them to the page tree. Only published items are
//! considered. Classification:
//!
//! - `post_type` `post` → blog post;
//! - `post_type` `docs` with a `glossaries` category → encyclopedia entry;
//! - `post_type` `docs` otherwise → FAQ article;
//! - `<wp:term>` with taxonomy `glossaries` → encyclopedia entry (skipped
//!   when the term has no description).
//!
//! A record whose title or slug already exists is counted as skipped, so the
//! import can be re-run against the same export.

use chrono::NaiveDateTime;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;

use super::rewrite::LegacyRewriter;
use super::text::{clean_wordpress_content, derive_title, summarize, unescape_entities};
use super::{ImportError, ImportSummary};
use crate::content::fields::{
    BlogPostFields, DifficultyLevel, EncyclopediaEntryFields, FaqArticleFields, PageBody,
};
use crate::content::kind::PageKind;
use crate::content::store::SiteContent;
use crate::content::tree::slugify;

const SUMMARY_LIMIT: usize = 500;

#[derive(Debug, Clone, Default)]
struct WxrItem {
    title: String,
    slug: String,
    status: String,
    post_type: String,
    content: String,
    excerpt: String,
    author: String,
    post_date: String,
    category_slugs: Vec<String>,
}

#[derive(Debug, Clone, Default)]
struct WxrTerm {
    taxonomy: String,
    slug: String,
    name: String,
    description: String,
}

#[derive(Debug, Default)]
struct Export {
    items: Vec<WxrItem>,
    terms: Vec<WxrTerm>,
}

fn parse_export(xml: &str) -> Result<Export, ImportError> {
    let mut reader = Reader::from_str(xml);
    let mut export = Export::default();
    let mut item: Option<WxrItem> = None;
    let mut term: Option<WxrTerm> = None;
    // Qualified name of the element whose text is being collected.
    let mut field: Option<String> = None;
    let mut buffer = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                match name.as_str() {
                    "item" => item = Some(WxrItem::default()),
                    "wp:term" => term = Some(WxrTerm::default()),
                    "category" => {
                        if let Some(item) = item.as_mut() {
                            let mut domain = String::new();
                            let mut nicename = String::new();
                            for attr in start.attributes() {
                                let attr = attr.map_err(|err| {
                                    ImportError::Malformed(format!("bad attribute: {err}"))
                                })?;
                                let value =
                                    String::from_utf8_lossy(&attr.value).into_owned();
                                match attr.key.as_ref() {
                                    b"domain" => domain = value,
                                    b"nicename" => nicename = value,
                                    _ => {}
                                }
                            }
                            if domain == "category" && !nicename.is_empty() {
                                item.category_slugs.push(nicename);
                            }
                        }
                        field = Some(name);
                        buffer.clear();
                    }
                    _ => {
                        field = Some(name);
                        buffer.clear();
                    }
                }
            }
            Event::Text(text) => {
                if field.is_some() {
                    buffer.push_str(&unescape_entities(&String::from_utf8_lossy(
                        &text.into_inner(),
                    )));
                }
            }
            Event::CData(cdata) => {
                if field.is_some() {
                    buffer.push_str(&String::from_utf8_lossy(&cdata.into_inner()));
                }
            }
            Event::End(end) => {
                let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                let value = buffer.trim().to_string();
                match name.as_str() {
                    "item" => {
                        if let Some(item) = item.take() {
                            export.items.push(item);
                        }
                    }
                    "wp:term" => {
                        if let Some(term) = term.take() {
                            export.terms.push(term);
                        }
                    }
                    _ => {
                        if let Some(item) = item.as_mut() {
                            match name.as_str() {
                                "title" => item.title = value,
                                "wp:post_name" => item.slug = value,
                                "wp:status" => item.status = value,
                                "wp:post_type" => item.post_type = value,
                                "content:encoded" => item.content = value,
                                "excerpt:encoded" => item.excerpt = value,
                                "dc:creator" => item.author = value,
                                "wp:post_date" => item.post_date = value,
                                _ => {}
                            }
                        } else if let Some(term) = term.as_mut() {
                            match name.as_str() {
                                "wp:term_taxonomy" => term.taxonomy = value,
                                "wp:term_slug" => term.slug = value,
                                "wp:term_name" => term.name = value,
                                "wp:term_description" => term.description = value,
                                _ => {}
                            }
                        }
                    }
                }
                field = None;
                buffer.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(export)
}

fn live_index(content: &SiteContent, kind: PageKind) -> Option<crate::content::tree::PageId> {
    content
        .tree
        .find_first(kind)
        .filter(|node| node.live)
        .map(|node| node.id)
}

fn parse_publish_date(raw: &str) -> Option<chrono::NaiveDate> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

/// Import a WXR export string into the content tree.
pub fn import_wordpress_xml(
    content: &mut SiteContent,
    xml: &str,
) -> Result<ImportSummary, ImportError> {
    let export = parse_export(xml)?;
    let rewriter = LegacyRewriter::new();
    let mut summary = ImportSummary::default();

    let blog_index = live_index(content, PageKind::BlogIndex);
    let faq_index = live_index(content, PageKind::FaqIndex);
    let ency_index = live_index(content, PageKind::EncyclopediaIndex);
    if blog_index.is_none() {
        warn!("no live blog index; blog posts in the export will be skipped");
    }
    if faq_index.is_none() {
        warn!("no live FAQ index; docs in the export will be skipped");
    }
    if ency_index.is_none() {
        warn!("no live encyclopedia index; glossary records will be skipped");
    }

    for item in &export.items {
        if item.status != "publish" {
            summary.skipped += 1;
            continue;
        }
        let body_html = rewriter.rewrite(&clean_wordpress_content(&item.content)).text;
        let title = derive_title(&item.title, &body_html, &item.slug);
        let slug = if item.slug.is_empty() {
            slugify(&title)
        } else {
            item.slug.clone()
        };

        let outcome = match item.post_type.as_str() {
            "post" => {
                let Some(index) = blog_index else {
                    summary.skipped += 1;
                    continue;
                };
                if content.tree.exists(PageKind::BlogPost, &title, &slug) {
                    summary.skipped += 1;
                    continue;
                }
                let excerpt = if item.excerpt.trim().is_empty() {
                    summarize(&body_html, SUMMARY_LIMIT)
                } else {
                    rewriter.rewrite(item.excerpt.trim()).text
                };
                content.tree.add_child_with_slug(
                    index,
                    &title,
                    &slug,
                    PageBody::BlogPost(BlogPostFields {
                        excerpt,
                        body: body_html.clone(),
                        author: item.author.clone(),
                        publish_date: parse_publish_date(&item.post_date),
                        ..Default::default()
                    }),
                )
            }
            "docs" => {
                let glossary = item
                    .category_slugs
                    .iter()
                    .any(|slug| slug == "glossaries");
                if glossary {
                    let Some(index) = ency_index else {
                        summary.skipped += 1;
                        continue;
                    };
                    if content.tree.exists(PageKind::EncyclopediaEntry, &title, &slug) {
                        summary.skipped += 1;
                        continue;
                    }
                    content.tree.add_child_with_slug(
                        index,
                        &title,
                        &slug,
                        PageBody::EncyclopediaEntry(EncyclopediaEntryFields {
                            summary: summarize(&body_html, SUMMARY_LIMIT),
                            detailed_content: body_html.clone(),
                            difficulty_level: DifficultyLevel::Beginner,
                            ..Default::default()
                        }),
                    )
                } else {
                    let Some(index) = faq_index else {
                        summary.skipped += 1;
                        continue;
                    };
                    if content.tree.exists(PageKind::FaqArticle, &title, &slug) {
                        summary.skipped += 1;
                        continue;
                    }
                    content.tree.add_child_with_slug(
                        index,
                        &title,
                        &slug,
                        PageBody::FaqArticle(FaqArticleFields {
                            summary: summarize(&body_html, SUMMARY_LIMIT),
                            content: body_html.clone(),
                            ..Default::default()
                        }),
                    )
                }
            }
            _ => {
                summary.skipped += 1;
                continue;
            }
        };

        match outcome {
            Ok(id) => {
                content.tree.publish(id)?;
                summary.created += 1;
            }
            Err(err) => {
                warn!(title = %title, error = %err, "skipping item that failed to attach");
                summary.failed += 1;
            }
        }
    }

    for term in &export.terms {
        if term.taxonomy != "glossaries" {
            continue;
        }
        if term.description.trim().is_empty() {
            summary.skipped += 1;
            continue;
        }
        let Some(index) = ency_index else {
            summary.skipped += 1;
            continue;
        };
        let title = derive_title(&term.name, &term.description, &term.slug);
        let slug = if term.slug.is_empty() {
            slugify(&title)
        } else {
            term.slug.clone()
        };
        if content.tree.exists(PageKind::EncyclopediaEntry, &title, &slug) {
            summary.skipped += 1;
            continue;
        }
        let description = rewriter.rewrite(term.description.trim()).text;
        match content.tree.add_child_with_slug(
            index,
            &title,
            &slug,
            PageBody::EncyclopediaEntry(EncyclopediaEntryFields {
                summary: summarize(&description, SUMMARY_LIMIT),
                detailed_content: format!("<p>{description}</p>"),
                difficulty_level: DifficultyLevel::Beginner,
                ..Default::default()
            }),
        ) {
            Ok(id) => {
                content.tree.publish(id)?;
                summary.created += 1;
            }
            Err(err) => {
                warn!(term = %term.name, error = %err, "skipping glossary term");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}
