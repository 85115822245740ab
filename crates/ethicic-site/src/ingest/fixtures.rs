//! JSON fixture importer.
//!
//! Fixtures live one file per entity type inside a directory, each an array
//! of `{pk, fields}` objects. Absent files are logged and skipped so partial
//! fixture sets load cleanly. Records are decoded individually; one bad
//! record fails that record, not the file.

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};

use super::rewrite::LegacyRewriter;
use super::text::summarize;
use super::{ImportError, ImportSummary};
use crate::content::fields::{
    BlogPostFields, DifficultyLevel, EncyclopediaCategory, EncyclopediaEntryFields,
    FaqArticleFields, FaqCategory, MediaItem, PageBody,
};
use crate::content::kind::PageKind;
use crate::content::store::SiteContent;
use crate::content::tickets::{SupportTicket, TicketPriority, TicketStatus, TicketType};
use crate::content::tree::slugify;

const SUMMARY_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
struct FixtureRecord {
    #[allow(dead_code)]
    pk: Option<serde_json::Value>,
    fields: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BlogPostFixture {
    title: String,
    slug: String,
    excerpt: String,
    body: String,
    tags: Vec<String>,
    author: String,
    publish_date: Option<NaiveDate>,
    featured: bool,
    reading_time: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FaqArticleFixture {
    title: String,
    slug: String,
    summary: String,
    content: String,
    category: FaqCategory,
    priority: i32,
    featured: bool,
    keywords: String,
    related_articles: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EncyclopediaFixture {
    title: String,
    slug: String,
    summary: String,
    detailed_content: String,
    category: EncyclopediaCategory,
    difficulty_level: DifficultyLevel,
    related_terms: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MediaItemFixture {
    title: String,
    description: String,
    publication: String,
    publication_date: Option<NaiveDate>,
    external_url: String,
    featured: bool,
    sort_order: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TicketFixture {
    name: String,
    email: String,
    company: Option<String>,
    subject: String,
    message: String,
    ticket_type: TicketType,
    status: TicketStatus,
    priority: TicketPriority,
    notes: String,
}

fn read_records(path: &Path) -> Result<Option<Vec<FixtureRecord>>, ImportError> {
    if !path.exists() {
        info!(path = %path.display(), "fixture file absent, skipping");
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&raw)?))
}

fn decode<T: serde::de::DeserializeOwned>(
    record: FixtureRecord,
    summary: &mut ImportSummary,
) -> Option<T> {
    match serde_json::from_value(record.fields) {
        Ok(fields) => Some(fields),
        Err(err) => {
            warn!(error = %err, "skipping malformed fixture record");
            summary.failed += 1;
            None
        }
    }
}

fn live_index(content: &SiteContent, kind: PageKind) -> Option<crate::content::tree::PageId> {
    content
        .tree
        .find_first(kind)
        .filter(|node| node.live)
        .map(|node| node.id)
}

/// Load every recognized fixture file from `dir`.
pub fn import_fixtures(
    content: &mut SiteContent,
    dir: &Path,
) -> Result<ImportSummary, ImportError> {
    let mut summary = ImportSummary::default();
    let rewriter = LegacyRewriter::new();

    if let Some(records) = read_records(&dir.join("blog_posts.json"))? {
        let Some(index) = live_index(content, PageKind::BlogIndex) else {
            warn!("no live blog index; blog post fixtures skipped");
            summary.skipped += records.len();
            return import_rest(content, dir, summary, &rewriter);
        };
        for record in records {
            let Some(fixture): Option<BlogPostFixture> = decode(record, &mut summary) else {
                continue;
            };
            let slug = if fixture.slug.is_empty() {
                slugify(&fixture.title)
            } else {
                fixture.slug.clone()
            };
            if content.tree.exists(PageKind::BlogPost, &fixture.title, &slug) {
                summary.skipped += 1;
                continue;
            }
            let body = rewriter.rewrite(&fixture.body).text;
            let excerpt = if fixture.excerpt.is_empty() {
                summarize(&body, SUMMARY_LIMIT)
            } else {
                fixture.excerpt
            };
            match content.tree.add_child_with_slug(
                index,
                &fixture.title,
                &slug,
                PageBody::BlogPost(BlogPostFields {
                    excerpt,
                    body,
                    tags: fixture.tags,
                    author: fixture.author,
                    publish_date: fixture.publish_date,
                    featured: fixture.featured,
                    reading_time: fixture.reading_time,
                    ..Default::default()
                }),
            ) {
                Ok(id) => {
                    content.tree.publish(id)?;
                    summary.created += 1;
                }
                Err(err) => {
                    warn!(title = %fixture.title, error = %err, "blog post fixture failed");
                    summary.failed += 1;
                }
            }
        }
    }

    import_rest(content, dir, summary, &rewriter)
}

fn import_rest(
    content: &mut SiteContent,
    dir: &Path,
    mut summary: ImportSummary,
    rewriter: &LegacyRewriter,
) -> Result<ImportSummary, ImportError> {
    if let Some(records) = read_records(&dir.join("faq_articles.json"))? {
        match live_index(content, PageKind::FaqIndex) {
            None => {
                warn!("no live FAQ index; FAQ fixtures skipped");
                summary.skipped += records.len();
            }
            Some(index) => {
                for record in records {
                    let Some(fixture): Option<FaqArticleFixture> = decode(record, &mut summary)
                    else {
                        continue;
                    };
                    let slug = if fixture.slug.is_empty() {
                        slugify(&fixture.title)
                    } else {
                        fixture.slug.clone()
                    };
                    if content.tree.exists(PageKind::FaqArticle, &fixture.title, &slug) {
                        summary.skipped += 1;
                        continue;
                    }
                    let body = rewriter.rewrite(&fixture.content).text;
                    match content.tree.add_child_with_slug(
                        index,
                        &fixture.title,
                        &slug,
                        PageBody::FaqArticle(FaqArticleFields {
                            summary: if fixture.summary.is_empty() {
                                summarize(&body, SUMMARY_LIMIT)
                            } else {
                                fixture.summary
                            },
                            content: body,
                            category: fixture.category,
                            priority: fixture.priority,
                            featured: fixture.featured,
                            related_articles: fixture.related_articles,
                            keywords: fixture.keywords,
                        }),
                    ) {
                        Ok(id) => {
                            content.tree.publish(id)?;
                            summary.created += 1;
                        }
                        Err(err) => {
                            warn!(title = %fixture.title, error = %err, "faq fixture failed");
                            summary.failed += 1;
                        }
                    }
                }
            }
        }
    }

    if let Some(records) = read_records(&dir.join("encyclopedia_entries.json"))? {
        match live_index(content, PageKind::EncyclopediaIndex) {
            None => {
                warn!("no live encyclopedia index; encyclopedia fixtures skipped");
                summary.skipped += records.len();
            }
            Some(index) => {
                for record in records {
                    let Some(fixture): Option<EncyclopediaFixture> =
                        decode(record, &mut summary)
                    else {
                        continue;
                    };
                    let slug = if fixture.slug.is_empty() {
                        slugify(&fixture.title)
                    } else {
                        fixture.slug.clone()
                    };
                    if content
                        .tree
                        .exists(PageKind::EncyclopediaEntry, &fixture.title, &slug)
                    {
                        summary.skipped += 1;
                        continue;
                    }
                    let body = rewriter.rewrite(&fixture.detailed_content).text;
                    match content.tree.add_child_with_slug(
                        index,
                        &fixture.title,
                        &slug,
                        PageBody::EncyclopediaEntry(EncyclopediaEntryFields {
                            summary: if fixture.summary.is_empty() {
                                summarize(&body, SUMMARY_LIMIT)
                            } else {
                                fixture.summary
                            },
                            detailed_content: body,
                            category: fixture.category,
                            related_terms: fixture.related_terms,
                            difficulty_level: fixture.difficulty_level,
                            ..Default::default()
                        }),
                    ) {
                        Ok(id) => {
                            content.tree.publish(id)?;
                            summary.created += 1;
                        }
                        Err(err) => {
                            warn!(title = %fixture.title, error = %err, "encyclopedia fixture failed");
                            summary.failed += 1;
                        }
                    }
                }
            }
        }
    }

    if let Some(records) = read_records(&dir.join("media_items.json"))? {
        let media_page = content
            .tree
            .pages_of_kind(PageKind::Media)
            .first()
            .map(|node| node.id);
        match media_page {
            None => {
                warn!("no media page; media item fixtures skipped");
                summary.skipped += records.len();
            }
            Some(id) => {
                let mut items: Vec<MediaItem> = Vec::new();
                for record in records {
                    let Some(fixture): Option<MediaItemFixture> = decode(record, &mut summary)
                    else {
                        continue;
                    };
                    items.push(MediaItem {
                        title: fixture.title,
                        description: fixture.description,
                        publication: fixture.publication,
                        publication_date: fixture.publication_date,
                        external_url: fixture.external_url,
                        featured: fixture.featured,
                        sort_order: fixture.sort_order,
                    });
                }
                let (title, body) = {
                    let node = content
                        .tree
                        .node(id)
                        .ok_or(ImportError::Malformed("media page vanished".into()))?;
                    (node.title.clone(), node.body.clone())
                };
                if let PageBody::Media(mut media) = body {
                    for item in items {
                        if media.items.iter().any(|existing| existing.title == item.title) {
                            summary.skipped += 1;
                        } else {
                            media.items.push(item);
                            summary.created += 1;
                        }
                    }
                    content.tree.save(id, &title, PageBody::Media(media))?;
                }
            }
        }
    }

    if let Some(records) = read_records(&dir.join("support_tickets.json"))? {
        for record in records {
            let Some(fixture): Option<TicketFixture> = decode(record, &mut summary) else {
                continue;
            };
            let duplicate = content.tickets.iter().any(|ticket| {
                ticket.email == fixture.email && ticket.subject == fixture.subject
            });
            if duplicate {
                summary.skipped += 1;
                continue;
            }
            let mut ticket = SupportTicket::new(
                &fixture.name,
                &fixture.email,
                &fixture.subject,
                &fixture.message,
            );
            ticket.id = content.tickets.len() as u64 + 1;
            ticket.company = fixture.company.filter(|company| !company.trim().is_empty());
            ticket.ticket_type = fixture.ticket_type;
            ticket.status = fixture.status;
            ticket.priority = fixture.priority;
            ticket.notes = fixture.notes;
            content.tickets.push(ticket);
            summary.created += 1;
        }
    }

    Ok(summary)
}
