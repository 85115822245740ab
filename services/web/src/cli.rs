use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ethicic_site::config::AppConfig;
use ethicic_site::content::fields::{PageBody, PriDdqFields};
use ethicic_site::content::{ContentStore, PageKind, SiteContent};
use ethicic_site::ddq::save_ddq_page;
use ethicic_site::ingest::ddq_markdown::parse_ddq_markdown;
use ethicic_site::ingest::fixtures::import_fixtures;
use ethicic_site::ingest::performance::import_performance_csv;
use ethicic_site::ingest::rewrite::LegacyRewriter;
use ethicic_site::ingest::wordpress::import_wordpress_xml;
use ethicic_site::{telemetry, SiteError};
use tracing::warn;

use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "Ethical Capital Site",
    about = "Serve the public site and run content ingestion jobs",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// One-shot content ingestion jobs against the content database
    Import {
        #[command(subcommand)]
        command: ImportCommand,
    },
    /// Re-derive reading time for blog posts
    RecomputeReadingTime {
        /// Recompute every post, not just those with the historic default
        #[arg(long)]
        force: bool,
    },
    /// Rewrite legacy investvegan.org URLs and emails across live content
    RewriteLegacyUrls,
}

#[derive(Subcommand, Debug)]
enum ImportCommand {
    /// Import a WordPress WXR export file
    Wordpress { file: PathBuf },
    /// Import JSON fixture files from a directory
    Fixtures { dir: PathBuf },
    /// Import a DDQ markdown document into the PRI DDQ page
    Ddq {
        file: PathBuf,
        /// Page title used when the DDQ page has to be created
        #[arg(long, default_value = "PRI DDQ")]
        title: String,
    },
    /// Replace a strategy page's return table from a performance CSV
    Performance {
        file: PathBuf,
        /// Exact title of the strategy page to update
        #[arg(long)]
        strategy: String,
    },
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), SiteError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Import { command } => run_import(command),
        Command::RecomputeReadingTime { force } => {
            let store = job_store()?;
            let updated = store.update(|content| Ok(content.tree.recompute_reading_times(force)))?;
            println!("recomputed reading time for {updated} posts");
            Ok(())
        }
        Command::RewriteLegacyUrls => {
            let store = job_store()?;
            let (pages, replacements) = store.update(rewrite_legacy_urls)?;
            println!("rewrote {replacements} legacy references across {pages} pages");
            Ok(())
        }
    }
}

fn job_store() -> Result<ContentStore, SiteError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(ContentStore::new(config.content.db_path))
}

fn run_import(command: ImportCommand) -> Result<(), SiteError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let store = ContentStore::new(config.content.db_path.clone());

    match command {
        ImportCommand::Wordpress { file } => {
            let xml = fs::read_to_string(&file)?;
            let summary =
                store.update(|content| Ok(import_wordpress_xml(content, &xml)?))?;
            println!("wordpress import: {summary}");
        }
        ImportCommand::Fixtures { dir } => {
            let summary = store.update(|content| Ok(import_fixtures(content, &dir)?))?;
            println!("fixture import: {summary}");
        }
        ImportCommand::Ddq { file, title } => {
            let markdown = fs::read_to_string(&file)?;
            let sections = parse_ddq_markdown(&markdown);
            let populated = sections.populated();
            store.update(|content| {
                let existing = content
                    .tree
                    .pages_of_kind(PageKind::PriDdq)
                    .into_iter()
                    .next()
                    .and_then(|node| match &node.body {
                        PageBody::PriDdq(fields) => {
                            Some((node.id, node.title.clone(), fields.clone()))
                        }
                        _ => None,
                    });
                let (id, title, mut fields) = match existing {
                    Some(parts) => parts,
                    None => {
                        let root = content
                            .tree
                            .root()
                            .ok_or_else(|| SiteError::Store("empty page tree".into()))?;
                        let id = content.tree.add_child(
                            root,
                            &title,
                            PageBody::PriDdq(PriDdqFields::default()),
                        )?;
                        (id, title.clone(), PriDdqFields::default())
                    }
                };
                sections.apply(&mut fields);
                save_ddq_page(&mut content.tree, id, &title, fields, config.environment)?;
                Ok(())
            })?;
            println!("DDQ import: {populated} of 7 sections populated");
        }
        ImportCommand::Performance { file, strategy } => {
            let csv = fs::read_to_string(&file)?;
            let summary =
                store.update(|content| Ok(import_performance_csv(content, &strategy, &csv)?))?;
            println!("performance import: {summary}");
        }
    }
    Ok(())
}

/// Apply the legacy URL/email map to every rewritable rich-text field,
/// saving and republishing the pages that changed.
fn rewrite_legacy_urls(content: &mut SiteContent) -> Result<(usize, usize), SiteError> {
    let rewriter = LegacyRewriter::new();
    let targets: Vec<_> = [
        PageKind::BlogPost,
        PageKind::FaqArticle,
        PageKind::EncyclopediaEntry,
    ]
    .into_iter()
    .flat_map(|kind| content.tree.pages_of_kind(kind))
    .map(|node| (node.id, node.title.clone(), node.body.clone()))
    .collect();

    let mut pages = 0;
    let mut replacements = 0;
    for (id, title, mut body) in targets {
        let mut changed = 0;
        {
            let fields: Vec<&mut String> = match &mut body {
                PageBody::BlogPost(post) => vec![&mut post.body, &mut post.excerpt],
                PageBody::FaqArticle(article) => {
                    vec![&mut article.content, &mut article.summary]
                }
                PageBody::EncyclopediaEntry(entry) => vec![
                    &mut entry.detailed_content,
                    &mut entry.summary,
                    &mut entry.examples,
                    &mut entry.further_reading,
                ],
                _ => Vec::new(),
            };
            for field in fields {
                let outcome = rewriter.rewrite(field);
                for image in &outcome.flagged_images {
                    warn!(page = %title, url = %image, "legacy image URL left in place");
                }
                if outcome.changed() {
                    changed += outcome.replacements;
                    *field = outcome.text;
                }
            }
        }
        if changed > 0 {
            content.tree.save(id, &title, body)?;
            content.tree.publish(id)?;
            pages += 1;
            replacements += changed;
        }
    }
    Ok((pages, replacements))
}
