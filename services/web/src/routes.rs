use std::path::Component;

use axum::extract::{Path, Query};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::Utc;
use ethicic_site::contact::{client_ip, ContactError, ContactSubmission, FieldError, SubmissionMeta};
use ethicic_site::content::fields::{ContactFields, HomeFields, PageBody};
use ethicic_site::content::site_config::SiteConfiguration;
use ethicic_site::content::{queries, PageKind, PageNode, SiteContent};
use ethicic_site::SiteError;
use minijinja::{context, Value};
use serde::Deserialize;
use serde_json::json;

use crate::infra::AppState;
use crate::render::{
    base_context, block_contexts, ddq_sections, entry_card, faq_card, post_cards, strategy_cards,
    Flash, BLOG_PAGE_SIZE, FILTERED_PAGE_SIZE,
};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageQuery {
    page: Option<usize>,
    submitted: Option<String>,
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home_endpoint))
        .route("/health/", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/robots.txt", get(robots_txt))
        .route("/llms.txt", get(llms_txt))
        .route("/carbon.txt", get(carbon_txt))
        .route("/media/*path", get(media_endpoint))
        .route("/*path", get(page_endpoint).post(contact_post_endpoint))
        .layer(Extension(state))
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "ethicic-web",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn robots_txt() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "User-agent: *\nAllow: /\nDisallow: /health/\nDisallow: /ready\nDisallow: /metrics\n",
    )
}

async fn llms_txt() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "# Ethical Capital\n\nEthical Capital is a fiduciary investment adviser building \
         concentrated, hand-screened ethical portfolios. Key resources: /strategies/ for \
         strategy pages, /blog/ for research articles, /faq/ for common questions, and \
         /encyclopedia/ for the investing glossary.\n",
    )
}

async fn carbon_txt() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "org: Ethical Capital\ndisclosures:\n  - doc: /disclosures/\n",
    )
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "404 Not Found").into_response()
}

fn render_html(state: &AppState, template: &str, ctx: Value) -> Result<Response, SiteError> {
    let html = state.templates.get_template(template)?.render(ctx)?;
    Ok(Html(html).into_response())
}

fn read_content(state: &AppState) -> Result<std::sync::RwLockReadGuard<'_, SiteContent>, SiteError> {
    state
        .content
        .read()
        .map_err(|err| SiteError::Store(err.to_string()))
}

async fn home_endpoint(Extension(state): Extension<AppState>) -> Result<Response, SiteError> {
    let content = read_content(&state)?;
    let tree = &content.tree;

    // Root first, then any live home page, then the hard-coded fallback.
    let resolved = tree
        .root()
        .and_then(|id| tree.node(id))
        .filter(|node| node.live)
        .and_then(|node| match &node.body {
            PageBody::Home(fields) => Some((node.title.clone(), fields.clone())),
            _ => None,
        })
        .or_else(|| {
            tree.find_first(PageKind::Home)
                .filter(|node| node.live)
                .and_then(|node| match &node.body {
                    PageBody::Home(fields) => Some((node.title.clone(), fields.clone())),
                    _ => None,
                })
        });
    let (title, home) =
        resolved.unwrap_or_else(|| ("Ethical Capital".to_string(), HomeFields::fallback()));

    let base = base_context(&content.site_config, &title, "", None);
    render_html(&state, "home.html", context! { home => home, ..base })
}

async fn page_endpoint(
    Extension(state): Extension<AppState>,
    Path(path): Path<String>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Result<Response, SiteError> {
    let content = read_content(&state)?;
    let tree = &content.tree;
    let site = &content.site_config;

    let Some((id, remainder)) = tree.resolve_prefix(&path) else {
        return Ok(not_found());
    };
    let Some(node) = tree.node(id) else {
        return Ok(not_found());
    };
    if !node.live || node.parent.is_none() {
        return Ok(not_found());
    }
    let kind = node.kind();
    let takes_sub_routes = matches!(kind, PageKind::BlogIndex | PageKind::EncyclopediaIndex);
    if !remainder.is_empty() && !takes_sub_routes {
        return Ok(not_found());
    }

    match &node.body {
        PageBody::BlogIndex(fields) => {
            blog_index_response(&state, &content, node, fields, &remainder, &query, &headers)
        }
        PageBody::EncyclopediaIndex(fields) => {
            let (entries, active_letter) = match remainder.as_slice() {
                [] => (queries::encyclopedia_entries(tree), None),
                [letter] if letter.len() == 1 => {
                    let letter = letter
                        .chars()
                        .next()
                        .filter(char::is_ascii_alphabetic)
                        .map(|ch| ch.to_ascii_uppercase());
                    match letter {
                        Some(letter) => {
                            (queries::entries_by_letter(tree, letter), Some(letter))
                        }
                        None => return Ok(not_found()),
                    }
                }
                _ => return Ok(not_found()),
            };
            let cards: Vec<Value> = entries
                .iter()
                .map(|entry| entry_card(tree, *entry))
                .collect();
            let base = base_context(site, &node.title, &fields.description, None);
            render_html(
                &state,
                "encyclopedia_index.html",
                context! {
                    index => fields,
                    index_url => tree.url_path(node.id),
                    letters => queries::available_letters(tree)
                        .into_iter()
                        .map(String::from)
                        .collect::<Vec<_>>(),
                    active_letter => active_letter.map(String::from),
                    entries => cards,
                    ..base
                },
            )
        }
        PageBody::Home(fields) => {
            let base = base_context(site, &node.title, "", None);
            render_html(&state, "home.html", context! { home => fields, ..base })
        }
        PageBody::About(fields) => {
            let sections: Vec<&_> = [
                &fields.background,
                &fields.external_roles,
                &fields.speaking_writing,
                &fields.personal_interests,
            ]
            .into_iter()
            .filter(|section| !section.body.is_empty())
            .collect();
            let social_links: Vec<Value> = [
                ("LinkedIn", &fields.social_links.linkedin),
                ("Twitter", &fields.social_links.twitter),
                ("GitHub", &fields.social_links.github),
                ("Mastodon", &fields.social_links.mastodon),
                ("Bluesky", &fields.social_links.bluesky),
                ("Instagram", &fields.social_links.instagram),
                ("YouTube", &fields.social_links.youtube),
            ]
            .into_iter()
            .filter(|(_, url)| !url.is_empty())
            .map(|(label, url)| context! { label => label, url => url })
            .collect();
            let featured: Vec<&_> = fields
                .featured_posts
                .iter()
                .filter(|post| !post.title.is_empty())
                .collect();
            let base = base_context(site, &node.title, "", None);
            render_html(
                &state,
                "about.html",
                context! {
                    about => fields,
                    sections => sections,
                    social_links => social_links,
                    featured_posts => featured,
                    ..base
                },
            )
        }
        PageBody::Contact(fields) => {
            let flash = query
                .submitted
                .as_deref()
                .map(|_| Flash::success(site.contact_success_message.clone()));
            let action = tree
                .url_path(node.id)
                .unwrap_or_else(|| "/".to_string());
            contact_page(
                &state,
                site,
                node,
                fields,
                &action,
                &ContactSubmission::default(),
                &[],
                flash.as_ref(),
                StatusCode::OK,
            )
        }
        PageBody::BlogPost(fields) => {
            let index_url = node
                .parent
                .and_then(|parent| tree.url_path(parent))
                .unwrap_or_else(|| "/".to_string());
            let blocks = block_contexts(fields);
            // Imported posts carry a single legacy HTML body instead of blocks.
            let legacy_body = fields.content.is_empty().then_some(fields.body.as_str());
            let base = base_context(site, &node.title, &fields.excerpt, None);
            render_html(
                &state,
                "blog_post.html",
                context! {
                    post => fields,
                    blocks => blocks,
                    legacy_body => legacy_body,
                    index_url => index_url,
                    ..base
                },
            )
        }
        PageBody::FaqIndex(fields) => {
            let groups: Vec<Value> = queries::faq_categories(tree)
                .into_iter()
                .map(|(category, articles)| {
                    let cards: Vec<Value> = articles
                        .iter()
                        .map(|article| faq_card(tree, *article))
                        .collect();
                    context! { label => category.label(), articles => cards }
                })
                .collect();
            let base = base_context(site, &node.title, &fields.description, None);
            render_html(
                &state,
                "faq_index.html",
                context! { index => fields, groups => groups, ..base },
            )
        }
        PageBody::FaqArticle(fields) => {
            let related: Vec<Value> = fields
                .related_titles()
                .iter()
                .filter_map(|title| queries::faq_by_title(tree, title))
                .map(|(related_node, _)| {
                    context! {
                        url => tree.url_path(related_node.id),
                        title => related_node.title,
                    }
                })
                .collect();
            let base = base_context(site, &node.title, &fields.summary, None);
            render_html(
                &state,
                "faq_article.html",
                context! {
                    article => fields,
                    category_label => fields.category.label(),
                    related => related,
                    ..base
                },
            )
        }
        PageBody::EncyclopediaEntry(fields) => {
            let related: Vec<Value> = queries::related_entries(tree, node)
                .iter()
                .map(|entry| entry_card(tree, *entry))
                .collect();
            let related_terms: Vec<String> = fields
                .related_terms
                .split(',')
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(str::to_string)
                .collect();
            let base = base_context(site, &node.title, &fields.summary, None);
            render_html(
                &state,
                "encyclopedia_entry.html",
                context! {
                    entry => fields,
                    related => related,
                    related_terms => related_terms,
                    ..base
                },
            )
        }
        PageBody::StrategyList(fields) => {
            let base = base_context(site, &node.title, &fields.description, None);
            render_html(
                &state,
                "strategy_list.html",
                context! {
                    index => fields,
                    strategies => strategy_cards(tree, node),
                    ..base
                },
            )
        }
        PageBody::Strategy(fields) => {
            let mut documents: Vec<_> = fields.documents.iter().collect();
            documents.sort_by_key(|doc| doc.sort_order);
            let base = base_context(site, &node.title, &fields.subtitle, None);
            render_html(
                &state,
                "strategy.html",
                context! { strategy => fields, documents => documents, ..base },
            )
        }
        PageBody::Media(fields) => {
            let base = base_context(site, &node.title, "", None);
            render_html(
                &state,
                "media.html",
                context! { media => fields, items => fields.ordered_items(), ..base },
            )
        }
        PageBody::PriDdq(fields) => {
            let base = base_context(site, &node.title, &fields.hero.subtitle, None);
            render_html(
                &state,
                "pri_ddq.html",
                context! { ddq => fields, sections => ddq_sections(fields), ..base },
            )
        }
        PageBody::Legal(fields) => {
            let base = base_context(site, &node.title, "", None);
            render_html(
                &state,
                "sectioned.html",
                context! {
                    hero => context! {
                        title => node.title,
                        subtitle => "",
                        description => fields.intro_text,
                    },
                    sections => [context! { title => "", body => fields.content }],
                    effective_date => fields
                        .effective_date
                        .map(|date| date.format("%B %-d, %Y").to_string()),
                    ..base
                },
            )
        }
        PageBody::Compliance(fields) => {
            let base = base_context(site, &node.title, "", None);
            render_html(
                &state,
                "sectioned.html",
                context! {
                    hero => context! {
                        title => node.title,
                        subtitle => fields.document_type,
                        description => fields.intro_text,
                    },
                    sections => [context! { title => "", body => fields.content }],
                    effective_date => fields
                        .effective_date
                        .map(|date| date.format("%B %-d, %Y").to_string()),
                    ..base
                },
            )
        }
        PageBody::Consultation(fields)
        | PageBody::Guide(fields)
        | PageBody::Criteria(fields)
        | PageBody::Solutions(fields)
        | PageBody::Advisor(fields)
        | PageBody::Institutional(fields)
        | PageBody::Onboarding(fields) => {
            let base = base_context(site, &node.title, &fields.hero.description, None);
            render_html(
                &state,
                "sectioned.html",
                context! {
                    hero => fields.hero,
                    sections => fields.sections,
                    ..base
                },
            )
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn blog_index_response(
    state: &AppState,
    content: &SiteContent,
    node: &PageNode,
    fields: &ethicic_site::content::fields::BlogIndexFields,
    remainder: &[String],
    query: &PageQuery,
    headers: &HeaderMap,
) -> Result<Response, SiteError> {
    let tree = &content.tree;
    let index_url = tree
        .url_path(node.id)
        .unwrap_or_else(|| "/".to_string());

    let (posts, heading, per_page) = match remainder {
        [] => (queries::blog_posts(tree), None, BLOG_PAGE_SIZE),
        [first, tag] if first.as_str() == "tag" => (
            queries::posts_by_tag(tree, tag),
            Some(format!("Posts tagged \u{201c}{tag}\u{201d}")),
            FILTERED_PAGE_SIZE,
        ),
        [first, slug] if first.as_str() == "author" => {
            let posts = queries::posts_by_author(tree, slug);
            let name = posts
                .first()
                .map(|(_, fields)| fields.author.clone())
                .unwrap_or_else(|| slug.clone());
            (posts, Some(format!("Posts by {name}")), FILTERED_PAGE_SIZE)
        }
        _ => return Ok(not_found()),
    };

    let paged = queries::paginate(posts, query.page.unwrap_or(1), per_page);
    let cards = post_cards(tree, &paged.items);
    let list = context! {
        posts => cards,
        index_url => index_url,
        has_next => paged.has_next(),
        next_page => paged.page + 1,
    };

    // Infinite-scroll requests swap only the article list.
    if headers.contains_key("hx-request") && paged.page > 1 {
        return render_html(state, "_post_list.html", list);
    }

    let featured = if remainder.is_empty() && paged.page == 1 {
        post_cards(tree, &queries::featured_posts(tree))
    } else {
        Vec::new()
    };
    let popular = if remainder.is_empty() {
        post_cards(tree, &queries::popular_posts(tree))
    } else {
        Vec::new()
    };
    let base = base_context(&content.site_config, &node.title, &fields.description, None);
    render_html(
        state,
        "blog_index.html",
        context! {
            index => fields,
            heading => heading,
            featured => (!featured.is_empty()).then_some(featured),
            popular => (!popular.is_empty()).then_some(popular),
            ..context! { ..list, ..base }
        },
    )
}

#[allow(clippy::too_many_arguments)]
fn contact_page(
    state: &AppState,
    site: &SiteConfiguration,
    node: &PageNode,
    fields: &ContactFields,
    action: &str,
    form: &ContactSubmission,
    errors: &[FieldError],
    flash: Option<&Flash>,
    status: StatusCode,
) -> Result<Response, SiteError> {
    let base = base_context(site, &node.title, &fields.contact_description, flash);
    let html = state
        .templates
        .get_template("contact.html")?
        .render(context! {
            contact => fields,
            form => form,
            errors => errors,
            form_action => action,
            ..base
        })?;
    Ok((status, Html(html)).into_response())
}

async fn contact_post_endpoint(
    Extension(state): Extension<AppState>,
    Path(path): Path<String>,
    headers: HeaderMap,
    axum::Form(form): axum::Form<ContactSubmission>,
) -> Result<Response, SiteError> {
    // Clone what the responses need, then release the read lock: the
    // pipeline's ticket store takes the write lock.
    let (node, fields, site, url) = {
        let content = read_content(&state)?;
        let Some(id) = content.tree.resolve(&path) else {
            return Ok(not_found());
        };
        let Some(node) = content.tree.node(id) else {
            return Ok(not_found());
        };
        let PageBody::Contact(fields) = &node.body else {
            return Ok(not_found());
        };
        if !node.live {
            return Ok(not_found());
        }
        let url = content
            .tree
            .url_path(id)
            .unwrap_or_else(|| "/".to_string());
        (
            node.clone(),
            fields.clone(),
            content.site_config.clone(),
            url,
        )
    };

    let meta = SubmissionMeta {
        client_ip: client_ip(&headers, "unknown"),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string(),
    };

    match state.pipeline.submit(&form, &meta) {
        Ok(_) => Ok(Redirect::to(&format!("{url}?submitted=1")).into_response()),
        Err(ContactError::Invalid { errors }) => contact_page(
            &state,
            &site,
            &node,
            &fields,
            &url,
            &form,
            &errors,
            None,
            StatusCode::BAD_REQUEST,
        ),
        Err(ContactError::RateLimited { retry_after_secs }) => {
            let flash = Flash::error(format!(
                "Too many messages. Please try again in {retry_after_secs} seconds."
            ));
            let response = contact_page(
                &state,
                &site,
                &node,
                &fields,
                &url,
                &form,
                &[],
                Some(&flash),
                StatusCode::TOO_MANY_REQUESTS,
            )?;
            Ok((
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                response,
            )
                .into_response())
        }
        Err(err) => {
            tracing::error!(error = %err, "contact submission failed");
            let flash = Flash::error(site.contact_error_message.clone());
            contact_page(
                &state,
                &site,
                &node,
                &fields,
                &url,
                &form,
                &[],
                Some(&flash),
                StatusCode::OK,
            )
        }
    }
}

async fn media_endpoint(
    Extension(state): Extension<AppState>,
    Path(path): Path<String>,
) -> Response {
    let relative = std::path::Path::new(&path);
    // Only plain segments; anything like `..` or an absolute path is refused.
    if relative
        .components()
        .any(|component| !matches!(component, Component::Normal(_)))
    {
        return not_found();
    }
    let full = state.media_root.join(relative);
    match std::fs::read(&full) {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&full).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.essence_str().to_string())],
                bytes,
            )
                .into_response()
        }
        Err(_) => not_found(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::SharedTicketStore;
    use crate::render;
    use axum::body::Body;
    use axum::http::Request;
    use axum_prometheus::PrometheusMetricLayer;
    use chrono::NaiveDate;
    use ethicic_site::config::MailConfig;
    use ethicic_site::contact::{ContactPipeline, RecordingMailer};
    use ethicic_site::content::fields::BlogPostFields;
    use ethicic_site::content::ContentStore;
    use metrics_exporter_prometheus::PrometheusHandle;
    use std::sync::atomic::AtomicBool;
    use std::sync::{Arc, OnceLock, RwLock};
    use std::time::Duration;
    use tower::ServiceExt;

    fn metrics_handle() -> Arc<PrometheusHandle> {
        static HANDLE: OnceLock<Arc<PrometheusHandle>> = OnceLock::new();
        HANDLE
            .get_or_init(|| {
                let (_, handle) = PrometheusMetricLayer::pair();
                Arc::new(handle)
            })
            .clone()
    }

    fn test_state(dir: &tempfile::TempDir) -> AppState {
        let store = ContentStore::new(dir.path().join("content.json"));
        let content = Arc::new(RwLock::new(store.load().expect("bootstraps")));
        let tickets = Arc::new(SharedTicketStore::new(content.clone(), store));
        let pipeline = Arc::new(
            ContactPipeline::new(
                tickets,
                Arc::new(RecordingMailer::new()),
                None,
                MailConfig {
                    default_from: "noreply@ethicic.com".into(),
                    firm_inbox: "hello@ethicic.com".into(),
                },
                3,
                Duration::from_secs(3600),
            )
            .expect("pipeline builds"),
        );
        AppState {
            readiness: Arc::new(AtomicBool::new(true)),
            metrics: metrics_handle(),
            content,
            pipeline,
            templates: Arc::new(render::environment().expect("templates compile")),
            media_root: dir.path().join("media"),
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        String::from_utf8(bytes.to_vec()).expect("utf8")
    }

    #[tokio::test]
    async fn home_page_renders_the_hero() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = router(test_state(&dir));
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Ethics Reveal Quality"));
        assert!(body.contains("57%"));
    }

    #[tokio::test]
    async fn health_reports_service_metadata() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = router(test_state(&dir));
        let response = app
            .oneshot(Request::get("/health/").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value =
            serde_json::from_str(&body_text(response).await).expect("json");
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "ethicic-web");
        assert!(body["timestamp"].as_str().is_some());
    }

    #[tokio::test]
    async fn unknown_paths_are_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = router(test_state(&dir));
        let response = app
            .oneshot(
                Request::get("/no-such-page/")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    fn seed_posts(state: &AppState, count: u32) {
        let mut content = state.content.write().expect("content lock");
        let blog = content
            .tree
            .find_first(PageKind::BlogIndex)
            .expect("blog index")
            .id;
        for n in 0..count {
            let id = content
                .tree
                .add_child(
                    blog,
                    &format!("Post {n:02}"),
                    PageBody::BlogPost(BlogPostFields {
                        excerpt: "An excerpt.".into(),
                        author: "Sloane Ortel".into(),
                        publish_date: NaiveDate::from_ymd_opt(2024, 1, n + 1),
                        ..Default::default()
                    }),
                )
                .expect("adds post");
            content.tree.publish(id).expect("publishes post");
        }
    }

    #[tokio::test]
    async fn blog_index_paginates_and_serves_htmx_fragments() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(&dir);
        seed_posts(&state, 13);

        let app = router(state.clone());
        let response = app
            .clone()
            .oneshot(Request::get("/blog/").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("<html"));
        assert!(body.contains("Load more"));

        let response = app
            .oneshot(
                Request::get("/blog/?page=2")
                    .header("HX-Request", "true")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let fragment = body_text(response).await;
        assert!(!fragment.contains("<html"));
        assert!(fragment.contains("article-list"));
        // 13 posts at 12 per page leave one on page 2, with no further page.
        assert!(!fragment.contains("Load more"));
    }

    #[tokio::test]
    async fn blog_tag_listing_filters_posts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(&dir);
        {
            let mut content = state.content.write().expect("content lock");
            let blog = content
                .tree
                .find_first(PageKind::BlogIndex)
                .expect("blog index")
                .id;
            for (title, tags) in [("Tagged", vec!["esg".to_string()]), ("Plain", Vec::new())] {
                let id = content
                    .tree
                    .add_child(
                        blog,
                        title,
                        PageBody::BlogPost(BlogPostFields {
                            tags,
                            ..Default::default()
                        }),
                    )
                    .expect("adds post");
                content.tree.publish(id).expect("publishes post");
            }
        }

        let app = router(state);
        let response = app
            .oneshot(
                Request::get("/blog/tag/esg/")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Tagged"));
        assert!(!body.contains("Plain"));
    }

    fn seed_contact_page(state: &AppState) {
        let mut content = state.content.write().expect("content lock");
        let root = content.tree.root().expect("root");
        let id = content
            .tree
            .add_child(root, "Contact", PageBody::Contact(ContactFields::default()))
            .expect("adds contact");
        content.tree.publish(id).expect("publishes contact");
    }

    #[tokio::test]
    async fn contact_submission_redirects_on_success() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(&dir);
        seed_contact_page(&state);

        let app = router(state);
        let response = app
            .oneshot(
                Request::post("/contact/")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from(
                        "name=Pat&email=pat%40example.com&subject=Fees&message=How+do+your+fees+work%3F",
                    ))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .expect("location");
        assert!(location.contains("submitted=1"));
    }

    #[tokio::test]
    async fn invalid_contact_submission_rerenders_with_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(&dir);
        seed_contact_page(&state);

        let app = router(state);
        let response = app
            .oneshot(
                Request::post("/contact/")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("name=&email=bad&subject=&message=short"))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_text(response).await;
        assert!(body.contains("form-errors"));
    }

    #[tokio::test]
    async fn media_serves_files_and_rejects_traversal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(&dir);
        std::fs::create_dir_all(state.media_root.clone()).expect("media dir");
        std::fs::write(state.media_root.join("logo.svg"), "<svg></svg>").expect("writes");

        let app = router(state);
        let response = app
            .clone()
            .oneshot(
                Request::get("/media/logo.svg")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .expect("content type");
        assert_eq!(content_type, "image/svg+xml");

        let response = app
            .oneshot(
                Request::get("/media/../content.json")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
