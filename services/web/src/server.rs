use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use axum_prometheus::PrometheusMetricLayer;
use ethicic_site::config::AppConfig;
use ethicic_site::contact::{ContactPipeline, LogMailer};
use ethicic_site::content::ContentStore;
use ethicic_site::{telemetry, SiteError};
use tracing::info;

use crate::cli::ServeArgs;
use crate::infra::{AppState, SharedTicketStore};
use crate::{render, routes};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), SiteError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));

    let store = ContentStore::new(config.content.db_path.clone());
    let content = Arc::new(RwLock::new(store.load()?));
    let tickets = Arc::new(SharedTicketStore::new(content.clone(), store));
    let pipeline = Arc::new(ContactPipeline::new(
        tickets,
        Arc::new(LogMailer),
        None,
        config.mail.clone(),
        config.rate_limit.max_submissions,
        Duration::from_secs(config.rate_limit.window_secs),
    )?);

    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        content,
        pipeline,
        templates: Arc::new(render::environment()?),
        media_root: config.content.media_root.clone(),
    };

    let app = routes::router(state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "public site ready");

    axum::serve(listener, app).await?;
    Ok(())
}
