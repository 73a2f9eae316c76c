//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::ServerConfig;
#[cfg(feature = "metrics")]
pub(crate) use metrics::make_metrics;

#[cfg(feature = "metrics")]
use metrics::MetricsLayer;
use state_builders::build_http_state;

use std::future::Future;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, rt, web};
use tracing::{info, warn};

use polls_backend::Trace;
#[cfg(debug_assertions)]
use polls_backend::doc::ApiDoc;
use polls_backend::inbound::http::comments::{delete_comment, send_comment};
use polls_backend::inbound::http::health::{HealthState, live, ready};
use polls_backend::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(send_comment)
        .service(delete_comment)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Fail liveness once `shutdown` resolves, while in-flight requests drain.
async fn fail_liveness_after<F>(shutdown: F, health_state: web::Data<HealthState>)
where
    F: Future<Output = std::io::Result<()>>,
{
    match shutdown.await {
        Ok(()) => {
            health_state.mark_unhealthy();
            info!("shutdown requested, liveness now failing");
        }
        Err(err) => warn!(error = %err, "shutdown signal listener failed"),
    }
}

/// Construct the Actix HTTP server.
///
/// Readiness is flagged once the listener is bound, and liveness fails as
/// soon as Ctrl-C starts the graceful shutdown. Must be called from within
/// the Actix runtime.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(&config);
    let server_health_state = health_state.clone();
    let bind_addr = config.bind_addr();
    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from_option(config.prometheus);

    let server = HttpServer::new(move || {
        let app = build_app(server_health_state.clone(), http_state.clone());

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "http server listening");
    health_state.mark_ready();
    rt::spawn(fail_liveness_after(rt::signal::ctrl_c(), health_state));
    Ok(server)
}
