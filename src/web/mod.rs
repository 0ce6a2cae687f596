use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    response::Redirect,
    routing::{get, get_service, post},
    Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

pub mod middleware;
pub mod routes;
pub mod state;

use self::middleware::visitor::identify_visitor;
use routes::{admin, register, tickets};
use state::AppState;

/// Screenshots are phone captures; leave room above axum's 2 MB default.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let registration_routes = Router::new()
        .route("/register", get(register::register_page))
        .route("/register/details", post(register::submit_details_handler))
        .route("/register/back", post(register::back_handler))
        .route("/register/pay", post(register::pay_handler))
        .route("/register/paid", post(register::paid_handler))
        .route(
            "/register/proof",
            post(register::submit_proof_handler).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/register/start-over", post(register::start_over_handler))
        .route("/tickets", get(tickets::my_tickets_handler))
        .layer(from_fn(identify_visitor));

    let admin_routes = Router::new()
        .route("/admin", get(admin::admin_page))
        .route("/admin/refresh", post(admin::refresh_handler))
        .route("/admin/registrations", get(admin::registrations_handler))
        .route(
            "/admin/registrations/:ticket_id/verify",
            post(admin::verify_handler),
        )
        .route("/admin/export", get(admin::export_handler));

    Router::new()
        .route("/", get(|| async { Redirect::to("/register") }))
        .merge(registration_routes)
        .merge(admin_routes)
        .nest_service("/assets", get_service(ServeDir::new("assets")))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CatchPanicLayer::new())
        .with_state(state)
}
