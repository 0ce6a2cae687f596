use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    Extension,
};

use crate::error::AppError;
use crate::models::Registration;
use crate::services::ticket_cache_service::TicketCache;
use crate::web::middleware::visitor::Visitor;
use crate::web::state::AppState;

#[derive(Template)]
#[template(path = "tickets.html")]
pub struct TicketsTemplate {
    pub tickets: Vec<Registration>,
    pub build_id: &'static str,
}

pub async fn my_tickets_handler(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
) -> Result<Response, AppError> {
    let tickets = state.ticket_cache(&visitor).read_all().await?;
    let template = TicketsTemplate {
        tickets,
        build_id: crate::BUILD_ID,
    };
    Ok(Html(template.render()?).into_response())
}
