use askama::Template;
use axum::{
    extract::{Multipart, State},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::registrations::{GROUP_PRICE, GROUP_PRICE_PER_PERSON, SINGLE_PRICE};
use crate::models::{Registration, RegistrationType};
use crate::services::payment_uri_service;
use crate::services::registration_workflow::{
    RegistrationDraft, RegistrationWorkflow, Screenshot, Stage, SubmissionServices, WorkflowError,
};
use crate::services::session_service::{self, SessionContext, SqliteSession};
use crate::web::middleware::visitor::Visitor;
use crate::web::state::AppState;

const WORKFLOW_KEY: &str = "registration_workflow";
const SCREENSHOT_FIELD: &str = "screenshot";
const GENERIC_FAILURE: &str = "Registration failed. Please try again.";
const IN_FLIGHT: &str = "Your registration is already being processed. Please wait.";

pub struct PaymentView {
    pub ticket_id: String,
    pub amount: u32,
    pub pass_label: &'static str,
    pub uri: String,
    pub qr_svg: Option<String>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub step: u8,
    pub draft: RegistrationDraft,
    pub is_group: bool,
    pub notice: Option<String>,
    pub payment: Option<PaymentView>,
    pub screenshot_name: Option<String>,
    pub confirmation: Option<Registration>,
    pub single_price: u32,
    pub group_price: u32,
    pub group_price_per_person: u32,
    pub build_id: &'static str,
}

async fn load_workflow(session: &dyn SessionContext) -> Result<RegistrationWorkflow, AppError> {
    match session_service::load_json::<RegistrationWorkflow, _>(session, WORKFLOW_KEY).await {
        Ok(found) => Ok(found.unwrap_or_default()),
        Err(session_service::SessionError::Corrupt { key, source }) => {
            warn!("Discarding unreadable {}: {}", key, source);
            Ok(RegistrationWorkflow::new())
        }
        Err(e) => Err(e.into()),
    }
}

async fn save_workflow(
    session: &dyn SessionContext,
    workflow: &RegistrationWorkflow,
) -> Result<(), AppError> {
    session_service::store_json(session, WORKFLOW_KEY, workflow).await?;
    Ok(())
}

async fn render_workflow(
    workflow: &RegistrationWorkflow,
    session: &dyn SessionContext,
    notice: Option<String>,
) -> Result<Response, AppError> {
    let payment = match workflow.stage() {
        Stage::Payment => {
            let request = workflow.payment_request(session).await?;
            let qr_svg = payment_uri_service::render_qr_svg(&request.uri)
                .map_err(|e| warn!("QR code generation failed for {}: {}", request.ticket_id, e))
                .ok();
            Some(PaymentView {
                pass_label: request.registration_type.pass_label(),
                ticket_id: request.ticket_id,
                amount: request.amount,
                uri: request.uri,
                qr_svg,
            })
        }
        _ => None,
    };

    let screenshot_name = match workflow.stage() {
        Stage::ProofUpload {
            screenshot: Some(s),
        } => Some(s.file_name.clone()),
        _ => None,
    };

    let confirmation = match workflow.stage() {
        Stage::Confirmation { registration } => Some(registration.clone()),
        _ => None,
    };

    let template = RegisterTemplate {
        step: workflow.stage().number(),
        draft: workflow.draft().clone(),
        is_group: workflow.draft().registration_type == RegistrationType::Group,
        notice,
        payment,
        screenshot_name,
        confirmation,
        single_price: SINGLE_PRICE,
        group_price: GROUP_PRICE,
        group_price_per_person: GROUP_PRICE_PER_PERSON,
        build_id: crate::BUILD_ID,
    };
    Ok(Html(template.render()?).into_response())
}

fn back_to_form() -> Response {
    Redirect::to("/register").into_response()
}

pub async fn register_page(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
) -> Result<Response, AppError> {
    let session = state.session(&visitor);
    let workflow = load_workflow(&session).await?;
    render_workflow(&workflow, &session, None).await
}

/// Copies posted form fields into the draft. Member fields are named
/// `member_<slot>_<field>`; unknown fields are ignored.
pub fn apply_details_form(draft: &mut RegistrationDraft, pairs: &[(String, String)]) {
    for (key, value) in pairs {
        match key.as_str() {
            "name" => draft.name = value.clone(),
            "email" => draft.email = value.clone(),
            "phone" => draft.phone = value.clone(),
            "date_of_birth" => draft.date_of_birth = value.clone(),
            "parent_husband_mobile" => draft.parent_husband_mobile = value.clone(),
            "registration_type" => {
                if let Some(kind) = RegistrationType::parse(value) {
                    draft.registration_type = kind;
                }
            }
            other => {
                let Some(rest) = other.strip_prefix("member_") else {
                    continue;
                };
                let Some((slot, field)) = rest.split_once('_') else {
                    continue;
                };
                let Some(member) = slot
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| draft.group_members.get_mut(i))
                else {
                    continue;
                };
                match field {
                    "name" => member.name = value.clone(),
                    "email" => member.email = value.clone(),
                    "phone" => member.phone = value.clone(),
                    "date_of_birth" => member.date_of_birth = value.clone(),
                    _ => {}
                }
            }
        }
    }
}

pub async fn submit_details_handler(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let session = state.session(&visitor);
    let mut workflow = load_workflow(&session).await?;

    match workflow.edit_details() {
        Ok(draft) => apply_details_form(draft, &pairs),
        Err(e) => {
            warn!("Ignoring details post: {}", e);
            return Ok(back_to_form());
        }
    }

    match workflow.submit_details(&session).await {
        Ok(_) => {
            save_workflow(&session, &workflow).await?;
            Ok(back_to_form())
        }
        Err(e @ WorkflowError::Validation(_)) => {
            render_workflow(&workflow, &session, Some(e.to_string())).await
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn back_handler(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
) -> Result<Response, AppError> {
    step_and_save(&state, &visitor, "back", RegistrationWorkflow::back).await
}

pub async fn paid_handler(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
) -> Result<Response, AppError> {
    step_and_save(&state, &visitor, "paid", RegistrationWorkflow::mark_paid).await
}

pub async fn start_over_handler(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
) -> Result<Response, AppError> {
    step_and_save(&state, &visitor, "start over", RegistrationWorkflow::start_over).await
}

async fn step_and_save(
    state: &AppState,
    visitor: &Visitor,
    label: &str,
    step: fn(&mut RegistrationWorkflow) -> Result<(), WorkflowError>,
) -> Result<Response, AppError> {
    let session = state.session(visitor);
    let mut workflow = load_workflow(&session).await?;
    match step(&mut workflow) {
        Ok(()) => save_workflow(&session, &workflow).await?,
        Err(e) => warn!("Ignoring {} request: {}", label, e),
    }
    Ok(back_to_form())
}

/// Hands the browser to the UPI app. Whatever happens there is not reported
/// back.
pub async fn pay_handler(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
) -> Result<Response, AppError> {
    let session = state.session(&visitor);
    let workflow = load_workflow(&session).await?;
    match workflow.pay_now(&session).await {
        Ok(uri) => Ok(Redirect::to(&uri).into_response()),
        Err(e @ WorkflowError::IllegalTransition { .. }) => {
            warn!("Ignoring pay request: {}", e);
            Ok(back_to_form())
        }
        Err(e) => Err(e.into()),
    }
}

async fn read_screenshot(multipart: &mut Multipart) -> Result<Option<Screenshot>, AppError> {
    let mut screenshot = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::MalformedPayload(e.to_string()))?
    {
        if field.name() != Some(SCREENSHOT_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("screenshot").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::MalformedPayload(e.to_string()))?;
        if bytes.is_empty() {
            continue;
        }
        screenshot = Some(Screenshot {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Ok(screenshot)
}

pub async fn submit_proof_handler(
    State(state): State<AppState>,
    Extension(visitor): Extension<Visitor>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let session = state.session(&visitor);

    if !session.begin_proof_submission().await? {
        warn!("Proof submission already running for this session");
        let workflow = load_workflow(&session).await?;
        return render_workflow(&workflow, &session, Some(IN_FLIGHT.to_string())).await;
    }

    let outcome = submit_proof(&state, &visitor, &session, &mut multipart).await;
    if let Err(e) = session.end_proof_submission().await {
        warn!("Could not release proof submission marker: {}", e);
    }
    outcome
}

/// Runs with the session's submission marker held; the workflow is loaded
/// only after the marker so a finished submission is seen as Confirmation.
async fn submit_proof(
    state: &AppState,
    visitor: &Visitor,
    session: &SqliteSession,
    multipart: &mut Multipart,
) -> Result<Response, AppError> {
    let cache = state.ticket_cache(visitor);
    let mut workflow = load_workflow(session).await?;

    if !matches!(workflow.stage(), Stage::ProofUpload { .. }) {
        warn!("Ignoring proof upload at the {} step", workflow.stage().name());
        return Ok(back_to_form());
    }

    if let Some(file) = read_screenshot(multipart).await? {
        if let Err(e) = workflow.attach_screenshot(file) {
            return render_workflow(&workflow, session, Some(e.to_string())).await;
        }
        save_workflow(session, &workflow).await?;
    }

    let services = SubmissionServices {
        records: state.records.as_ref(),
        blobs: state.blobs.as_ref(),
        cache: &cache,
        session,
    };
    match workflow.submit_proof(&services).await {
        Ok(registration) => {
            info!("Ticket {} confirmed for this visitor", registration.ticket_id);
            save_workflow(session, &workflow).await?;
            Ok(back_to_form())
        }
        Err(e) if e.is_user_facing() => {
            render_workflow(&workflow, session, Some(e.to_string())).await
        }
        Err(e) => {
            warn!("Submission failed, user stays at upload: {}", e);
            render_workflow(&workflow, session, Some(GENERIC_FAILURE.to_string())).await
        }
    }
}
