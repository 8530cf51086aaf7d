use crate::domain::payment::{CreatePaymentRequest, PaymentRecord, PaymentStatus};
use crate::provider::ecpay::{self, CallbackOutcome};
use crate::AppState;
use axum::extract::{Path, RawForm, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::Json;
use serde_json::json;
use std::collections::BTreeMap;
use uuid::Uuid;

pub async fn create_payment(
    State(state): State<AppState>,
    Json(req): Json<CreatePaymentRequest>,
) -> impl IntoResponse {
    if req.total <= 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "total must be positive" })),
        )
            .into_response();
    }

    let id = Uuid::new_v4();
    let record = PaymentRecord {
        id,
        variant: ecpay::VARIANT.to_string(),
        currency: req.currency,
        total: req.total,
        description: req.description,
        status: PaymentStatus::Waiting,
        message: None,
        transaction_id: None,
        process_url: format!("{}/payments/{}/process", state.public_base_url, id),
        success_url: format!("{}/payments/{}/success", state.public_base_url, id),
        failure_url: format!("{}/payments/{}/failure", state.public_base_url, id),
    };

    match state.payments_repo.insert(record.clone()) {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({
                "payment_id": id,
                "status": record.status,
                "checkout_path": format!("/payments/{id}/checkout"),
            })),
        )
            .into_response(),
        Err(err) => storage_error(err),
    }
}

pub async fn get_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.payments_repo.get(payment_id) {
        Ok(Some(record)) => (StatusCode::OK, Json(record.view())).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => storage_error(err),
    }
}

/// Auto-submitting redirect form toward the gateway checkout endpoint.
pub async fn checkout(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> impl IntoResponse {
    let record = match state.payments_repo.get(payment_id) {
        Ok(Some(record)) => record,
        Ok(None) => return StatusCode::NOT_FOUND.into_response(),
        Err(err) => return storage_error(err),
    };

    let fields = state.provider.get_hidden_fields(&record);
    let inputs: String = fields
        .iter()
        .map(|(k, v)| {
            format!(
                "<input type=\"hidden\" name=\"{}\" value=\"{}\">",
                html_escape(k),
                html_escape(v)
            )
        })
        .collect();
    let page = format!(
        "<!DOCTYPE html><html><body onload=\"document.forms[0].submit()\">\
         <form method=\"post\" action=\"{}\">{}</form></body></html>",
        html_escape(&state.checkout_url),
        inputs
    );
    Html(page).into_response()
}

/// Gateway callback endpoint. The body is parsed by hand so a malformed
/// form fails closed as 403 instead of a framework rejection.
pub async fn process_callback(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
    RawForm(body): RawForm,
) -> impl IntoResponse {
    let fields: BTreeMap<String, String> = match serde_urlencoded::from_bytes(&body) {
        Ok(fields) => fields,
        Err(err) => {
            tracing::warn!(%payment_id, %err, "unparseable callback body");
            return forbidden();
        }
    };

    let outcome = state
        .payments_repo
        .with_payment_mut(payment_id, |record| {
            state.provider.process_data(record, &fields)
        });

    match outcome {
        Ok(Some(CallbackOutcome::Accepted)) => (StatusCode::OK, "1|OK").into_response(),
        Ok(Some(CallbackOutcome::Rejected)) => forbidden(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => storage_error(err),
    }
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

fn forbidden() -> axum::response::Response {
    (StatusCode::FORBIDDEN, "0|CheckMacValue verify fail").into_response()
}

fn storage_error(err: anyhow::Error) -> axum::response::Response {
    tracing::error!(%err, "payments store failure");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "storage failure" })),
    )
        .into_response()
}

fn html_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
