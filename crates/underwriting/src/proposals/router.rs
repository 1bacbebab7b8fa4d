use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::directory::{
    DirectoryError, PageRequest, ProposalDirectory, DEFAULT_PAGE, DEFAULT_PAGE_SIZE,
};
use super::domain::{Proposal, ProposalDraft, ProposalId, ProposalStatus};
use crate::error::json_error;
use crate::store::{RecordStore, StoreError};

/// Query string accepted by the listing endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Body accepted by the status endpoint.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: ProposalStatus,
}

/// Router builder exposing the proposal endpoints.
pub fn proposal_router<S>(directory: Arc<ProposalDirectory<S>>) -> Router
where
    S: RecordStore<Proposal> + 'static,
{
    Router::new()
        .route(
            "/proposals",
            get(list_handler::<S>).post(create_handler::<S>),
        )
        .route("/proposals/:proposal_id", get(fetch_handler::<S>))
        .route(
            "/proposals/:proposal_id/status",
            put(update_status_handler::<S>),
        )
        .with_state(directory)
}

pub(crate) async fn create_handler<S>(
    State(directory): State<Arc<ProposalDirectory<S>>>,
    payload: Result<Json<ProposalDraft>, JsonRejection>,
) -> Response
where
    S: RecordStore<Proposal> + 'static,
{
    let Json(draft) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_error(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match directory.create(draft).await {
        Ok(proposal) => {
            let location = format!("/proposals/{}", proposal.id);
            (
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(proposal),
            )
                .into_response()
        }
        Err(err) => directory_error_response(err),
    }
}

pub(crate) async fn fetch_handler<S>(
    State(directory): State<Arc<ProposalDirectory<S>>>,
    Path(proposal_id): Path<String>,
) -> Response
where
    S: RecordStore<Proposal> + 'static,
{
    let Ok(id) = proposal_id.parse::<ProposalId>() else {
        return not_found(&proposal_id);
    };

    match directory.get_by_id(&id).await {
        Ok(Some(proposal)) => (StatusCode::OK, Json(proposal)).into_response(),
        Ok(None) => not_found(&proposal_id),
        Err(err) => directory_error_response(err),
    }
}

pub(crate) async fn list_handler<S>(
    State(directory): State<Arc<ProposalDirectory<S>>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Response
where
    S: RecordStore<Proposal> + 'static,
{
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return json_error(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let request = match PageRequest::new(
        params.page.unwrap_or(DEFAULT_PAGE),
        params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
    ) {
        Ok(request) => request,
        Err(err) => return directory_error_response(err),
    };

    match directory.list_paged(request).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(err) => directory_error_response(err),
    }
}

pub(crate) async fn update_status_handler<S>(
    State(directory): State<Arc<ProposalDirectory<S>>>,
    Path(proposal_id): Path<String>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> Response
where
    S: RecordStore<Proposal> + 'static,
{
    let Ok(id) = proposal_id.parse::<ProposalId>() else {
        return not_found(&proposal_id);
    };
    let Json(update) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_error(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match directory.update_status(&id, update.status).await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({ "id": id, "status": update.status })),
        )
            .into_response(),
        Ok(false) => not_found(&proposal_id),
        Err(err) => directory_error_response(err),
    }
}

fn not_found(proposal_id: &str) -> Response {
    json_error(
        StatusCode::NOT_FOUND,
        format!("proposal {proposal_id} not found"),
    )
}

fn directory_error_response(err: DirectoryError) -> Response {
    let status = match &err {
        DirectoryError::InvalidPage { .. } | DirectoryError::InvalidPageSize { .. } => {
            StatusCode::BAD_REQUEST
        }
        DirectoryError::Store(StoreError::Conflict { .. }) => StatusCode::CONFLICT,
        DirectoryError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
        DirectoryError::Store(_) => {
            error!(error = %err, "proposal store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    json_error(status, err.to_string())
}
