use axum::{
	Json, Router,
	body::Body,
	extract::{Query, State},
	http::{HeaderMap, HeaderValue, StatusCode, header},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;
use rolo_service::{
	ContactImportRow, DeleteAccountRequest, DeleteAccountResponse, Error as ServiceError,
	ImportContactsRequest, ImportContactsResponse, ListConnectionsRequest, ListConnectionsResponse,
	ListContactsRequest, ListContactsResponse, Purpose, RequestConnectionRequest,
	RequestConnectionResponse, RespondAction, RespondConnectionRequest, RespondConnectionResponse,
	ScopeMode, SearchRequest, SearchResponse, SetSharingRequest, SetSharingResponse,
	SummarizeContact, SummarizeRequest, UpsertAccountRequest, UpsertAccountResponse,
};

/// Trusted identity header. There is no session layer; callers assert who they
/// are and the deployment is expected to sit behind something that makes that
/// assertion safe.
const ACCOUNT_HEADER: &str = "x-rolo-account-id";

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/accounts", post(upsert_account).delete(delete_account))
		.route("/v1/contacts/import", post(import_contacts))
		.route("/v1/contacts", get(list_contacts))
		.route("/v1/connections", post(request_connection).get(list_connections))
		.route("/v1/connections/respond", post(respond_connection))
		.route("/v1/connections/sharing", post(set_sharing))
		.route("/v1/searches", post(search))
		.route("/v1/searches/summary", post(summarize))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

fn account_id(headers: &HeaderMap) -> Result<Uuid, ApiError> {
	let value = headers.get(ACCOUNT_HEADER).and_then(|value| value.to_str().ok()).ok_or_else(
		|| {
			json_error(
				StatusCode::UNAUTHORIZED,
				"UNAUTHENTICATED",
				"Missing X-Rolo-Account-Id header.",
			)
		},
	)?;

	Uuid::parse_str(value).map_err(|_| {
		json_error(StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", "X-Rolo-Account-Id must be a UUID.")
	})
}

#[derive(Debug, Deserialize)]
struct UpsertAccountPayload {
	display_name: String,
	email: Option<String>,
}

async fn upsert_account(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<UpsertAccountPayload>,
) -> Result<Json<UpsertAccountResponse>, ApiError> {
	let account_id = account_id(&headers)?;
	let response = state
		.service
		.upsert_account(UpsertAccountRequest {
			account_id,
			display_name: payload.display_name,
			email: payload.email,
		})
		.await?;

	Ok(Json(response))
}

async fn delete_account(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<DeleteAccountResponse>, ApiError> {
	let account_id = account_id(&headers)?;
	let response = state.service.delete_account(DeleteAccountRequest { account_id }).await?;

	Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct ImportContactsPayload {
	contacts: Vec<ContactImportRow>,
}

async fn import_contacts(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<ImportContactsPayload>,
) -> Result<Json<ImportContactsResponse>, ApiError> {
	let account_id = account_id(&headers)?;
	let response = state
		.service
		.import_contacts(ImportContactsRequest { account_id, contacts: payload.contacts })
		.await?;

	Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct ListContactsParams {
	company: Option<String>,
	position: Option<String>,
	limit: Option<i64>,
	offset: Option<i64>,
}

async fn list_contacts(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(params): Query<ListContactsParams>,
) -> Result<Json<ListContactsResponse>, ApiError> {
	let account_id = account_id(&headers)?;
	let response = state
		.service
		.list_contacts(ListContactsRequest {
			account_id,
			company: params.company,
			position: params.position,
			limit: params.limit,
			offset: params.offset,
		})
		.await?;

	Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct RequestConnectionPayload {
	recipient_id: Uuid,
}

async fn request_connection(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<RequestConnectionPayload>,
) -> Result<Json<RequestConnectionResponse>, ApiError> {
	let account_id = account_id(&headers)?;
	let response = state
		.service
		.request_connection(RequestConnectionRequest {
			account_id,
			recipient_id: payload.recipient_id,
		})
		.await?;

	Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct RespondConnectionPayload {
	connection_id: Uuid,
	action: RespondAction,
}

async fn respond_connection(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<RespondConnectionPayload>,
) -> Result<Json<RespondConnectionResponse>, ApiError> {
	let account_id = account_id(&headers)?;
	let response = state
		.service
		.respond_connection(RespondConnectionRequest {
			account_id,
			connection_id: payload.connection_id,
			action: payload.action,
		})
		.await?;

	Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct SetSharingPayload {
	connection_id: Uuid,
	share: bool,
}

async fn set_sharing(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<SetSharingPayload>,
) -> Result<Json<SetSharingResponse>, ApiError> {
	let account_id = account_id(&headers)?;
	let response = state
		.service
		.set_sharing(SetSharingRequest {
			account_id,
			connection_id: payload.connection_id,
			share: payload.share,
		})
		.await?;

	Ok(Json(response))
}

async fn list_connections(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<ListConnectionsResponse>, ApiError> {
	let account_id = account_id(&headers)?;
	let response = state.service.list_connections(ListConnectionsRequest { account_id }).await?;

	Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct SearchPayload {
	query: String,
	#[serde(default)]
	purpose: Purpose,
	#[serde(default)]
	scope: ScopeMode,
}

async fn search(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<SearchPayload>,
) -> Result<Json<SearchResponse>, ApiError> {
	let account_id = account_id(&headers)?;
	let response = state
		.service
		.search(SearchRequest {
			account_id,
			query: payload.query,
			purpose: payload.purpose,
			scope: payload.scope,
		})
		.await?;

	Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct SummarizePayload {
	query: String,
	contacts: Vec<SummarizeContact>,
}

async fn summarize(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<SummarizePayload>,
) -> Result<Response, ApiError> {
	let account_id = account_id(&headers)?;
	let stream = state
		.service
		.summarize_results(SummarizeRequest {
			account_id,
			query: payload.query,
			contacts: payload.contacts,
		})
		.await?;
	let response = (
		[(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
		Body::from_stream(stream),
	)
		.into_response();

	Ok(response)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Vec<String>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Vec<String>,
	retry_after_secs: Option<u64>,
}

fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError {
		status,
		error_code: code.to_string(),
		message: message.into(),
		fields: Vec::new(),
		retry_after_secs: None,
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let message = err.to_string();

		match err {
			ServiceError::InvalidRequest { .. } =>
				json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message),
			ServiceError::NotFound { .. } =>
				json_error(StatusCode::NOT_FOUND, "NOT_FOUND", message),
			ServiceError::Conflict { .. } =>
				json_error(StatusCode::CONFLICT, "CONFLICT", message),
			ServiceError::RateLimited { retry_after_secs } => {
				let mut api =
					json_error(StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", message);

				api.retry_after_secs = Some(retry_after_secs);

				api
			},
			ServiceError::Provider { .. }
			| ServiceError::Storage { .. }
			| ServiceError::Qdrant { .. } => {
				tracing::error!(error = %message, "Request failed.");

				json_error(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "Internal error.")
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody {
			error_code: self.error_code,
			message: self.message,
			fields: self.fields,
		};
		let mut response = (self.status, Json(body)).into_response();

		if let Some(secs) = self.retry_after_secs
			&& let Ok(value) = HeaderValue::from_str(&secs.to_string())
		{
			response.headers_mut().insert(header::RETRY_AFTER, value);
		}

		response
	}
}
