use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::applications::{ApplicationDraft, ApplicationStatus};
use super::catalog::{ServiceDraft, ServiceRepository};
use super::domain::{AdminId, ApplicationId, JobPostId, ProviderId, RequesterId, ServiceId};
use super::eligibility::{DocumentKind, DocumentUpload, ProviderDirectory, ReviewDecision};
use super::error::{MarketplaceError, RepositoryError};
use super::jobs::{JobPostDraft, JobPostRepository, JobPostStatus, ScheduleKind};
use super::matching::{AppliedFilter, JobSearch, PostOrder};
use super::Marketplace;

pub const REQUESTER_HEADER: &str = "x-requester-id";
pub const PROVIDER_HEADER: &str = "x-provider-id";
pub const ADMIN_HEADER: &str = "x-admin-id";

type Shared<J, S, D> = Arc<Marketplace<J, S, D>>;

/// Router exposing the marketplace boundary operations.
///
/// The acting identity travels in `x-requester-id`, `x-provider-id`, or `x-admin-id`. Headers
/// are trusted as set by the authenticating gateway in front of this router; in particular
/// `x-admin-id` must only ever be forwarded for back-office sessions.
pub fn marketplace_router<J, S, D>(market: Shared<J, S, D>) -> Router
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/jobs",
            get(open_posts_handler::<J, S, D>).post(create_post_handler::<J, S, D>),
        )
        .route(
            "/api/v1/jobs/:job_id",
            put(update_post_handler::<J, S, D>).delete(delete_post_handler::<J, S, D>),
        )
        .route(
            "/api/v1/jobs/:job_id/status",
            patch(set_post_status_handler::<J, S, D>),
        )
        .route(
            "/api/v1/jobs/:job_id/applications",
            get(applicants_handler::<J, S, D>).post(apply_handler::<J, S, D>),
        )
        .route(
            "/api/v1/jobs/:job_id/applications/:application_id",
            patch(set_application_status_handler::<J, S, D>),
        )
        .route("/api/v1/requester/jobs", get(my_posts_handler::<J, S, D>))
        .route(
            "/api/v1/provider/applications",
            get(my_applications_handler::<J, S, D>),
        )
        .route(
            "/api/v1/provider/documents",
            post(submit_documents_handler::<J, S, D>),
        )
        .route(
            "/api/v1/provider/services",
            get(my_services_handler::<J, S, D>),
        )
        .route(
            "/api/v1/providers/:provider_id/verification",
            get(verification_handler::<J, S, D>),
        )
        .route(
            "/api/v1/providers/:provider_id/account",
            get(account_handler::<J, S, D>),
        )
        .route(
            "/api/v1/providers/:provider_id/eligibility",
            get(eligibility_handler::<J, S, D>),
        )
        .route(
            "/api/v1/admin/providers/:provider_id/review",
            post(review_handler::<J, S, D>),
        )
        .route(
            "/api/v1/admin/providers/:provider_id/account",
            patch(set_account_handler::<J, S, D>),
        )
        .route(
            "/api/v1/services",
            get(available_services_handler::<J, S, D>).post(create_service_handler::<J, S, D>),
        )
        .route(
            "/api/v1/services/:service_id",
            get(get_service_handler::<J, S, D>)
                .put(update_service_handler::<J, S, D>)
                .delete(delete_service_handler::<J, S, D>),
        )
        .route(
            "/api/v1/services/:service_id/availability",
            patch(service_availability_handler::<J, S, D>),
        )
        .with_state(market)
}

pub(crate) fn error_response(error: MarketplaceError) -> Response {
    let status = match &error {
        MarketplaceError::NotEligible { .. } | MarketplaceError::Unauthorized(_) => {
            StatusCode::FORBIDDEN
        }
        MarketplaceError::NotFound(_) | MarketplaceError::Repository(RepositoryError::NotFound) => {
            StatusCode::NOT_FOUND
        }
        MarketplaceError::JobClosed { .. }
        | MarketplaceError::DuplicateApplication
        | MarketplaceError::InvalidState(_)
        | MarketplaceError::AlreadyHired
        | MarketplaceError::Repository(RepositoryError::Conflict)
        | MarketplaceError::Repository(RepositoryError::VersionConflict { .. }) => {
            StatusCode::CONFLICT
        }
        MarketplaceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        MarketplaceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    let mut payload = json!({
        "error": error.to_string(),
        "code": error.code(),
    });
    if let MarketplaceError::NotEligible {
        status: display,
        reason,
    } = &error
    {
        payload["eligibility"] = json!({
            "status": display,
            "reason": reason,
            "guidance": display.guidance(),
        });
    }

    (status, Json(payload)).into_response()
}

fn respond<T: Serialize>(status: StatusCode, result: Result<T, MarketplaceError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

fn actor(headers: &HeaderMap, name: &'static str) -> Result<String, Response> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            let payload = json!({
                "error": format!("missing {name} header"),
                "code": "unauthenticated",
            });
            (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
        })
}

fn requester_from(headers: &HeaderMap) -> Result<RequesterId, Response> {
    actor(headers, REQUESTER_HEADER).map(RequesterId)
}

fn provider_from(headers: &HeaderMap) -> Result<ProviderId, Response> {
    actor(headers, PROVIDER_HEADER).map(ProviderId)
}

fn admin_from(headers: &HeaderMap) -> Result<AdminId, Response> {
    actor(headers, ADMIN_HEADER).map(AdminId)
}

/// Provider records are readable by an admin or by the provider they belong to.
fn record_reader(headers: &HeaderMap, provider_id: String) -> Result<ProviderId, Response> {
    if admin_from(headers).is_ok() {
        return Ok(ProviderId(provider_id));
    }
    let caller = provider_from(headers)?;
    if caller.as_str() == provider_id {
        Ok(caller)
    } else {
        Err(error_response(MarketplaceError::Unauthorized("provider record")))
    }
}

/// Query string accepted by `GET /api/v1/jobs`; `skills` is comma separated.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct JobSearchParams {
    pub(crate) q: Option<String>,
    pub(crate) location: Option<String>,
    pub(crate) budget_max: Option<Decimal>,
    pub(crate) schedule: Option<ScheduleKind>,
    pub(crate) skills: Option<String>,
    pub(crate) applied: Option<AppliedFilter>,
    pub(crate) order: Option<PostOrder>,
}

impl From<JobSearchParams> for JobSearch {
    fn from(params: JobSearchParams) -> Self {
        Self {
            query: params.q,
            location: params.location,
            budget_max: params.budget_max,
            schedule: params.schedule,
            skills: params
                .skills
                .map(|raw| raw.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
            applied: params.applied.unwrap_or_default(),
            order: params.order.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MyPostsParams {
    pub(crate) status: Option<JobPostStatus>,
    pub(crate) order: Option<PostOrder>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusChange<T> {
    pub(crate) status: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DocumentSubmission {
    pub(crate) kind: DocumentKind,
    pub(crate) files: Vec<DocumentUpload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewRequest {
    pub(crate) decision: ReviewDecision,
    #[serde(default)]
    pub(crate) note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccountChange {
    pub(crate) active: bool,
    #[serde(default)]
    pub(crate) reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AvailabilityChange {
    pub(crate) is_available: bool,
}

pub(crate) async fn open_posts_handler<J, S, D>(
    State(market): State<Shared<J, S, D>>,
    headers: HeaderMap,
    Query(params): Query<JobSearchParams>,
) -> Response
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    let provider = match provider_from(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    let search = JobSearch::from(params);
    respond(StatusCode::OK, market.board.open_posts(&provider, &search))
}

pub(crate) async fn create_post_handler<J, S, D>(
    State(market): State<Shared<J, S, D>>,
    headers: HeaderMap,
    Json(draft): Json<JobPostDraft>,
) -> Response
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    let requester = match requester_from(&headers) {
        Ok(requester) => requester,
        Err(response) => return response,
    };
    respond(StatusCode::CREATED, market.posts.create(&requester, draft))
}

pub(crate) async fn update_post_handler<J, S, D>(
    State(market): State<Shared<J, S, D>>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
    Json(draft): Json<JobPostDraft>,
) -> Response
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    let requester = match requester_from(&headers) {
        Ok(requester) => requester,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        market
            .posts
            .update(&requester, &JobPostId(job_id), draft),
    )
}

pub(crate) async fn set_post_status_handler<J, S, D>(
    State(market): State<Shared<J, S, D>>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
    Json(change): Json<StatusChange<JobPostStatus>>,
) -> Response
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    let requester = match requester_from(&headers) {
        Ok(requester) => requester,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        market
            .posts
            .set_status(&requester, &JobPostId(job_id), change.status),
    )
}

pub(crate) async fn delete_post_handler<J, S, D>(
    State(market): State<Shared<J, S, D>>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    let requester = match requester_from(&headers) {
        Ok(requester) => requester,
        Err(response) => return response,
    };
    match market.posts.delete(&requester, &JobPostId(job_id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn my_posts_handler<J, S, D>(
    State(market): State<Shared<J, S, D>>,
    headers: HeaderMap,
    Query(params): Query<MyPostsParams>,
) -> Response
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    let requester = match requester_from(&headers) {
        Ok(requester) => requester,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        market.posts.list_my_posts(
            &requester,
            params.status,
            params.order.unwrap_or_default(),
        ),
    )
}

pub(crate) async fn applicants_handler<J, S, D>(
    State(market): State<Shared<J, S, D>>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    let requester = match requester_from(&headers) {
        Ok(requester) => requester,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        market
            .applications
            .applicants(&requester, &JobPostId(job_id)),
    )
}

pub(crate) async fn apply_handler<J, S, D>(
    State(market): State<Shared<J, S, D>>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
    Json(draft): Json<ApplicationDraft>,
) -> Response
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    let provider = match provider_from(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    respond(
        StatusCode::CREATED,
        market
            .applications
            .apply(&provider, &JobPostId(job_id), draft),
    )
}

pub(crate) async fn set_application_status_handler<J, S, D>(
    State(market): State<Shared<J, S, D>>,
    Path((job_id, application_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(change): Json<StatusChange<ApplicationStatus>>,
) -> Response
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    let requester = match requester_from(&headers) {
        Ok(requester) => requester,
        Err(response) => return response,
    };
    let job_id = JobPostId(job_id);
    let application_id = ApplicationId(application_id);

    if change.status == ApplicationStatus::Accepted {
        return respond(
            StatusCode::OK,
            market
                .applications
                .accept(&requester, &job_id, &application_id),
        );
    }
    respond(
        StatusCode::OK,
        market
            .applications
            .set_status(&requester, &job_id, &application_id, change.status),
    )
}

pub(crate) async fn my_applications_handler<J, S, D>(
    State(market): State<Shared<J, S, D>>,
    headers: HeaderMap,
) -> Response
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    let provider = match provider_from(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        market.applications.my_applications(&provider),
    )
}

pub(crate) async fn submit_documents_handler<J, S, D>(
    State(market): State<Shared<J, S, D>>,
    headers: HeaderMap,
    Json(submission): Json<DocumentSubmission>,
) -> Response
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    let provider = match provider_from(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    respond(
        StatusCode::ACCEPTED,
        market
            .eligibility
            .submit_documents(&provider, submission.kind, submission.files),
    )
}

pub(crate) async fn verification_handler<J, S, D>(
    State(market): State<Shared<J, S, D>>,
    Path(provider_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    let provider = match record_reader(&headers, provider_id) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        market
            .eligibility
            .verification(&provider)
            .map(|record| record.documents),
    )
}

pub(crate) async fn account_handler<J, S, D>(
    State(market): State<Shared<J, S, D>>,
    Path(provider_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    let provider = match record_reader(&headers, provider_id) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        market
            .eligibility
            .verification(&provider)
            .map(|record| record.account),
    )
}

pub(crate) async fn eligibility_handler<J, S, D>(
    State(market): State<Shared<J, S, D>>,
    Path(provider_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    let provider = match record_reader(&headers, provider_id) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    match market.eligibility.verdict(&provider) {
        Ok(verdict) => {
            let payload = json!({
                "eligible": verdict.eligible,
                "status": verdict.status,
                "reason": verdict.reason,
                "guidance": verdict.status.guidance(),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn review_handler<J, S, D>(
    State(market): State<Shared<J, S, D>>,
    Path(provider_id): Path<String>,
    headers: HeaderMap,
    Json(review): Json<ReviewRequest>,
) -> Response
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    let admin = match admin_from(&headers) {
        Ok(admin) => admin,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        market.eligibility.review_documents(
            &admin,
            &ProviderId(provider_id),
            review.decision,
            review.note,
        ),
    )
}

pub(crate) async fn set_account_handler<J, S, D>(
    State(market): State<Shared<J, S, D>>,
    Path(provider_id): Path<String>,
    headers: HeaderMap,
    Json(change): Json<AccountChange>,
) -> Response
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    let admin = match admin_from(&headers) {
        Ok(admin) => admin,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        market.eligibility.set_account_status(
            &admin,
            &ProviderId(provider_id),
            change.active,
            change.reason,
        ),
    )
}

pub(crate) async fn available_services_handler<J, S, D>(
    State(market): State<Shared<J, S, D>>,
) -> Response
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    respond(StatusCode::OK, market.catalog.list_available())
}

pub(crate) async fn my_services_handler<J, S, D>(
    State(market): State<Shared<J, S, D>>,
    headers: HeaderMap,
) -> Response
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    let provider = match provider_from(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    respond(StatusCode::OK, market.catalog.list_for_provider(&provider))
}

pub(crate) async fn create_service_handler<J, S, D>(
    State(market): State<Shared<J, S, D>>,
    headers: HeaderMap,
    Json(draft): Json<ServiceDraft>,
) -> Response
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    let provider = match provider_from(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    respond(StatusCode::CREATED, market.catalog.create(&provider, draft))
}

pub(crate) async fn get_service_handler<J, S, D>(
    State(market): State<Shared<J, S, D>>,
    Path(service_id): Path<String>,
) -> Response
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    respond(StatusCode::OK, market.catalog.get(&ServiceId(service_id)))
}

pub(crate) async fn update_service_handler<J, S, D>(
    State(market): State<Shared<J, S, D>>,
    Path(service_id): Path<String>,
    headers: HeaderMap,
    Json(draft): Json<ServiceDraft>,
) -> Response
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    let provider = match provider_from(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        market
            .catalog
            .update(&provider, &ServiceId(service_id), draft),
    )
}

pub(crate) async fn delete_service_handler<J, S, D>(
    State(market): State<Shared<J, S, D>>,
    Path(service_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    let provider = match provider_from(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    match market.catalog.delete(&provider, &ServiceId(service_id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn service_availability_handler<J, S, D>(
    State(market): State<Shared<J, S, D>>,
    Path(service_id): Path<String>,
    headers: HeaderMap,
    Json(change): Json<AvailabilityChange>,
) -> Response
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    let provider = match provider_from(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        market
            .catalog
            .set_availability(&provider, &ServiceId(service_id), change.is_available),
    )
}
