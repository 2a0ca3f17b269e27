use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use bibrec_common::{Locale, PersonId, PublicationId, VersionId};

use crate::domain::{
    AppState,
    import::import_endnote,
    publications::{create_publication, delete_publication, fetch_publication, update_publication},
    review::{publication_review_diff, review_publication},
    user::CurrentUser,
};
use crate::infrastructure::http::{
    api::{ApiError, ApiSuccess},
    querystring::QueryString,
};

use dto::{
    DetailParams, EmptyResponse, ImportResponse, LocaleParams, PublicationData,
    PublicationRequest, PublicationResponse, ReviewDiffParams, ReviewDiffResponse, ReviewRequest,
    ReviewResponse,
};

mod dto;

pub async fn find_publication<S: AppState>(
    Path(id): Path<i64>,
    QueryString(params): QueryString<DetailParams>,
    State(state): State<S>,
    user: CurrentUser,
) -> Result<ApiSuccess<PublicationResponse>, ApiError> {
    let locale = params.locale();
    let detail = fetch_publication(
        state.repository(),
        state.sources(),
        state.catalog(),
        PublicationId(id),
        params.version_id.map(VersionId),
        &user,
        locale,
    )
    .await
    .map_err(|e| ApiError::localized(e, locale))?;

    let publication = PublicationData::from_detail(detail, state.catalog());
    Ok(ApiSuccess::new(StatusCode::OK, PublicationResponse { publication }))
}

pub async fn create<S: AppState>(
    QueryString(params): QueryString<LocaleParams>,
    State(state): State<S>,
    user: CurrentUser,
    Json(request): Json<PublicationRequest>,
) -> Result<ApiSuccess<PublicationResponse>, ApiError> {
    let locale = params.locale();
    let record = create_publication(
        state.repository(),
        state.catalog(),
        request.publication.into(),
        &user,
    )
    .await
    .map_err(|e| ApiError::localized(e, locale))?;

    let publication = render(&state, record.publication.id, &user, locale).await?;
    Ok(ApiSuccess::new(StatusCode::CREATED, PublicationResponse { publication }))
}

pub async fn update<S: AppState>(
    Path(id): Path<i64>,
    QueryString(params): QueryString<LocaleParams>,
    State(state): State<S>,
    user: CurrentUser,
    Json(request): Json<PublicationRequest>,
) -> Result<ApiSuccess<PublicationResponse>, ApiError> {
    let locale = params.locale();
    let record = update_publication(
        state.repository(),
        state.catalog(),
        PublicationId(id),
        request.publication.into(),
        &user,
    )
    .await
    .map_err(|e| ApiError::localized(e, locale))?;

    let publication = render(&state, record.publication.id, &user, locale).await?;
    Ok(ApiSuccess::new(StatusCode::OK, PublicationResponse { publication }))
}

pub async fn delete<S: AppState>(
    Path(id): Path<i64>,
    QueryString(params): QueryString<LocaleParams>,
    State(state): State<S>,
    user: CurrentUser,
) -> Result<ApiSuccess<EmptyResponse>, ApiError> {
    delete_publication(state.repository(), PublicationId(id), &user)
        .await
        .map_err(|e| ApiError::localized(e, params.locale()))?;

    Ok(ApiSuccess::new(StatusCode::OK, EmptyResponse {}))
}

/// The request body is the EndNote XML export itself
pub async fn import<S: AppState>(
    QueryString(params): QueryString<LocaleParams>,
    State(state): State<S>,
    user: CurrentUser,
    body: Bytes,
) -> Result<ApiSuccess<ImportResponse>, ApiError> {
    let summary = import_endnote(state.repository(), state.catalog(), &body, &user)
        .await
        .map_err(|e| ApiError::localized(e, params.locale()))?;

    Ok(ApiSuccess::new(
        StatusCode::CREATED,
        ImportResponse::new(summary, state.catalog()),
    ))
}

pub async fn review_diff<S: AppState>(
    Path(id): Path<i64>,
    QueryString(params): QueryString<ReviewDiffParams>,
    State(state): State<S>,
    _user: CurrentUser,
) -> Result<ApiSuccess<ReviewDiffResponse>, ApiError> {
    let diff = publication_review_diff(state.repository(), PublicationId(id), PersonId(params.person_id))
        .await
        .map_err(|e| ApiError::localized(e, params.locale()))?;

    let diff = match diff {
        Some(diff) => serde_json::to_value(diff)
            .map_err(|e| ApiError::InternalServerError(e.to_string()))?,
        None => serde_json::Value::Object(serde_json::Map::new()),
    };
    Ok(ApiSuccess::new(StatusCode::OK, ReviewDiffResponse { diff }))
}

pub async fn review<S: AppState>(
    Path(id): Path<i64>,
    QueryString(params): QueryString<LocaleParams>,
    State(state): State<S>,
    _user: CurrentUser,
    Json(request): Json<ReviewRequest>,
) -> Result<ApiSuccess<ReviewResponse>, ApiError> {
    let authorship = review_publication(state.repository(), PublicationId(id), request.person_id)
        .await
        .map_err(|e| ApiError::localized(e, params.locale()))?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        ReviewResponse {
            people2publication: authorship,
        },
    ))
}

/// Detail of the current version as the requesting user sees it
async fn render<S: AppState>(
    state: &S,
    id: PublicationId,
    user: &CurrentUser,
    locale: Locale,
) -> Result<PublicationData, ApiError> {
    let detail = fetch_publication(
        state.repository(),
        state.sources(),
        state.catalog(),
        id,
        None,
        user,
        locale,
    )
    .await
    .map_err(|e| ApiError::localized(e, locale))?;
    Ok(PublicationData::from_detail(detail, state.catalog()))
}
