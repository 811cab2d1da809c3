use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query,
    },
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{gigdtos::*, ApiResponse},
    error::HttpError,
    handler::{json_body, query_params},
    middleware::{auth, AuthSession},
    AppState,
};

/// Listing is public; everything else needs a session.
pub fn gigs_handler() -> Router {
    let protected = Router::new()
        .route("/mine", get(my_gigs))
        .route("/:id", get(get_gig))
        .route("/:id/apply", post(apply_to_gig))
        .route("/:id/quick-apply", post(quick_apply_to_gig))
        .route("/:id/application", get(my_application))
        .route("/:id/applications", get(list_applications))
        .route(
            "/:id/applications/:application_id/accept",
            put(accept_application),
        )
        .route_layer(middleware::from_fn(auth));

    Router::new()
        .route(
            "/",
            get(list_gigs).merge(post(create_gig).layer(middleware::from_fn(auth))),
        )
        .merge(protected)
}

pub async fn list_gigs(
    Extension(app_state): Extension<Arc<AppState>>,
    params: Result<Query<GigFilterQuery>, QueryRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let params = query_params(params)?;
    let gigs = app_state.gig_service.list_open_gigs(&params).await?;

    Ok(Json(ApiResponse::success("Gigs retrieved successfully", gigs)))
}

pub async fn create_gig(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    payload: Result<Json<CreateGigDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let body = json_body(payload)?;
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let gig = app_state
        .gig_service
        .create_gig(session.profile.id, body)
        .await?;

    Ok(Json(ApiResponse::success("Gig created successfully", gig)))
}

pub async fn my_gigs(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> Result<impl IntoResponse, HttpError> {
    let gigs = app_state.gig_service.my_gigs(session.profile.id).await?;

    Ok(Json(ApiResponse::success("Gigs retrieved successfully", gigs)))
}

pub async fn get_gig(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(gig_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let gig = app_state
        .gig_service
        .get_gig_detail(gig_id, session.profile.id)
        .await?;

    Ok(Json(ApiResponse::success("Gig retrieved successfully", gig)))
}

pub async fn apply_to_gig(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(gig_id): Path<Uuid>,
    payload: Result<Json<ApplyGigDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let body = json_body(payload)?;
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let application = app_state
        .application_service
        .apply(gig_id, session.profile.id, &body.cover_letter)
        .await?;

    Ok(Json(ApiResponse::success(
        "Application submitted successfully",
        application,
    )))
}

pub async fn quick_apply_to_gig(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(gig_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let application = app_state
        .application_service
        .quick_apply(gig_id, session.profile.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Application submitted successfully",
        application,
    )))
}

pub async fn my_application(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(gig_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let application = app_state
        .application_service
        .my_application(gig_id, session.profile.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Application retrieved successfully",
        application,
    )))
}

pub async fn list_applications(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(gig_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let applications = app_state
        .application_service
        .list_for_gig(gig_id, session.profile.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Applications retrieved successfully",
        ApplicationListResponseDto {
            results: applications.len(),
            applications,
        },
    )))
}

pub async fn accept_application(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path((gig_id, application_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, HttpError> {
    let accepted = app_state
        .application_service
        .accept(gig_id, application_id, session.profile.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Application accepted and gig assigned",
        accepted,
    )))
}
