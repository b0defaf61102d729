use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::{AuthUser, JwtKeys},
    error::ApiError,
    state::AppState,
};

use super::dto::{
    CreateUserRequest, ReplaceUserRequest, SignInRequest, TokenResponse, UpdateUserRequest,
};
use super::model::PublicUser;
use super::service;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route(
            "/users/:id",
            get(get_user)
                .patch(update_user)
                .put(replace_user)
                .delete(delete_user),
        )
        .route("/users/signin", post(sign_in))
}

#[instrument(skip(state, payload))]
async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    let user = service::create_user(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state))]
async fn list_users(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    Ok(Json(service::get_users(&state.db).await?))
}

#[instrument(skip(state))]
async fn get_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicUser>, ApiError> {
    Ok(Json(service::get_user_by_id(&state.db, id).await?))
}

#[instrument(skip(state, payload))]
async fn update_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    Ok(Json(service::update_user(&state.db, id, payload).await?))
}

#[instrument(skip(state, payload))]
async fn replace_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReplaceUserRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    Ok(Json(service::replace_user(&state.db, id, payload).await?))
}

#[instrument(skip(state))]
async fn delete_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<(), ApiError> {
    service::delete_user(&state.db, id).await
}

#[instrument(skip(state, payload))]
async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = service::validate_credentials(&state.db, &payload.email, &payload.password).await?;

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys
        .sign(user.id, &user.email)
        .map_err(ApiError::Internal)?;

    info!(user_id = %user.id, email = %user.email, "user signed in");
    Ok(Json(TokenResponse { access_token }))
}
