use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use inkwell_api_types::{
    FeaturedPostRequest, PostContentRequest, PostCreatedResponse, PostResponse,
};

use crate::application::store::StoreError;
use crate::domain::entities::{PostContent, PostId, PostRecord};

use super::error::ApiError;
use super::state::ApiState;

pub async fn list_posts(State(state): State<ApiState>) -> Json<Vec<PostResponse>> {
    Json(to_responses(state.posts.list_posts()))
}

pub async fn create_post(
    State(state): State<ApiState>,
    payload: Result<Json<PostContentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(json_to_api)?;
    let id = state
        .posts
        .create_post(content_from(payload))
        .map_err(store_to_api)?;
    Ok((
        StatusCode::CREATED,
        Json(PostCreatedResponse { id: id.get() }),
    ))
}

pub async fn get_post(
    State(state): State<ApiState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<PostResponse>, ApiError> {
    let id = post_id(id)?;
    let post = state.posts.get_post(id).map_err(store_to_api)?;
    Ok(Json(post.into()))
}

pub async fn edit_post(
    State(state): State<ApiState>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<PostContentRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let id = post_id(id)?;
    let Json(payload) = payload.map_err(json_to_api)?;
    state
        .posts
        .edit_post(id, content_from(payload))
        .map_err(store_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_post(
    State(state): State<ApiState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = post_id(id)?;
    state.posts.delete_post(id).map_err(store_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn featured_posts(State(state): State<ApiState>) -> Json<Vec<PostResponse>> {
    Json(to_responses(state.posts.featured_posts()))
}

pub async fn set_featured_post(
    State(state): State<ApiState>,
    payload: Result<Json<FeaturedPostRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(payload) = payload.map_err(json_to_api)?;
    state
        .posts
        .set_featured_post(PostId::new(payload.id))
        .map_err(store_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_featured_post(State(state): State<ApiState>) -> Result<StatusCode, ApiError> {
    state.posts.clear_featured_post().map_err(store_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn star_post(
    State(state): State<ApiState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = post_id(id)?;
    state.posts.star_post(id).map_err(store_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unstar_post(
    State(state): State<ApiState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = post_id(id)?;
    state.posts.unstar_post(id).map_err(store_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

fn to_responses(posts: Vec<PostRecord>) -> Vec<PostResponse> {
    posts.into_iter().map(PostResponse::from).collect()
}

fn content_from(payload: PostContentRequest) -> PostContent {
    PostContent::new(payload.title, payload.content, payload.author)
}

fn post_id(id: Result<Path<u64>, PathRejection>) -> Result<PostId, ApiError> {
    let Path(id) =
        id.map_err(|err| ApiError::bad_request("invalid post id", Some(err.body_text())))?;
    Ok(PostId::new(id))
}

fn json_to_api(err: JsonRejection) -> ApiError {
    ApiError::bad_request("invalid request body", Some(err.body_text()))
}

pub(crate) fn store_to_api(err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound { id } => {
            ApiError::not_found("post not found", Some(format!("no post with id {id}")))
        }
        err @ StoreError::UnsupportedOperation { .. } => {
            ApiError::unsupported("operation not supported", Some(err.to_string()))
        }
        err => ApiError::internal("internal error", Some(err.to_string())),
    }
}
