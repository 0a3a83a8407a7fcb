use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::HeaderMap,
    routing::{delete, get, post},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{
        DeletedResponse, UploadItem, WriteBlogForm, ADMIN_TOKEN_HEADER, MAX_LISTED_BLOGS,
    },
    repo_types::Blog,
    services::create_blog,
};
use crate::{auth::jwt::AuthUser, error::ApiError, state::AppState, storage::sanitize_file_name};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/get-blogs", get(list_blogs))
        .route("/get-blogs/:id", get(get_blog))
        .route("/latest-blog", get(latest_blog))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/write", post(write_blog))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin/blogs", delete(delete_all_blogs))
}

/// POST /write (multipart)
/// Fields: file (optional), title, author, date, content.
#[instrument(skip_all)]
pub async fn write_blog(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    WithRejection(mp, _): WithRejection<Multipart, ApiError>,
) -> Result<Json<Blog>, ApiError> {
    let form = read_form(mp).await?;

    let blog = create_blog(&state, claims.id, form).await.map_err(|e| {
        error!(error = %e, user_id = %claims.id, "create_blog failed");
        ApiError::internal()
    })?;

    info!(blog_id = %blog.id, user_id = %claims.id, image = ?blog.image, "blog written");
    Ok(Json(blog))
}

async fn read_form(mut mp: Multipart) -> Result<WriteBlogForm, ApiError> {
    let mut form = WriteBlogForm::default();

    while let Some(field) = mp.next_field().await.map_err(|e| {
        error!(error = %e, "multipart read failed");
        ApiError::internal()
    })? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let original = field.file_name().map(str::to_string);
            let content_type = field
                .content_type()
                .map(str::to_string)
                .unwrap_or_else(|| "application/octet-stream".into());
            let body = field.bytes().await.map_err(|e| {
                error!(error = %e, "multipart file read failed");
                ApiError::internal()
            })?;
            // Browsers send an empty part when no file was picked.
            if body.is_empty() && original.as_deref().unwrap_or_default().is_empty() {
                continue;
            }
            let file_name = original
                .as_deref()
                .and_then(sanitize_file_name)
                .ok_or_else(|| {
                    warn!(file_name = ?original, "rejected upload file name");
                    ApiError::BadRequest("Invalid file name".into())
                })?;
            form.file = Some(UploadItem {
                file_name,
                content_type,
                body,
            });
            continue;
        }

        let slot = match name.as_str() {
            "title" => &mut form.title,
            "author" => &mut form.author,
            "date" => &mut form.date,
            "content" => &mut form.content,
            _ => continue,
        };
        let text = field.text().await.map_err(|e| {
            error!(error = %e, field = %name, "multipart text read failed");
            ApiError::internal()
        })?;
        *slot = Some(text);
    }

    Ok(form)
}

#[instrument(skip(state))]
pub async fn list_blogs(State(state): State<AppState>) -> Result<Json<Vec<Blog>>, ApiError> {
    let blogs = state.blogs.list(MAX_LISTED_BLOGS).await.map_err(|e| {
        error!(error = %e, "list blogs failed");
        ApiError::internal()
    })?;
    Ok(Json(blogs))
}

#[instrument(skip(state))]
pub async fn latest_blog(State(state): State<AppState>) -> Result<Json<Blog>, ApiError> {
    match state.blogs.latest().await {
        Ok(Some(blog)) => Ok(Json(blog)),
        Ok(None) => Err(ApiError::NotFound("No blogs found".into())),
        Err(e) => {
            error!(error = %e, "latest blog failed");
            Err(ApiError::internal())
        }
    }
}

/// A malformed id is treated like a failed lookup (500), an unknown one as 404.
#[instrument(skip(state))]
pub async fn get_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Blog>, ApiError> {
    let lookup_failed = || ApiError::Internal("Cannot find blog with id, server error".into());

    let blog_id = Uuid::parse_str(&id).map_err(|e| {
        error!(error = %e, %id, "malformed blog id");
        lookup_failed()
    })?;

    match state.blogs.find_by_id(blog_id).await {
        Ok(Some(blog)) => Ok(Json(blog)),
        Ok(None) => Err(ApiError::NotFound(format!("Cannot find blog with ID: {}", id))),
        Err(e) => {
            error!(error = %e, %id, "find blog failed");
            Err(lookup_failed())
        }
    }
}

/// DELETE /admin/blogs, mounted only when an admin token is configured.
#[instrument(skip(state, headers))]
pub async fn delete_all_blogs(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DeletedResponse>, ApiError> {
    let supplied = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());
    let authorized = matches!(
        (state.config.admin_token.as_deref(), supplied),
        (Some(expected), Some(got)) if expected == got
    );
    if !authorized {
        warn!("admin token missing or wrong");
        return Err(ApiError::Unauthorized("Admin token required".into()));
    }

    let deleted = state.blogs.delete_all().await.map_err(|e| {
        error!(error = %e, "delete all blogs failed");
        ApiError::internal()
    })?;

    info!(deleted, "all blogs deleted");
    Ok(Json(DeletedResponse { deleted }))
}
