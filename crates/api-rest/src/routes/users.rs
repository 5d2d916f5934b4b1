//! Staff account administration endpoints.

use axum::{
    extract::State,
    http::HeaderMap,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;

use hcms_core::constants::MAX_NAME_LEN;
use hcms_core::domain::{Role, User};
use hcms_core::validation;

use crate::auth;
use crate::dto::{CreatedUser, CreatedUserRes, UserListRes, UserView};
use crate::error::ApiResult;
use crate::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users", get(list_users))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserReq {
    pub username: String,
    pub name: String,
    pub role: Role,
}

#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserReq,
    responses(
        (status = 200, description = "Account created, token disclosed once", body = CreatedUserRes),
        (status = 400, description = "Validation error or duplicate username"),
        (status = 403, description = "Role not allowed")
    )
)]
/// Create a staff account
///
/// Admin only. The response carries the account's bearer token; it is
/// not retrievable afterwards, so hand it to the staff member now.
#[axum::debug_handler]
pub(crate) async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateUserReq>,
) -> ApiResult<Json<CreatedUserRes>> {
    let admin = auth::authorize(&state, &headers).await?;
    auth::require_role(&admin, &[Role::Admin])?;

    let username = validation::username(&req.username)?;
    let name = validation::required_text("Name", &req.name, MAX_NAME_LEN)?;
    let token = auth::issue_token();

    let user = User::new(username, name, req.role, token.clone());
    state.store.insert_user(user.clone()).await?;
    tracing::info!("Created {} account {}", user.role, user.username);

    Ok(Json(CreatedUserRes {
        success: true,
        data: CreatedUser {
            user: UserView::from(user),
            token,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All staff accounts, by username", body = UserListRes),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Role not allowed")
    )
)]
/// List staff accounts
#[axum::debug_handler]
pub(crate) async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<UserListRes>> {
    let admin = auth::authorize(&state, &headers).await?;
    auth::require_role(&admin, &[Role::Admin])?;

    let users = state
        .store
        .list_users()
        .await
        .into_iter()
        .map(UserView::from)
        .collect();

    Ok(Json(UserListRes {
        success: true,
        data: users,
    }))
}
