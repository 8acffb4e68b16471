use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, OriginalUri, Query, State},
    handler::Handler,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{error, info, instrument, warn};

use crate::{
    state::AppState,
    users::dto::{IdQuery, UpdateUser, User},
};

type HandlerError = (StatusCode, &'static str);
type PairsQuery = Result<Query<Vec<(String, String)>>, QueryRejection>;

pub fn user_routes() -> Router<AppState> {
    let router = Router::new();
    let router = subtree(router, "/users/create", create_user);
    let router = subtree(router, "/users/get", get_user);
    let router = subtree(router, "/users/update", update_user);
    subtree(router, "/users/delete", delete_user)
}

/// Serves `handler` on `{path}/` and everything below it; the bare `path`
/// redirects to the slashed form.
fn subtree<H, T>(router: Router<AppState>, path: &str, handler: H) -> Router<AppState>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    router
        .route(&format!("{path}/"), any(handler.clone()))
        .route(&format!("{path}/*rest"), any(handler))
        .route(path, any(redirect_to_slash))
}

async fn redirect_to_slash(OriginalUri(uri): OriginalUri) -> Response {
    let mut target = format!("{}/", uri.path());
    if let Some(q) = uri.query() {
        target.push('?');
        target.push_str(q);
    }
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, target)]).into_response()
}

#[instrument(skip(state, body))]
pub async fn create_user(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Result<StatusCode, HandlerError> {
    require_method(&method, Method::POST, "Only POST method is supported")?;

    let user: User = decode_body(&body).map_err(|e| {
        warn!(error = %e, "failed to parse user data");
        (StatusCode::BAD_REQUEST, "Failed to parse user data")
    })?;

    if let Err(e) = state.users.create(&user).await {
        error!(error = %e, "failed to create new user");
        return Err((StatusCode::INTERNAL_SERVER_ERROR, "Failed to create new user"));
    }

    info!(login = %user.login, name = %user.name, email = %user.email, "user created");
    Ok(StatusCode::OK)
}

#[instrument(skip(state, query))]
pub async fn get_user(
    State(state): State<AppState>,
    method: Method,
    query: PairsQuery,
) -> Result<Response, HandlerError> {
    require_method(&method, Method::GET, "Only GET method is supported")?;
    let query = parse_query(query)?;

    if let Some(raw) = query.id {
        let id = parse_id(&raw)?;
        let user = state.users.get(id).await.map_err(|e| {
            error!(error = %e, id, "failed to get user");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to get user")
        })?;
        return Ok(Json(user).into_response());
    }

    let users = state.users.list().await.map_err(|e| {
        error!(error = %e, "failed to get user list");
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to get user list")
    })?;
    Ok(Json(users).into_response())
}

#[instrument(skip(state, body))]
pub async fn update_user(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Result<StatusCode, HandlerError> {
    require_method(&method, Method::PATCH, "Only PATCH method is supported")?;

    let user: UpdateUser = decode_body(&body).map_err(|e| {
        warn!(error = %e, "failed to parse update user data");
        (StatusCode::BAD_REQUEST, "Failed to parse update user data")
    })?;

    if let Err(e) = state.users.update(&user).await {
        error!(error = %e, id = user.id, "failed to update user");
        return Err((StatusCode::INTERNAL_SERVER_ERROR, "Failed to update user"));
    }

    info!(id = user.id, login = %user.login, name = %user.name, email = %user.email, "user updated");
    Ok(StatusCode::OK)
}

#[instrument(skip(state, query))]
pub async fn delete_user(
    State(state): State<AppState>,
    method: Method,
    query: PairsQuery,
) -> Result<&'static str, HandlerError> {
    require_method(&method, Method::DELETE, "Only DELETE method is supported")?;
    let query = parse_query(query)?;
    let id = parse_id(query.id.as_deref().unwrap_or_default())?;

    if let Err(e) = state.users.delete(id).await {
        error!(error = %e, id, "failed to delete user");
        return Err((StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete user"));
    }
    Ok("OK")
}

fn require_method(got: &Method, want: Method, msg: &'static str) -> Result<(), HandlerError> {
    if *got != want {
        warn!(method = %got, expected = %want, "unsupported method");
        return Err((StatusCode::BAD_REQUEST, msg));
    }
    Ok(())
}

fn parse_query(query: PairsQuery) -> Result<IdQuery, HandlerError> {
    match query {
        Ok(Query(pairs)) => Ok(IdQuery::from(pairs)),
        Err(e) => {
            warn!(error = %e, "failed to parse request");
            Err((StatusCode::BAD_REQUEST, "Failed to parse request"))
        }
    }
}

fn parse_id(raw: &str) -> Result<i64, HandlerError> {
    raw.parse::<i64>().map_err(|_| {
        warn!(id = raw, "got wrong user id");
        (StatusCode::BAD_REQUEST, "Got wrong user id")
    })
}

/// Reads the first JSON value of `body`. Trailing data is ignored, a `null`
/// body or `null` field leaves the defaults, and top-level keys match
/// case-insensitively.
fn decode_body<T>(body: &[u8]) -> Result<T, serde_json::Error>
where
    T: DeserializeOwned + Default,
{
    let value = serde_json::Deserializer::from_slice(body)
        .into_iter::<Value>()
        .next()
        .unwrap_or_else(|| Err(<serde_json::Error as serde::de::Error>::custom("empty body")))?;

    match value {
        Value::Null => Ok(T::default()),
        Value::Object(map) => {
            let folded: Map<String, Value> = map
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect();
            serde_json::from_value(Value::Object(folded))
        }
        other => serde_json::from_value(other),
    }
}
