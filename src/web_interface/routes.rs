use std::convert::Infallible;
use std::sync::Arc;

use log::{debug, error};
use serde::Serialize;
use warp::filters::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::{Filter, Rejection, Reply};

use super::types::*;
use crate::controller::Controller;
use crate::confessions::ConfessionStatus;
use crate::error_handling::types::ControllerError;

const MAX_BODY_BYTES: u64 = 16 * 1024;

/// All API routes.
pub fn api_routes(
    controller: Arc<Controller>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    confession_routes(controller.clone())
        .or(admin_routes(controller.clone()))
        .or(habit_routes(controller))
}

fn with_controller(
    controller: Arc<Controller>,
) -> impl Filter<Extract = (Arc<Controller>,), Error = Infallible> + Clone {
    warp::any().map(move || controller.clone())
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

/// GET /confessions, POST /confessions, GET /confessions/tags,
/// GET /confessions/:id, POST /confessions/:id/reactions,
/// POST /confessions/:id/comments, DELETE /confessions/:id/comments/:comment_id
pub fn confession_routes(
    controller: Arc<Controller>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let list = warp::path!("confessions")
        .and(warp::get())
        .and(with_controller(controller.clone()))
        .and_then(list_confessions);

    let create = warp::path!("confessions")
        .and(warp::post())
        .and(json_body())
        .and(with_controller(controller.clone()))
        .and_then(create_confession);

    let tags = warp::path!("confessions" / "tags")
        .and(warp::get())
        .and(with_controller(controller.clone()))
        .and_then(list_tags);

    let detail = warp::path!("confessions" / String)
        .and(warp::get())
        .and(with_controller(controller.clone()))
        .and_then(get_confession);

    let react = warp::path!("confessions" / String / "reactions")
        .and(warp::post())
        .and(json_body())
        .and(with_controller(controller.clone()))
        .and_then(react_to_confession);

    let comment = warp::path!("confessions" / String / "comments")
        .and(warp::post())
        .and(json_body())
        .and(with_controller(controller.clone()))
        .and_then(add_comment);

    let delete_comment = warp::path!("confessions" / String / "comments" / String)
        .and(warp::delete())
        .and(with_controller(controller))
        .and_then(delete_comment);

    list.or(create)
        .or(tags)
        .or(detail)
        .or(react)
        .or(comment)
        .or(delete_comment)
}

/// GET /admin/confessions/pending, POST /admin/confessions/moderate
pub fn admin_routes(
    controller: Arc<Controller>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let pending = warp::path!("admin" / "confessions" / "pending")
        .and(warp::get())
        .and(with_controller(controller.clone()))
        .and_then(list_pending);

    let moderate = warp::path!("admin" / "confessions" / "moderate")
        .and(warp::post())
        .and(json_body())
        .and(with_controller(controller))
        .and_then(moderate_confession);

    pending.or(moderate)
}

/// GET /habits, POST /habits, POST /habits/:id/tick, DELETE /habits/:id
pub fn habit_routes(
    controller: Arc<Controller>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let list = warp::path!("habits")
        .and(warp::get())
        .and(with_controller(controller.clone()))
        .and_then(list_habits);

    let create = warp::path!("habits")
        .and(warp::post())
        .and(json_body())
        .and(with_controller(controller.clone()))
        .and_then(create_habit);

    let tick = warp::path!("habits" / String / "tick")
        .and(warp::post())
        .and(with_controller(controller.clone()))
        .and_then(tick_habit);

    let delete = warp::path!("habits" / String)
        .and(warp::delete())
        .and(with_controller(controller))
        .and_then(delete_habit);

    list.or(create).or(tick).or(delete)
}

pub async fn list_confessions(controller: Arc<Controller>) -> Result<Response, Infallible> {
    respond(controller, StatusCode::OK, |c| Ok(c.confessions().list_confessions(false))).await
}

pub async fn create_confession(
    body: NewConfessionRequest,
    controller: Arc<Controller>,
) -> Result<Response, Infallible> {
    respond(controller, StatusCode::CREATED, move |c| {
        c.submit_confession(&body.content, &body.tags)
    })
    .await
}

pub async fn list_tags(controller: Arc<Controller>) -> Result<Response, Infallible> {
    respond(controller, StatusCode::OK, |c| Ok(c.confessions().list_tags())).await
}

pub async fn get_confession(id: String, controller: Arc<Controller>) -> Result<Response, Infallible> {
    respond(controller, StatusCode::OK, move |c| c.confession(&id)).await
}

pub async fn react_to_confession(
    id: String,
    body: ReactionRequest,
    controller: Arc<Controller>,
) -> Result<Response, Infallible> {
    respond(controller, StatusCode::OK, move |c| c.react(&id, &body.emoji)).await
}

pub async fn add_comment(
    id: String,
    body: CommentRequest,
    controller: Arc<Controller>,
) -> Result<Response, Infallible> {
    respond(controller, StatusCode::CREATED, move |c| c.comment(&id, &body.content)).await
}

pub async fn delete_comment(
    id: String,
    comment_id: String,
    controller: Arc<Controller>,
) -> Result<Response, Infallible> {
    respond(controller, StatusCode::OK, move |c| c.delete_comment(&id, &comment_id)).await
}

pub async fn list_pending(controller: Arc<Controller>) -> Result<Response, Infallible> {
    respond(controller, StatusCode::OK, |c| {
        Ok(c.confessions().list_by_status(ConfessionStatus::Pending))
    })
    .await
}

pub async fn moderate_confession(
    body: ModerateRequest,
    controller: Arc<Controller>,
) -> Result<Response, Infallible> {
    respond(controller, StatusCode::OK, move |c| c.moderate(&body.id, body.status)).await
}

pub async fn list_habits(controller: Arc<Controller>) -> Result<Response, Infallible> {
    respond(controller, StatusCode::OK, |c| Ok(c.habits().list_habits())).await
}

pub async fn create_habit(body: NewHabitRequest, controller: Arc<Controller>) -> Result<Response, Infallible> {
    respond(controller, StatusCode::CREATED, move |c| c.create_habit(&body.title)).await
}

pub async fn tick_habit(id: String, controller: Arc<Controller>) -> Result<Response, Infallible> {
    respond(controller, StatusCode::OK, move |c| c.tick_habit(&id)).await
}

pub async fn delete_habit(id: String, controller: Arc<Controller>) -> Result<Response, Infallible> {
    respond(controller, StatusCode::OK, move |c| {
        c.delete_habit(&id).map(|()| DeletedResponse { deleted: true })
    })
    .await
}

/// Runs a controller call on the blocking pool and renders the result.
///
/// Store operations are synchronous and the database backend blocks on its
/// own runtime, so they must not run on an async worker thread.
async fn respond<T, F>(controller: Arc<Controller>, status: StatusCode, op: F) -> Result<Response, Infallible>
where
    T: Serialize + Send + 'static,
    F: FnOnce(&Controller) -> Result<T, ControllerError> + Send + 'static,
{
    let outcome = tokio::task::spawn_blocking(move || op(&controller)).await;
    let res = match outcome {
        Ok(Ok(value)) => reply::with_status(reply::json(&value), status).into_response(),
        Ok(Err(e)) => error_response(&e),
        Err(e) => {
            error!("Request task failed: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    };
    Ok(res)
}

fn error_response(err: &ControllerError) -> Response {
    match err {
        ControllerError::Rejected(msg) => api_error(StatusCode::BAD_REQUEST, msg),
        ControllerError::NotFound(msg) => {
            debug!("Not found: {}", msg);
            api_error(StatusCode::NOT_FOUND, &format!("{} not found", msg))
        }
        other => {
            error!("Request failed: {}", other);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Storage failure")
        }
    }
}

fn api_error(status: StatusCode, message: &str) -> Response {
    reply::with_status(
        reply::json(&ApiError {
            message: message.to_string(),
        }),
        status,
    )
    .into_response()
}

/// Turns unmatched routes and malformed bodies into JSON errors.
///
/// Method mismatches are checked last: a combined rejection from `or`
/// carries one from every sibling route that shares the path.
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let res = if err.is_not_found() {
        api_error(StatusCode::NOT_FOUND, "No such route")
    } else if let Some(e) = err.find::<BodyDeserializeError>() {
        api_error(StatusCode::BAD_REQUEST, &format!("Invalid request body: {}", e))
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        api_error(StatusCode::LENGTH_REQUIRED, "Content-Length header required")
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        api_error(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        api_error(StatusCode::UNSUPPORTED_MEDIA_TYPE, "Expected a JSON body")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        api_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    } else {
        error!("Unhandled rejection: {:?}", err);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    };
    Ok(res)
}
