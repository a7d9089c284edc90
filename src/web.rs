use std::collections::HashMap;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::app::App;
use crate::auth;
use crate::context::{
    self, DashboardContext, GoalDetailContext, GoalListContext, HabitDetailContext,
    HabitListContext,
};
use crate::error::AppError;
use crate::model::{
    CompletionOutcome, GoalChanges, GoalInput, GoalQuery, GoalStatus, HabitChanges, HabitInput,
    HabitQuery, StageChanges, StageInput,
};

const SESSION_COOKIE: &str = "session";

pub struct AppState {
    pub app: App,
    sessions: RwLock<HashMap<String, i64>>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(app: App) -> SharedState {
        Arc::new(Self {
            app,
            sessions: RwLock::new(HashMap::new()),
        })
    }
}

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/health", get(health))
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
        .route("/goals", get(list_goals).post(create_goal))
        .route("/goals/:goal_id", get(goal_detail))
        .route("/goals/:goal_id/update", post(update_goal))
        .route("/goals/:goal_id/delete", post(delete_goal))
        .route("/goals/:goal_id/toggle", post(toggle_goal_completed))
        .route(
            "/goals/:goal_id/toggle/abandoned",
            post(toggle_goal_abandoned),
        )
        .route("/goals/:goal_id/stages", post(add_stage))
        .route("/goals/:goal_id/stages/:stage_id/update", post(update_stage))
        .route("/goals/:goal_id/stages/:stage_id/delete", post(delete_stage))
        .route(
            "/goals/:goal_id/stages/:stage_id/toggle",
            post(toggle_stage_completed),
        )
        .route(
            "/goals/:goal_id/stages/:stage_id/toggle/abandoned",
            post(toggle_stage_abandoned),
        )
        .route("/goals/:goal_id/commentary", post(add_goal_commentary))
        .route("/habits", get(list_habits).post(create_habit))
        .route("/habits/:habit_id", get(habit_detail))
        .route("/habits/:habit_id/update", post(update_habit))
        .route("/habits/:habit_id/delete", post(delete_habit))
        .route("/habits/:habit_id/complete", post(complete_habit))
        .route("/habits/:habit_id/commentary", post(add_habit_commentary))
        .with_state(state)
}

/// Authenticated caller, resolved from the session cookie. A missing or
/// stale session redirects to the login page with the original path in
/// `next`, mirroring browser form flows.
pub struct AuthUser {
    pub user_id: i64,
}

pub struct LoginRedirect {
    next: String,
}

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        let encoded: String = url::form_urlencoded::byte_serialize(self.next.as_bytes()).collect();
        Redirect::to(&format!("/login?next={encoded}")).into_response()
    }
}

#[async_trait]
impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = LoginRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let next = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());
        let Some(token) = session_cookie(&parts.headers) else {
            return Err(LoginRedirect { next });
        };
        let sessions = state.sessions.read().await;
        match sessions.get(&token) {
            Some(user_id) => Ok(AuthUser { user_id: *user_id }),
            None => Err(LoginRedirect { next }),
        }
    }
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(message) => (StatusCode::UNPROCESSABLE_ENTITY, message.clone()),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "authentication required".to_string(),
            ),
            AppError::Db(_) | AppError::Io(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

// --- auth ---

#[derive(Debug, Deserialize)]
struct LoginPageParams {
    next: Option<String>,
}

async fn login_page(Query(params): Query<LoginPageParams>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "sign in with POST username/password",
        "next": params.next,
    }))
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    username: String,
    password: String,
    next: Option<String>,
}

async fn login(
    State(state): State<SharedState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let account = state.app.authenticate(&form.username, &form.password).await?;
    let token = auth::generate_session_token();
    state.sessions.write().await.insert(token.clone(), account.id);

    // only same-site relative targets, never an off-site redirect
    let target = match form.next.as_deref() {
        Some(next) if next.starts_with('/') && !next.starts_with("//") => next,
        _ => "/",
    };
    let mut response = Redirect::to(target).into_response();
    let cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
    response
        .headers_mut()
        .insert(header::SET_COOKIE, cookie_value(&cookie)?);
    Ok(response)
}

async fn logout(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some(token) = session_cookie(&headers) {
        state.sessions.write().await.remove(&token);
    }
    let mut response = Redirect::to("/login").into_response();
    let cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0");
    response
        .headers_mut()
        .insert(header::SET_COOKIE, cookie_value(&cookie)?);
    Ok(response)
}

fn cookie_value(cookie: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(cookie)
        .map_err(|err| AppError::Internal(format!("invalid cookie header: {err}")))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// --- dashboard ---

async fn dashboard(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<DashboardContext>, AppError> {
    let account = state.app.get_account(auth.user_id).await?;
    let breakdown = state.app.goal_breakdown(auth.user_id).await?;
    let habits = state.app.habits_for_user(auth.user_id).await?;
    Ok(Json(context::dashboard_context(&account, breakdown, habits)))
}

// --- goals ---

#[derive(Debug, Default, Deserialize)]
struct GoalListParams {
    name: Option<String>,
    status: Option<String>,
    page: Option<u64>,
}

async fn list_goals(
    State(state): State<SharedState>,
    auth: AuthUser,
    Query(params): Query<GoalListParams>,
) -> Result<Json<GoalListContext>, AppError> {
    let status = parse_status_filter(params.status.as_deref())?;
    let query = GoalQuery {
        name: params.name,
        status,
        page: params.page,
    };
    let page = state.app.list_goals(auth.user_id, &query).await?;
    Ok(Json(context::goal_list_context(page)))
}

fn parse_status_filter(raw: Option<&str>) -> Result<Option<GoalStatus>, AppError> {
    match raw {
        Some(value) if !value.is_empty() => GoalStatus::parse(value)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("unknown status filter {value:?}"))),
        _ => Ok(None),
    }
}

#[derive(Debug, Deserialize)]
struct GoalForm {
    name: String,
    description: Option<String>,
    deadline: String,
}

async fn create_goal(
    State(state): State<SharedState>,
    auth: AuthUser,
    Form(form): Form<GoalForm>,
) -> Result<Redirect, AppError> {
    let input = GoalInput {
        name: form.name,
        description: non_blank(form.description),
        deadline: parse_deadline(&form.deadline)?,
    };
    let created = state.app.create_goal(auth.user_id, input).await?;
    Ok(Redirect::to(&format!("/goals/{}", created.id)))
}

async fn goal_detail(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(goal_id): Path<i64>,
) -> Result<Json<GoalDetailContext>, AppError> {
    let detail = state.app.goal_detail(auth.user_id, goal_id).await?;
    Ok(Json(context::goal_detail_context(detail)))
}

#[derive(Debug, Deserialize)]
struct GoalUpdateForm {
    name: Option<String>,
    description: Option<String>,
    deadline: Option<String>,
    status: Option<String>,
}

async fn update_goal(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(goal_id): Path<i64>,
    Form(form): Form<GoalUpdateForm>,
) -> Result<Redirect, AppError> {
    let deadline = form.deadline.as_deref().map(parse_deadline).transpose()?;
    let status = parse_status_filter(form.status.as_deref())?;
    let changes = GoalChanges {
        name: form.name,
        description: form.description,
        deadline,
        status,
    };
    state.app.update_goal(auth.user_id, goal_id, changes).await?;
    Ok(Redirect::to(&format!("/goals/{goal_id}")))
}

async fn delete_goal(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(goal_id): Path<i64>,
) -> Result<Redirect, AppError> {
    state.app.delete_goal(auth.user_id, goal_id).await?;
    Ok(Redirect::to("/goals"))
}

async fn toggle_goal_completed(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(goal_id): Path<i64>,
) -> Result<Redirect, AppError> {
    state.app.toggle_goal_completed(auth.user_id, goal_id).await?;
    Ok(Redirect::to(&format!("/goals/{goal_id}")))
}

async fn toggle_goal_abandoned(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(goal_id): Path<i64>,
) -> Result<Redirect, AppError> {
    state.app.toggle_goal_abandoned(auth.user_id, goal_id).await?;
    Ok(Redirect::to(&format!("/goals/{goal_id}")))
}

// --- goal stages ---

#[derive(Debug, Deserialize)]
struct StageForm {
    stage_name: String,
    description: Option<String>,
    deadline: Option<String>,
}

async fn add_stage(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(goal_id): Path<i64>,
    Form(form): Form<StageForm>,
) -> Result<Redirect, AppError> {
    let deadline = form.deadline.as_deref().map(parse_deadline).transpose()?;
    let input = StageInput {
        stage_name: form.stage_name,
        description: non_blank(form.description),
        deadline,
    };
    state.app.add_stage(auth.user_id, goal_id, input).await?;
    Ok(Redirect::to(&format!("/goals/{goal_id}")))
}

#[derive(Debug, Deserialize)]
struct StageUpdateForm {
    stage_name: Option<String>,
    description: Option<String>,
    deadline: Option<String>,
    status: Option<String>,
}

async fn update_stage(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path((goal_id, stage_id)): Path<(i64, i64)>,
    Form(form): Form<StageUpdateForm>,
) -> Result<Redirect, AppError> {
    let deadline = form.deadline.as_deref().map(parse_deadline).transpose()?;
    let status = match form.status.as_deref() {
        Some(value) if !value.is_empty() => Some(
            crate::model::StageStatus::parse(value)
                .ok_or_else(|| AppError::Validation(format!("unknown status {value:?}")))?,
        ),
        _ => None,
    };
    let changes = StageChanges {
        stage_name: form.stage_name,
        description: form.description,
        deadline,
        status,
    };
    state
        .app
        .update_stage(auth.user_id, goal_id, stage_id, changes)
        .await?;
    Ok(Redirect::to(&format!("/goals/{goal_id}")))
}

async fn delete_stage(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path((goal_id, stage_id)): Path<(i64, i64)>,
) -> Result<Redirect, AppError> {
    state.app.delete_stage(auth.user_id, goal_id, stage_id).await?;
    Ok(Redirect::to(&format!("/goals/{goal_id}")))
}

async fn toggle_stage_completed(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path((goal_id, stage_id)): Path<(i64, i64)>,
) -> Result<Redirect, AppError> {
    state
        .app
        .toggle_stage_completed(auth.user_id, goal_id, stage_id)
        .await?;
    Ok(Redirect::to(&format!("/goals/{goal_id}")))
}

async fn toggle_stage_abandoned(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path((goal_id, stage_id)): Path<(i64, i64)>,
) -> Result<Redirect, AppError> {
    state
        .app
        .toggle_stage_abandoned(auth.user_id, goal_id, stage_id)
        .await?;
    Ok(Redirect::to(&format!("/goals/{goal_id}")))
}

// --- habits ---

#[derive(Debug, Default, Deserialize)]
struct HabitListParams {
    name: Option<String>,
    page: Option<u64>,
}

async fn list_habits(
    State(state): State<SharedState>,
    auth: AuthUser,
    Query(params): Query<HabitListParams>,
) -> Result<Json<HabitListContext>, AppError> {
    let query = HabitQuery {
        name: params.name,
        page: params.page,
    };
    let page = state.app.list_habits(auth.user_id, &query).await?;
    Ok(Json(context::habit_list_context(page)))
}

#[derive(Debug, Deserialize)]
struct HabitForm {
    name: String,
    description: Option<String>,
    month_goal: Option<String>,
}

async fn create_habit(
    State(state): State<SharedState>,
    auth: AuthUser,
    Form(form): Form<HabitForm>,
) -> Result<Redirect, AppError> {
    let input = HabitInput {
        name: form.name,
        description: non_blank(form.description),
        month_goal: non_blank(form.month_goal),
    };
    let created = state.app.create_habit(auth.user_id, input).await?;
    Ok(Redirect::to(&format!("/habits/{}", created.id)))
}

async fn habit_detail(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(habit_id): Path<i64>,
) -> Result<Json<HabitDetailContext>, AppError> {
    let today = Utc::now().date_naive();
    let detail = state.app.habit_detail(auth.user_id, habit_id, today).await?;
    Ok(Json(context::habit_detail_context(detail)))
}

#[derive(Debug, Deserialize)]
struct HabitUpdateForm {
    name: Option<String>,
    description: Option<String>,
    month_goal: Option<String>,
}

async fn update_habit(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(habit_id): Path<i64>,
    Form(form): Form<HabitUpdateForm>,
) -> Result<Redirect, AppError> {
    let changes = HabitChanges {
        name: form.name,
        description: form.description,
        month_goal: form.month_goal,
    };
    state.app.update_habit(auth.user_id, habit_id, changes).await?;
    Ok(Redirect::to(&format!("/habits/{habit_id}")))
}

async fn delete_habit(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(habit_id): Path<i64>,
) -> Result<Redirect, AppError> {
    state.app.delete_habit(auth.user_id, habit_id).await?;
    Ok(Redirect::to("/habits"))
}

#[derive(Debug, Deserialize)]
struct CompleteForm {
    outcome: String,
}

/// Records today's outcome for the habit. Submitting again the same day
/// overwrites the earlier outcome.
async fn complete_habit(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(habit_id): Path<i64>,
    Form(form): Form<CompleteForm>,
) -> Result<Redirect, AppError> {
    let outcome = CompletionOutcome::parse(&form.outcome)
        .ok_or_else(|| AppError::Validation(format!("unknown outcome {:?}", form.outcome)))?;
    let today = Utc::now().date_naive();
    state
        .app
        .record_completion(auth.user_id, habit_id, today, outcome)
        .await?;
    Ok(Redirect::to(&format!("/habits/{habit_id}")))
}

// --- commentary ---

#[derive(Debug, Deserialize)]
struct CommentaryForm {
    text: String,
}

async fn add_goal_commentary(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(goal_id): Path<i64>,
    Form(form): Form<CommentaryForm>,
) -> Result<Redirect, AppError> {
    state
        .app
        .add_goal_commentary(auth.user_id, goal_id, form.text)
        .await?;
    Ok(Redirect::to(&format!("/goals/{goal_id}")))
}

async fn add_habit_commentary(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(habit_id): Path<i64>,
    Form(form): Form<CommentaryForm>,
) -> Result<Redirect, AppError> {
    state
        .app
        .add_habit_commentary(auth.user_id, habit_id, form.text)
        .await?;
    Ok(Redirect::to(&format!("/habits/{habit_id}")))
}

// --- helpers ---

fn parse_deadline(raw: &str) -> Result<DateTime<Utc>, AppError> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("invalid date {raw:?}, expected YYYY-MM-DD")))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| AppError::Internal(format!("invalid midnight for {raw:?}")))?;
    Ok(Utc.from_utc_datetime(&midnight))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use axum::body::Body;
    use axum::http::Request;
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn setup_router() -> (TempDir, SharedState, Router) {
        let dir = TempDir::new().expect("temp dir");
        let db_path = db::resolve_db_path(dir.path());
        db::ensure_parent_dir(&db_path).expect("ensure parent");
        let conn = db::connect(&db_path).await.expect("connect db");
        db::ensure_schema(&conn).await.expect("ensure schema");
        let state = AppState::new(App::new(conn));
        let router = create_router(state.clone());
        (dir, state, router)
    }

    fn form_request(uri: &str, cookie: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::COOKIE, cookie)
            .body(Body::from(body))
            .expect("request")
    }

    fn get_request(uri: &str, cookie: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .expect("request")
    }

    async fn login_cookie(router: &Router, username: &str, password: &str) -> String {
        let body = format!("username={username}&password={password}");
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/login")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("set-cookie")
            .to_str()
            .expect("ascii cookie");
        set_cookie.split(';').next().expect("cookie pair").to_string()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn unauthenticated_requests_redirect_to_login() {
        let (_dir, _state, router) = setup_router().await;

        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/goals")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get(header::LOCATION)
            .expect("location")
            .to_str()
            .expect("ascii location");
        assert_eq!(location, "/login?next=%2Fgoals");
    }

    #[tokio::test]
    async fn health_needs_no_session() {
        let (_dir, _state, router) = setup_router().await;

        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let (_dir, state, router) = setup_router().await;
        state
            .app
            .create_account("alice", "Alice", "password123")
            .await
            .expect("account");

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/login")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("username=alice&password=wrong"))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_grants_access_to_dashboard() {
        let (_dir, state, router) = setup_router().await;
        state
            .app
            .create_account("alice", "Alice", "password123")
            .await
            .expect("account");
        let cookie = login_cookie(&router, "alice", "password123").await;

        let response = router
            .oneshot(get_request("/", &cookie))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["display_name"], "Alice");
        assert_eq!(body["total_goals_number"], 0);
        assert_eq!(body["habits_number"], 0);
    }

    #[tokio::test]
    async fn logout_invalidates_the_session() {
        let (_dir, state, router) = setup_router().await;
        state
            .app
            .create_account("alice", "Alice", "password123")
            .await
            .expect("account");
        let cookie = login_cookie(&router, "alice", "password123").await;

        let response = router
            .clone()
            .oneshot(form_request("/logout", &cookie, String::new()))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = router
            .oneshot(get_request("/", &cookie))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn goal_round_trip_over_http() {
        let (_dir, state, router) = setup_router().await;
        state
            .app
            .create_account("alice", "Alice", "password123")
            .await
            .expect("account");
        let cookie = login_cookie(&router, "alice", "password123").await;

        let response = router
            .clone()
            .oneshot(form_request(
                "/goals",
                &cookie,
                "name=Run+a+marathon&deadline=2023-03-04".to_string(),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get(header::LOCATION)
            .expect("location")
            .to_str()
            .expect("ascii location")
            .to_string();

        let response = router
            .clone()
            .oneshot(get_request(&location, &cookie))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["goal"]["name"], "Run a marathon");
        assert_eq!(body["goal"]["status"], "active");

        let response = router
            .clone()
            .oneshot(form_request(
                &format!("{location}/toggle"),
                &cookie,
                String::new(),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = router
            .oneshot(get_request(&location, &cookie))
            .await
            .expect("response");
        let body = json_body(response).await;
        assert_eq!(body["goal"]["status"], "completed");
    }

    #[tokio::test]
    async fn blank_commentary_returns_unprocessable() {
        let (_dir, state, router) = setup_router().await;
        let account = state
            .app
            .create_account("alice", "Alice", "password123")
            .await
            .expect("account");
        let goal = state
            .app
            .create_goal(
                account.id,
                GoalInput {
                    name: "Goal".to_string(),
                    description: None,
                    deadline: Utc::now(),
                },
            )
            .await
            .expect("goal");
        let cookie = login_cookie(&router, "alice", "password123").await;

        let response = router
            .oneshot(form_request(
                &format!("/goals/{}/commentary", goal.id),
                &cookie,
                "text=%20%20".to_string(),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unknown_status_filter_is_rejected() {
        let (_dir, state, router) = setup_router().await;
        state
            .app
            .create_account("alice", "Alice", "password123")
            .await
            .expect("account");
        let cookie = login_cookie(&router, "alice", "password123").await;

        let response = router
            .oneshot(get_request("/goals?status=done", &cookie))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn other_users_goal_is_not_found() {
        let (_dir, state, router) = setup_router().await;
        let alice = state
            .app
            .create_account("alice", "Alice", "password123")
            .await
            .expect("account");
        state
            .app
            .create_account("bob", "Bob", "password123")
            .await
            .expect("account");
        let goal = state
            .app
            .create_goal(
                alice.id,
                GoalInput {
                    name: "Goal".to_string(),
                    description: None,
                    deadline: Utc::now(),
                },
            )
            .await
            .expect("goal");
        let cookie = login_cookie(&router, "bob", "password123").await;

        let response = router
            .oneshot(get_request(&format!("/goals/{}", goal.id), &cookie))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
