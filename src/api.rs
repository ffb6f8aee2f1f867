use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::app::{resolve, resolve_branch, ActiveLesson, App, AppError, QuizView};
use crate::dashboard::{summarize, DashboardSummary};
use crate::data::{catalog, find_subject, lesson_outline};
use crate::models::{Branch, LessonContent, LessonId, ProgressData, Subject, SubjectType, User};
use crate::progress::CompletionOutcome;
use crate::quiz::QuizError;

#[derive(Clone)]
pub struct ApiState {
    pub app: Arc<Mutex<App>>,
}

pub fn app_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/subjects", get(list_subjects))
        .route("/api/subjects/:subject", get(get_subject))
        .route("/api/subjects/:subject/branches/:branch", get(get_branch))
        .route("/api/lessons/:subject/:branch/:lesson", post(open_lesson))
        .route("/api/quiz", get(get_quiz))
        .route("/api/quiz/answer", post(answer))
        .route("/api/quiz/next", post(next_question))
        .route("/api/quiz/retry", post(retry))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/me", get(me))
        .route("/api/progress", get(progress))
        .route("/api/dashboard", get(dashboard))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct ApiError(AppError);

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        ApiError(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError(AppError::Storage(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::NotFound(_) | AppError::Quiz(QuizError::NoQuestions) => StatusCode::NOT_FOUND,
            AppError::SignedOut => StatusCode::UNAUTHORIZED,
            AppError::Quiz(QuizError::InvalidOption(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NoActiveLesson | AppError::Superseded | AppError::Quiz(_) => StatusCode::CONFLICT,
            AppError::Storage(e) => {
                error!("Storage failure: {:#}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubjectView<'a> {
    #[serde(flatten)]
    subject: &'a Subject,
    icon_asset: &'static str,
}

impl<'a> SubjectView<'a> {
    fn of(subject: &'a Subject) -> Self {
        Self {
            subject,
            icon_asset: subject.icon.asset(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LessonSummary {
    number: u32,
    title: String,
    lesson_id: LessonId,
    completed: bool,
    score: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BranchView<'a> {
    subject: SubjectType,
    branch: &'a Branch,
    lessons: Vec<LessonSummary>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LessonView {
    lesson_id: LessonId,
    subject: SubjectType,
    icon_asset: &'static str,
    branch_id: String,
    branch_name: String,
    lesson_number: u32,
    content: LessonContent,
    quiz: Option<QuizView>,
}

impl LessonView {
    fn of(lesson: &ActiveLesson) -> Self {
        Self {
            lesson_id: lesson.lesson_id.clone(),
            subject: lesson.subject,
            icon_asset: lesson.subject.icon().asset(),
            branch_id: lesson.branch.id.clone(),
            branch_name: lesson.branch.name.clone(),
            lesson_number: lesson.lesson_number,
            content: lesson.content.clone(),
            quiz: lesson.quiz.as_ref().map(|q| QuizView::of(&lesson.lesson_id, q)),
        }
    }
}

#[derive(Deserialize)]
struct AnswerRequest {
    option: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnswerResponse {
    accepted: bool,
    quiz: QuizView,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Finished {
    score_percent: u32,
    recorded: bool,
    xp_awarded: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NextResponse {
    quiz: QuizView,
    finished: Option<Finished>,
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    username: Option<String>,
}

fn lookup_subject(subject: &str) -> Result<&'static Subject, ApiError> {
    SubjectType::parse(subject)
        .and_then(find_subject)
        .ok_or_else(|| AppError::NotFound(format!("subject '{}'", subject)).into())
}

async fn list_subjects() -> impl IntoResponse {
    Json(catalog().iter().map(SubjectView::of).collect::<Vec<_>>())
}

async fn get_subject(Path(subject): Path<String>) -> Result<impl IntoResponse, ApiError> {
    let subject = lookup_subject(&subject)?;
    Ok(Json(SubjectView::of(subject)))
}

async fn get_branch(
    State(state): State<ApiState>,
    Path((subject, branch_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let (subject, branch) = resolve_branch(&subject, &branch_id)?;
    let app = state.app.lock().await;
    let progress = app.store.progress();

    let lessons = lesson_outline(branch)
        .into_iter()
        .map(|entry| LessonSummary {
            number: entry.number,
            title: entry.title,
            completed: progress.is_completed(&entry.lesson_id),
            score: progress.score_for(&entry.lesson_id),
            lesson_id: entry.lesson_id,
        })
        .collect();

    Ok(Json(BranchView {
        subject: subject.id,
        branch,
        lessons,
    }))
}

async fn open_lesson(
    State(state): State<ApiState>,
    Path((subject, branch_id, lesson_number)): Path<(String, String, u32)>,
) -> Result<impl IntoResponse, ApiError> {
    let (subject, branch) = resolve(&subject, &branch_id, lesson_number)?;

    // Generation can take seconds; don't hold the lock across it.
    let (ticket, generator) = {
        let mut app = state.app.lock().await;
        (app.begin_open(), app.generator.clone())
    };
    let lesson = ActiveLesson::generate(&generator, subject, branch, lesson_number).await;

    let mut app = state.app.lock().await;
    let opened = app.open_lesson(ticket, lesson).ok_or(AppError::Superseded)?;
    Ok(Json(LessonView::of(opened)))
}

async fn get_quiz(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let app = state.app.lock().await;
    Ok(Json(app.quiz_view()?))
}

async fn answer(
    State(state): State<ApiState>,
    Json(payload): Json<AnswerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    debug!("Answer option {}", payload.option);
    let mut app = state.app.lock().await;
    let accepted = app.select_answer(payload.option)?;
    Ok(Json(AnswerResponse {
        accepted,
        quiz: app.quiz_view()?,
    }))
}

async fn next_question(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let mut app = state.app.lock().await;
    let finished = app.next_question().await?.map(|f| Finished {
        score_percent: f.score_percent,
        recorded: f.outcome != CompletionOutcome::NoUser,
        xp_awarded: matches!(f.outcome, CompletionOutcome::FirstCompletion { .. }),
    });
    Ok(Json(NextResponse {
        quiz: app.quiz_view()?,
        finished,
    }))
}

async fn retry(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let mut app = state.app.lock().await;
    app.retry_quiz()?;
    Ok(Json(app.quiz_view()?))
}

async fn login(
    State(state): State<ApiState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<User>, ApiError> {
    let user = User::sign_in(&payload.email, payload.username.as_deref());
    let mut app = state.app.lock().await;
    let user = app.store.login(user).await?;
    Ok(Json(user.clone()))
}

async fn logout(State(state): State<ApiState>) -> Result<StatusCode, ApiError> {
    let mut app = state.app.lock().await;
    app.store.logout().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn me(State(state): State<ApiState>) -> Json<Option<User>> {
    let app = state.app.lock().await;
    Json(app.store.user().cloned())
}

async fn progress(State(state): State<ApiState>) -> Json<ProgressData> {
    let app = state.app.lock().await;
    Json(app.store.progress().clone())
}

async fn dashboard(State(state): State<ApiState>) -> Result<Json<DashboardSummary>, ApiError> {
    let app = state.app.lock().await;
    let user = app.store.user().ok_or(AppError::SignedOut)?;
    Ok(Json(summarize(user, app.store.progress())))
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
