use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use serde_json::Value;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::get_category,
            questions::{get_all_questions, get_questions_for_category},
        },
        Question,
    },
    server::{app::AppState, error::ApiError},
    settings::QuizSettings,
    telemetry::QUIZ_DRAWS,
};

use super::{success, ApiResponse};

/// `quiz_category.id` value meaning "draw from every category".
const ANY_CATEGORY: i64 = 0;

/// Draw counter label for ids that match no stored category.
const UNKNOWN_CATEGORY: &str = "unknown";

#[derive(Deserialize)]
struct QuizBody {
    quiz_category: QuizCategory,
    // only read when quiz.exclude_previous is on, so any shape is accepted
    #[serde(default)]
    previous_questions: Option<Value>,
}

#[derive(Deserialize)]
struct QuizCategory {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    id: i64,
}

#[derive(Serialize)]
struct QuizDraw {
    question: Option<Question>,
    total_questions: usize,
}

/// Question ids from `previous_questions`; entries that are not ids are skipped.
fn previous_ids(previous: Option<Value>) -> Vec<i64> {
    let Some(Value::Array(items)) = previous else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .collect()
}

/// Picks one candidate uniformly at random.
fn draw<R: Rng + ?Sized>(candidates: Vec<Question>, rng: &mut R) -> Option<Question> {
    if candidates.is_empty() {
        return None;
    }
    let index = rng.random_range(0..candidates.len());
    candidates.into_iter().nth(index)
}

// Every failure on this route, malformed bodies included, answers 404.
async fn next_question(
    State(pool): State<SqlitePool>,
    State(settings): State<QuizSettings>,
    body: Result<Json<QuizBody>, JsonRejection>,
) -> ApiResponse<QuizDraw> {
    let Json(body) = body.map_err(ApiError::not_found)?;
    let category = body.quiz_category.id;

    let mut candidates = if category == ANY_CATEGORY {
        get_all_questions(&pool).await
    } else {
        get_questions_for_category(&pool, category).await
    }
    .map_err(ApiError::not_found)?;

    if settings.exclude_previous {
        let previous = previous_ids(body.previous_questions);
        candidates.retain(|q| !previous.contains(&q.id));
    } else if body
        .previous_questions
        .as_ref()
        .and_then(Value::as_array)
        .is_some_and(|items| !items.is_empty())
    {
        tracing::debug!("Ignoring previous questions, quiz.exclude_previous is off");
    }

    let total_questions = candidates.len();
    let question = draw(candidates, &mut rand::rng());

    let label = match category {
        ANY_CATEGORY => "all".to_owned(),
        id => get_category(&pool, id)
            .await
            .map_err(ApiError::not_found)?
            .map_or_else(|| UNKNOWN_CATEGORY.to_owned(), |c| c.id.to_string()),
    };
    QUIZ_DRAWS.with_label_values(&[label.as_str()]).inc();

    success(QuizDraw {
        question,
        total_questions,
    })
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(next_question))
        .with_state(state)
}
