use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::get_all_categories, questions},
        NewQuestion, Question,
    },
    server::{app::AppState, error::ApiError, pagination::Page},
    telemetry::{QUESTIONS_CREATED, QUESTIONS_DELETED},
};

use super::{category_labels, success, ApiResponse, PageQuery};

// Nothing here is validated: a missing field reaches the store as NULL.
#[derive(Deserialize)]
struct NewQuestionBody {
    question: Option<String>,
    answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    difficulty: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    category: Option<i64>,
}

impl From<NewQuestionBody> for NewQuestion {
    fn from(body: NewQuestionBody) -> Self {
        NewQuestion {
            question: body.question,
            answer: body.answer,
            category: body.category,
            difficulty: body.difficulty,
        }
    }
}

#[derive(Deserialize)]
struct SearchBody {
    #[serde(rename = "searchTerm", default)]
    search_term: Option<String>,
}

#[derive(Serialize)]
struct QuestionsPage {
    questions: Vec<Question>,
    total_questions: i64,
    categories: BTreeMap<i64, String>,
    current_category: Option<String>,
}

#[derive(Serialize)]
struct Deleted {
    deleted: i64,
}

#[derive(Serialize)]
struct Created {
    created: i64,
    questions: Vec<Question>,
    total_questions: i64,
}

#[derive(Serialize)]
struct SearchResults {
    questions: Vec<Question>,
    total_questions: usize,
    current_category: Option<String>,
}

async fn list_questions(
    State(pool): State<SqlitePool>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<QuestionsPage> {
    let page = query.map(|Query(q)| q.page()).unwrap_or_default();
    let Some(offset) = page.offset() else {
        return Err(ApiError::NotFound(format!("page {page} does not exist")));
    };

    let questions = questions::get_questions_page(&pool, page.limit(), offset)
        .await
        .map_err(ApiError::unprocessable)?;
    if questions.is_empty() {
        return Err(ApiError::NotFound(format!("page {page} has no questions")));
    }
    let total_questions = questions::count_questions(&pool)
        .await
        .map_err(ApiError::unprocessable)?;
    let categories = get_all_categories(&pool)
        .await
        .map_err(ApiError::unprocessable)?;

    success(QuestionsPage {
        questions,
        total_questions,
        categories: category_labels(categories),
        current_category: None,
    })
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Deleted> {
    let Path(id) = id.map_err(ApiError::not_found)?;
    let not_found = || ApiError::NotFound(format!("question {id} does not exist"));

    questions::get_question(&pool, id)
        .await
        .map_err(ApiError::unprocessable)?
        .ok_or_else(not_found)?;
    // a concurrent delete can still win between the lookup and this statement
    if !questions::delete_question(&pool, id)
        .await
        .map_err(ApiError::unprocessable)?
    {
        return Err(not_found());
    }

    QUESTIONS_DELETED.inc();
    tracing::info!("Deleted question {id}");
    success(Deleted { deleted: id })
}

async fn create_question(
    State(pool): State<SqlitePool>,
    body: Result<Json<NewQuestionBody>, JsonRejection>,
) -> ApiResponse<Created> {
    let Json(body) = body.map_err(ApiError::unprocessable)?;

    let created = questions::create_question(&pool, &body.into())
        .await
        .map_err(ApiError::unprocessable)?;
    let first_page = Page::first();
    let questions = questions::get_questions_page(
        &pool,
        first_page.limit(),
        first_page.offset().unwrap_or_default(),
    )
    .await
    .map_err(ApiError::unprocessable)?;
    let total_questions = questions::count_questions(&pool)
        .await
        .map_err(ApiError::unprocessable)?;

    QUESTIONS_CREATED.inc();
    tracing::info!("Created question {created}");
    success(Created {
        created,
        questions,
        total_questions,
    })
}

async fn search_questions(
    State(pool): State<SqlitePool>,
    body: Result<Json<SearchBody>, JsonRejection>,
) -> ApiResponse<SearchResults> {
    let Json(body) = body.map_err(ApiError::unprocessable)?;
    let term = body.search_term.unwrap_or_default();

    let questions = questions::search_questions(&pool, &term)
        .await
        .map_err(ApiError::unprocessable)?;
    tracing::debug!("Search for {term:?} matched {} questions", questions.len());

    success(SearchResults {
        total_questions: questions.len(),
        questions,
        current_category: None,
    })
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route("/questions/{id}", delete(delete_question))
        .route("/search", post(search_questions))
        .with_state(state)
}
