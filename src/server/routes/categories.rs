use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::{get_all_categories, get_category},
            questions::get_questions_for_category,
        },
        Question,
    },
    server::{app::AppState, error::ApiError, pagination::paginate},
};

use super::{category_labels, success, ApiResponse, PageQuery};

#[derive(Serialize)]
struct CategoriesList {
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct CategoryQuestions {
    questions: Vec<Question>,
    total_questions: usize,
    current_category: String,
}

async fn list_categories(State(pool): State<SqlitePool>) -> ApiResponse<CategoriesList> {
    let categories = get_all_categories(&pool).await.map_err(ApiError::internal)?;
    success(CategoriesList {
        categories: category_labels(categories),
    })
}

// A missing category is a 400 here, unlike the 404 for a missing question.
async fn questions_by_category(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<CategoryQuestions> {
    let Path(id) = id.map_err(ApiError::not_found)?;
    let page = query.map(|Query(q)| q.page()).unwrap_or_default();

    let category = get_category(&pool, id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::BadRequest(format!("category {id} does not exist")))?;
    let questions = get_questions_for_category(&pool, category.id)
        .await
        .map_err(ApiError::internal)?;

    success(CategoryQuestions {
        total_questions: questions.len(),
        questions: paginate(page, &questions).to_vec(),
        current_category: category.kind,
    })
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/{id}/questions", get(questions_by_category))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::db::testing::{add_question, memory_pool};
    use crate::server::routes::testing::{app_with, get, test_app};
    use crate::settings::QuizSettings;

    #[tokio::test]
    async fn lists_seeded_categories() {
        let app = test_app().await;
        let (status, body) = get(&app, "/categories").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["categories"].as_object().unwrap().len(), 6);
        assert_eq!(body["categories"]["3"], "Geography");
    }

    #[tokio::test]
    async fn questions_of_existing_category() {
        let pool = memory_pool().await;
        let lake = add_question(&pool, "What is the largest lake in Africa?", 3).await;
        add_question(&pool, "Who painted the Mona Lisa?", 2).await;
        let app = app_with(pool, QuizSettings::default());

        let (status, body) = get(&app, "/categories/3/questions").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["current_category"], "Geography");
        assert_eq!(body["total_questions"], 1);
        assert_eq!(body["questions"][0]["id"], lake);
        assert_eq!(body["questions"][0]["category"], 3);
    }

    #[tokio::test]
    async fn empty_category_is_not_an_error() {
        let app = test_app().await;
        let (status, body) = get(&app, "/categories/6/questions").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["questions"], json!([]));
        assert_eq!(body["total_questions"], 0);
        assert_eq!(body["current_category"], "Sports");
    }

    #[tokio::test]
    async fn paginates_with_total_of_category() {
        let pool = memory_pool().await;
        for n in 0..13 {
            add_question(&pool, &format!("history {n}"), 4).await;
        }
        let app = app_with(pool, QuizSettings::default());

        let (_, first) = get(&app, "/categories/4/questions").await;
        assert_eq!(first["questions"].as_array().unwrap().len(), 10);
        assert_eq!(first["total_questions"], 13);

        let (_, second) = get(&app, "/categories/4/questions?page=2").await;
        assert_eq!(second["questions"].as_array().unwrap().len(), 3);

        let (status, past_end) = get(&app, "/categories/4/questions?page=9").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(past_end["questions"], json!([]));
    }

    #[tokio::test]
    async fn unknown_category_is_a_bad_request() {
        let app = test_app().await;
        let (status, body) = get(&app, "/categories/1000/questions").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"success": false, "error": 400, "message": "Bad request"})
        );
    }

    #[tokio::test]
    async fn non_numeric_category_is_not_found() {
        let app = test_app().await;
        let (status, _) = get(&app, "/categories/science/questions").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
