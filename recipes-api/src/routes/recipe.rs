//! Recipe REST API Routes
//!
//! | Method | Path            | Success               |
//! |--------|-----------------|-----------------------|
//! | GET    | /recipes        | 200, every recipe     |
//! | POST   | /recipes        | 201, created recipe   |
//! | GET    | /recipes/:id    | 200, one recipe       |
//! | PUT    | /recipes/:id    | 204                   |
//! | DELETE | /recipes/:id    | 204                   |
//!
//! Body rejections are mapped to 400 by taking the `Json` extractor as a
//! `Result`. Error statuses otherwise come from `ApiError`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use recipes_core::{Recipe, RecipeDraft};

use crate::error::ApiResult;
use crate::services::RecipeService;

// ============================================================================
// SHARED STATE
// ============================================================================

/// Shared state for recipe routes.
#[derive(Clone)]
pub struct RecipeState {
    pub service: Arc<RecipeService>,
}

impl RecipeState {
    pub fn new(service: Arc<RecipeService>) -> Self {
        Self { service }
    }
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /recipes - List every recipe
pub async fn list_recipes(State(state): State<Arc<RecipeState>>) -> ApiResult<Json<Vec<Recipe>>> {
    let recipes = state.service.list().await?;
    Ok(Json(recipes))
}

/// GET /recipes/:id - Fetch one recipe
pub async fn get_recipe(
    State(state): State<Arc<RecipeState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Recipe>> {
    let recipe = state.service.get(&id).await?;
    Ok(Json(recipe))
}

/// POST /recipes - Create a recipe
pub async fn create_recipe(
    State(state): State<Arc<RecipeState>>,
    payload: Result<Json<RecipeDraft>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(draft) = payload?;
    let recipe = state.service.create(draft).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

/// PUT /recipes/:id - Replace a recipe's fields
pub async fn update_recipe(
    State(state): State<Arc<RecipeState>>,
    Path(id): Path<String>,
    payload: Result<Json<RecipeDraft>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(draft) = payload?;
    state.service.update(&id, draft).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /recipes/:id - Delete a recipe
pub async fn delete_recipe(
    State(state): State<Arc<RecipeState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the recipe router, to be nested under `/recipes`.
pub fn create_router(service: Arc<RecipeService>) -> Router {
    let state = Arc::new(RecipeState::new(service));

    Router::new()
        .route("/", get(list_recipes).post(create_recipe))
        .route(
            "/:id",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
        .with_state(state)
}
