//! HTTP API server.
//!
//! Provides the planning endpoint and CRUD endpoints for saved roadmaps.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::PlanetaryError;
use crate::orchestrator::{Orchestrator, PlanRequest};
use crate::store::{PlanUpdate, SavedPlan};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;
use uuid::Uuid;

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
}

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(&settings)?;
    let state = Arc::new(AppState { orchestrator });

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Planetary API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    Output::kv("Model", &format!("{} @ {}", settings.llm.model, settings.llm.api_base()));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("Plan", "POST   /plan");
    Output::kv("Create Roadmap", "POST   /roadmap");
    Output::kv("List Roadmaps", "GET    /roadmaps");
    Output::kv("Roadmap", "GET|PUT|DELETE /roadmaps/{id}");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/plan", post(plan))
        .route("/roadmap", post(create_roadmap))
        .route("/roadmaps", get(list_roadmaps))
        .route(
            "/roadmaps/{id}",
            get(get_roadmap).put(update_roadmap).delete(delete_roadmap),
        )
        .layer(cors)
        .with_state(state)
}

// === Response Types ===

#[derive(Serialize)]
struct RoadmapListResponse {
    results: usize,
    plans: Vec<SavedPlan>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Map a library error onto an HTTP status.
fn failure(e: PlanetaryError) -> Response {
    let status = match &e {
        PlanetaryError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        PlanetaryError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        warn!("Request failed: {}", e);
    }
    error_response(status, e.to_string())
}

fn parse_id(id: &str) -> Result<Uuid, Response> {
    Uuid::parse_str(id)
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, format!("Invalid roadmap id: {}", id)))
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn plan(State(state): State<Arc<AppState>>, Json(req): Json<PlanRequest>) -> Response {
    match state.orchestrator.handle(&req).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => failure(e),
    }
}

async fn create_roadmap(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PlanRequest>,
) -> Response {
    if req.query.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "query must not be empty");
    }

    // A plan without tasks is a planner failure here, not a client error.
    match state.orchestrator.create_roadmap(&req.query).await {
        Ok(saved) => (StatusCode::CREATED, Json(saved)).into_response(),
        Err(e) => {
            warn!("Roadmap generation failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn list_roadmaps(State(state): State<Arc<AppState>>) -> Response {
    match state.orchestrator.store().list().await {
        Ok(plans) => Json(RoadmapListResponse {
            results: plans.len(),
            plans,
        })
        .into_response(),
        Err(e) => failure(e),
    }
}

async fn get_roadmap(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.orchestrator.store().get(id).await {
        Ok(plan) => Json(plan).into_response(),
        Err(e) => failure(e),
    }
}

async fn update_roadmap(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<PlanUpdate>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.orchestrator.store().update(id, update).await {
        Ok(plan) => Json(plan).into_response(),
        Err(e) => failure(e),
    }
}

async fn delete_roadmap(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.orchestrator.store().delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => failure(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Planner;
    use crate::llm::mock::ScriptedModel;
    use crate::orchestrator::default_tools;
    use crate::search::mock::RecordingSearch;
    use crate::store::MemoryPlanStore;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    const FINAL: &str = r#"{"tool_calling_required": false, "final_answer": {"title": "Learn Rust", "description": "Six weeks", "task_list": [{"task_title": "Ownership", "task_description": "Borrowing rules", "sub_tasks": ["Read chapter 4"]}]}}"#;

    fn state(replies: &[&str]) -> Arc<AppState> {
        let model = Arc::new(ScriptedModel::new(replies.iter().copied()));
        let search = Arc::new(RecordingSearch::returning("results"));
        let planner = Planner::new(model, Arc::new(default_tools(search, &Settings::default())));
        Arc::new(AppState {
            orchestrator: Orchestrator::with_components(planner, Arc::new(MemoryPlanStore::new())),
        })
    }

    fn request(query: &str) -> Json<PlanRequest> {
        Json(PlanRequest {
            query: query.to_string(),
        })
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_plan_returns_final_answer() {
        let resp = plan(State(state(&[FINAL])), request("learn rust")).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        assert_eq!(body["final_answer"]["title"], "Learn Rust");
        assert_eq!(body["final_answer"]["task_list"][0]["sub_tasks"][0], "Read chapter 4");
    }

    #[tokio::test]
    async fn test_plan_model_failure_is_server_error() {
        let resp = plan(State(state(&[])), request("learn rust")).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_roadmap_lifecycle() {
        let state = state(&[FINAL]);

        let resp = create_roadmap(State(state.clone()), request("learn rust")).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = body_json(resp).await;
        let id = created["id"].as_str().unwrap().to_string();

        let listed = body_json(list_roadmaps(State(state.clone())).await).await;
        assert_eq!(listed["results"], 1);
        assert_eq!(listed["plans"][0]["id"], id.as_str());

        let update: PlanUpdate = serde_json::from_value(serde_json::json!({
            "title": "Learn Rust properly",
            "tasks_list": [{"title": "Ownership", "completed": true}]
        }))
        .unwrap();
        let resp = update_roadmap(State(state.clone()), Path(id.clone()), Json(update)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let updated = body_json(resp).await;
        assert_eq!(updated["title"], "Learn Rust properly");
        assert_eq!(updated["tasks_list"][0]["completed"], true);

        let resp = delete_roadmap(State(state.clone()), Path(id.clone())).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = get_roadmap(State(state), Path(id)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_roadmap_rejects_empty_query() {
        let resp = create_roadmap(State(state(&[FINAL])), request("  ")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_roadmap_without_tasks_is_server_error() {
        let resp = create_roadmap(
            State(state(&[r#"{"tool_calling_required": false}"#])),
            request("learn rust"),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "Invalid input: planner did not return a valid roadmap");
    }

    #[tokio::test]
    async fn test_bad_id_is_bad_request() {
        let resp = get_roadmap(State(state(&[])), Path("not-a-uuid".to_string())).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_routes_dispatch_through_router() {
        let app = router(state(&[FINAL, FINAL]));

        let resp = send(&app, Method::GET, "/health", None).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = send(&app, Method::POST, "/plan", Some(serde_json::json!({"query": "learn rust"}))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["final_answer"]["title"], "Learn Rust");

        let resp = send(&app, Method::POST, "/roadmap", Some(serde_json::json!({"query": "learn rust"}))).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let id = body_json(resp).await["id"].as_str().unwrap().to_string();
        let path = format!("/roadmaps/{}", id);

        let listed = body_json(send(&app, Method::GET, "/roadmaps", None).await).await;
        assert_eq!(listed["results"], 1);

        let resp = send(&app, Method::GET, &path, None).await;
        assert_eq!(body_json(resp).await["id"], id.as_str());

        let resp = send(
            &app,
            Method::PUT,
            &path,
            Some(serde_json::json!({"title": "Renamed"})),
        )
        .await;
        assert_eq!(body_json(resp).await["title"], "Renamed");

        let resp = send(&app, Method::DELETE, &path, None).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = send(&app, Method::GET, &path, None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = send(&app, Method::POST, "/roadmaps", None).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_health() {
        let resp = health().await.into_response();
        assert_eq!(body_json(resp).await["status"], "ok");
    }
}
