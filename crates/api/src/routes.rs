//! HTTP route handlers for the API.

use crate::AppState;
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Agent used when a request does not name one.
pub const DEFAULT_AGENT: &str = "coordinator";

/// Example request shown on the status endpoint.
#[derive(Debug, Serialize)]
pub struct ExampleRequest {
    pub agent: &'static str,
    pub query: &'static str,
}

/// Status response for `GET /`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub available_agents: Vec<&'static str>,
    pub openai_enabled: bool,
    pub endpoints: BTreeMap<&'static str, &'static str>,
    pub example_request: ExampleRequest,
    pub uptime_seconds: u64,
}

/// API status endpoint.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let endpoints = BTreeMap::from([
        ("GET /", "This endpoint - API status"),
        ("GET /agents", "List all agents"),
        ("POST /ask", "Ask an agent a question"),
    ]);

    Json(StatusResponse {
        status: "active",
        message: "Concierge agent API is running",
        available_agents: state.registry.names(),
        openai_enabled: state.openai_enabled(),
        endpoints,
        example_request: ExampleRequest {
            agent: DEFAULT_AGENT,
            query: "Hello, can you help me?",
        },
        uptime_seconds: state.uptime_seconds(),
    })
}

/// Introspection data for one agent.
#[derive(Debug, Serialize)]
pub struct AgentInfo {
    pub description: String,
    pub tools: Vec<String>,
    pub has_sub_agents: bool,
}

#[derive(Debug, Serialize)]
pub struct AgentsResponse {
    pub agents: BTreeMap<&'static str, AgentInfo>,
    pub total_agents: usize,
}

/// List all agents and their descriptions.
pub async fn list_agents(State(state): State<Arc<AppState>>) -> Json<AgentsResponse> {
    let agents: BTreeMap<_, _> = state
        .registry
        .agents()
        .map(|agent| {
            (
                agent.name().as_str(),
                AgentInfo {
                    description: agent.description().to_string(),
                    tools: agent.tools().to_vec(),
                    has_sub_agents: agent.has_delegates(),
                },
            )
        })
        .collect();

    Json(AgentsResponse {
        total_agents: agents.len(),
        agents,
    })
}

/// Ask request body.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

/// Ask response body.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub agent: String,
    pub query: String,
    pub response: String,
    pub timestamp: DateTime<Local>,
    pub openai_used: bool,
}

/// API error response.
#[derive(Debug)]
pub enum ApiError {
    /// Missing, unparseable or incomplete request body (400)
    BadRequest(String),
    /// The named agent is not registered (404)
    AgentNotFound {
        agent: String,
        available: Vec<&'static str>,
    },
    /// Anything unexpected (500)
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    available_agents: Option<Vec<&'static str>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(error) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error,
                    available_agents: None,
                },
            ),
            ApiError::AgentNotFound { agent, available } => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: format!("Agent '{agent}' not found"),
                    available_agents: Some(available),
                },
            ),
            ApiError::Internal(error) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error,
                    available_agents: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Validate a raw `/ask` body into `(agent, query)`.
///
/// An absent, unparseable, non-object or empty-object body counts as "no
/// data"; a missing or empty `query` is reported separately.
pub fn parse_ask(body: &[u8]) -> Result<(String, String), ApiError> {
    let no_data = || ApiError::BadRequest("No data provided".into());

    let fields = match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(fields)) if !fields.is_empty() => fields,
        _ => return Err(no_data()),
    };

    let request: AskRequest = serde_json::from_value(serde_json::Value::Object(fields))
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {e}")))?;

    let query = request
        .query
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No query provided".into()))?;

    let agent = request.agent.unwrap_or_else(|| DEFAULT_AGENT.to_string());

    Ok((agent, query))
}

/// Ask an agent a question.
pub async fn ask(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AskResponse>, ApiError> {
    let (agent_name, query) = parse_ask(&body).inspect_err(|e| {
        debug!(error = ?e, "Rejected ask request");
    })?;

    let agent = state
        .registry
        .lookup(&agent_name)
        .ok_or_else(|| ApiError::AgentNotFound {
            agent: agent_name.clone(),
            available: state.registry.names(),
        })?;

    info!(
        agent = %agent.name(),
        query_preview = %query.chars().take(50).collect::<String>(),
        "Received query"
    );

    let response = agent.respond(&query).await;

    Ok(Json(AskResponse {
        agent: agent_name,
        query,
        response,
        timestamp: Local::now(),
        openai_used: state.openai_enabled(),
    }))
}

/// Turn a handler panic into a 500 with the panic message.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown internal error".to_string()
    };

    error!(error = %message, "Request handler panicked");
    ApiError::Internal(message).into_response()
}
