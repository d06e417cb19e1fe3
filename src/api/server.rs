// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::sync::Mutex;

use crate::format::mermaid::{export_flowchart, validate_generated};
use crate::llm::{
    chat_prompt, edit_prompt, generate_prompt, modification_prompt, pseudocode_prompt,
    split_summary, strip_code_fences, summary_prompt, CompletionClient, PromptParts,
};
use crate::model::{Flowchart, FlowchartDoc, NodeShape, Session};
use crate::ops::{apply_ops, ApplyError, NodePatch, Op};
use crate::render::{rasterize_png, render_flowchart_svg, DEFAULT_RASTER_SCALE};
use crate::store::SessionFolder;

use super::types::*;

const DEFAULT_FLOWCHART_NAME: &str = "Generated flowchart";

/// Shared server state: the session behind one lock, plus the optional
/// persistence folder and completion client.
#[derive(Clone)]
pub struct ApiState {
    session: Arc<Mutex<Session>>,
    folder: Option<Arc<SessionFolder>>,
    llm: Option<Arc<CompletionClient>>,
}

impl ApiState {
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            folder: None,
            llm: None,
        }
    }

    pub fn with_folder(mut self, folder: SessionFolder) -> Self {
        self.folder = Some(Arc::new(folder));
        self
    }

    pub fn with_llm(mut self, client: CompletionClient) -> Self {
        self.llm = Some(Arc::new(client));
        self
    }

    pub fn session(&self) -> &Arc<Mutex<Session>> {
        &self.session
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/generate-flowchart", post(generate_flowchart))
        .route("/api/flowchart", get(get_flowchart).put(replace_flowchart))
        .route("/api/flowchart/ops", post(apply_flowchart_ops))
        .route("/api/flowchart/export.svg", get(export_svg))
        .route("/api/flowchart/export.png", get(export_png))
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: message.into() })).into_response()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    Generate,
    Chat,
    Summary,
    Mermaid,
    Pseudocode,
    Modification,
    Edit,
}

fn parse_request_kind(raw: Option<&str>) -> Result<RequestKind, Response> {
    match raw {
        None => Ok(RequestKind::Generate),
        Some("chat") => Ok(RequestKind::Chat),
        Some("summary") => Ok(RequestKind::Summary),
        Some("mermaid") => Ok(RequestKind::Mermaid),
        Some("pseudocode") => Ok(RequestKind::Pseudocode),
        Some("modification") => Ok(RequestKind::Modification),
        Some("edit") => Ok(RequestKind::Edit),
        Some(other) => Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("unknown request type: {other}"),
        )),
    }
}

fn required_prompt(request: &GenerateRequest) -> Result<String, Response> {
    request
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|prompt| !prompt.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "prompt must not be empty"))
}

/// Resolve the markup a request talks about: the body's `currentFlowchart`
/// first, then the session's document.
async fn resolve_current_flowchart(
    state: &ApiState,
    request: &GenerateRequest,
) -> Result<String, Response> {
    if let Some(current) = request
        .current_flowchart
        .as_deref()
        .map(str::trim)
        .filter(|current| !current.is_empty())
    {
        return Ok(current.to_owned());
    }

    let session = state.session.lock().await;
    let Some(flowchart) = session.flowchart() else {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "no flowchart loaded; generate one first or pass currentFlowchart",
        ));
    };
    export_flowchart(flowchart.doc()).map_err(|err| {
        error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("cannot export flowchart: {err}"))
    })
}

fn completion_client(state: &ApiState) -> Result<Arc<CompletionClient>, Response> {
    state.llm.clone().ok_or_else(|| {
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "completion API is not configured (set OPENAI_API_KEY)",
        )
    })
}

async fn complete_or_error(
    client: &CompletionClient,
    parts: &PromptParts,
) -> Result<String, Response> {
    client.complete(parts).await.map_err(|err| {
        eprintln!("flowgpt: completion request failed: {err}");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    })
}

fn persist(state: &ApiState, session: &Session) -> Result<(), Response> {
    let Some(folder) = &state.folder else {
        return Ok(());
    };
    folder.save_session(session).map_err(|err| {
        eprintln!("flowgpt: failed to persist session: {err}");
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to persist session: {err}"),
        )
    })
}

fn apply_config_param(session: &mut Session, config: &GenerationConfigParam) -> Result<(), Response> {
    if let Some(raw_kind) = config.kind.as_deref() {
        let kind = raw_kind.parse().map_err(|_| {
            error_response(StatusCode::BAD_REQUEST, format!("unknown flowchart type: {raw_kind}"))
        })?;
        session.settings_mut().set_kind(kind);
    }
    if let Some(theme) = &config.theme {
        session.settings_mut().set_theme(theme.clone());
    }
    if let Some(font) = &config.font {
        session.settings_mut().set_font(font.clone());
    }
    Ok(())
}

/// Accept a completion's markup into the session, replacing the document.
async fn accept_generated_markup(
    state: &ApiState,
    reply: &str,
    prompt: &str,
) -> Result<String, Response> {
    let markup = strip_code_fences(reply);
    let doc = validate_generated(&markup).map_err(|err| {
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("the model returned an invalid flowchart: {err}"),
        )
    })?;

    let mut session = state.session.lock().await;
    if session.flowchart().is_none() {
        session.set_flowchart(Some(Flowchart::new(DEFAULT_FLOWCHART_NAME, doc)));
    } else if let Some(flowchart) = session.flowchart_mut() {
        flowchart.replace_doc(doc);
        flowchart.bump_rev();
    }
    session.set_last_prompt(Some(prompt));

    let flowchart = session.flowchart().expect("flowchart was just set");
    let canonical = export_flowchart(flowchart.doc()).map_err(|err| {
        error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("cannot export flowchart: {err}"))
    })?;
    persist(state, &session)?;
    Ok(canonical)
}

/// Handler for `POST /api/generate-flowchart`, the generation proxy.
///
/// The `type` field selects the operation; omitting it runs the initial
/// generation. Failures surface as `{error}` with a non-success status.
pub async fn generate_flowchart(
    State(state): State<ApiState>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    let kind = match parse_request_kind(request.kind.as_deref()) {
        Ok(kind) => kind,
        Err(response) => return response,
    };

    let result = match kind {
        RequestKind::Mermaid => handle_mermaid_passthrough(&state, &request).await,
        RequestKind::Chat => handle_chat(&state, &request).await,
        RequestKind::Summary => handle_summary(&state, &request).await,
        RequestKind::Pseudocode => handle_pseudocode(&state, &request).await,
        RequestKind::Generate => handle_generate(&state, &request).await,
        RequestKind::Modification => handle_rewrite(&state, &request, RewriteKind::Modification).await,
        RequestKind::Edit => handle_rewrite(&state, &request, RewriteKind::Edit).await,
    };

    match result {
        Ok(response) => Json(response).into_response(),
        Err(response) => response,
    }
}

async fn handle_mermaid_passthrough(
    state: &ApiState,
    request: &GenerateRequest,
) -> Result<GenerateResponse, Response> {
    let markup = resolve_current_flowchart(state, request).await?;
    Ok(GenerateResponse::Mermaid(MermaidCodeResponse { mermaid_code: markup.trim().to_owned() }))
}

async fn handle_chat(
    state: &ApiState,
    request: &GenerateRequest,
) -> Result<GenerateResponse, Response> {
    let prompt = required_prompt(request)?;
    let current = resolve_current_flowchart(state, request).await?;
    let client = completion_client(state)?;

    let reply = complete_or_error(&client, &chat_prompt(&current, &prompt)).await?;
    Ok(GenerateResponse::Chat(ChatReplyResponse { response: reply }))
}

async fn handle_summary(
    state: &ApiState,
    request: &GenerateRequest,
) -> Result<GenerateResponse, Response> {
    // The original client sends the markup either as `currentFlowchart` or as
    // the prompt itself; accept both.
    let current = match resolve_current_flowchart(state, request).await {
        Ok(current) => current,
        Err(response) => match request.prompt.as_deref().map(str::trim) {
            Some(prompt) if !prompt.is_empty() => prompt.to_owned(),
            _ => return Err(response),
        },
    };
    let client = completion_client(state)?;

    let reply = complete_or_error(&client, &summary_prompt(&current)).await?;
    let split = split_summary(&reply);
    Ok(GenerateResponse::Summary(SummaryResponse {
        summary: split.summary,
        key_points: split.key_points,
    }))
}

async fn handle_pseudocode(
    state: &ApiState,
    request: &GenerateRequest,
) -> Result<GenerateResponse, Response> {
    let current = resolve_current_flowchart(state, request).await?;
    let client = completion_client(state)?;

    let reply = complete_or_error(&client, &pseudocode_prompt(&current)).await?;
    Ok(GenerateResponse::Pseudocode(PseudocodeResponse { pseudocode: reply }))
}

async fn handle_generate(
    state: &ApiState,
    request: &GenerateRequest,
) -> Result<GenerateResponse, Response> {
    let prompt = required_prompt(request)?;
    let client = completion_client(state)?;

    let kind = {
        let mut session = state.session.lock().await;
        if let Some(config) = &request.config {
            apply_config_param(&mut session, config)?;
        }
        session.settings().kind()
    };

    let reply = complete_or_error(&client, &generate_prompt(kind, &prompt)).await?;
    let canonical = accept_generated_markup(state, &reply, &prompt).await?;
    Ok(GenerateResponse::Mermaid(MermaidCodeResponse { mermaid_code: canonical }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RewriteKind {
    Modification,
    Edit,
}

async fn handle_rewrite(
    state: &ApiState,
    request: &GenerateRequest,
    kind: RewriteKind,
) -> Result<GenerateResponse, Response> {
    let prompt = required_prompt(request)?;
    let current = resolve_current_flowchart(state, request).await?;
    let client = completion_client(state)?;

    let parts = match kind {
        RewriteKind::Modification => modification_prompt(&current, &prompt),
        RewriteKind::Edit => edit_prompt(&current, &prompt),
    };
    let reply = complete_or_error(&client, &parts).await?;
    let canonical = accept_generated_markup(state, &reply, &prompt).await?;
    Ok(GenerateResponse::Mermaid(MermaidCodeResponse { mermaid_code: canonical }))
}

fn flowchart_state_response(flowchart: &Flowchart) -> Result<FlowchartStateResponse, Response> {
    let doc = flowchart.doc();
    let mermaid_code = export_flowchart(doc).map_err(|err| {
        error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("cannot export flowchart: {err}"))
    })?;

    Ok(FlowchartStateResponse {
        name: flowchart.name().to_owned(),
        rev: flowchart.rev(),
        direction: doc.direction().as_str().to_owned(),
        mermaid_code,
        nodes: doc
            .nodes()
            .into_iter()
            .map(|record| NodeView {
                id: record.id,
                label: record.label,
                shape: record.shape.as_str().to_owned(),
                color: record.color,
                font_size: record.font_size,
            })
            .collect(),
        connections: doc
            .connections()
            .into_iter()
            .map(|connection| ConnectionView {
                from: connection.from,
                to: connection.to,
                label: connection.label,
            })
            .collect(),
        styles: doc
            .styles()
            .into_iter()
            .map(|style| StyleView { node_id: style.node_id, style: style.style })
            .collect(),
    })
}

/// Handler for `GET /api/flowchart`: the current document plus its extracted records.
pub async fn get_flowchart(State(state): State<ApiState>) -> Response {
    let session = state.session.lock().await;
    let Some(flowchart) = session.flowchart() else {
        return error_response(StatusCode::NOT_FOUND, "no flowchart loaded");
    };
    match flowchart_state_response(flowchart) {
        Ok(response) => Json(response).into_response(),
        Err(response) => response,
    }
}

/// Handler for `PUT /api/flowchart`: replace the document from raw markup.
pub async fn replace_flowchart(
    State(state): State<ApiState>,
    Json(request): Json<ReplaceFlowchartRequest>,
) -> Response {
    let doc: FlowchartDoc = match validate_generated(&request.mermaid_code) {
        Ok(doc) => doc,
        Err(err) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("invalid flowchart markup: {err}"),
            )
        }
    };

    let mut session = state.session.lock().await;
    if session.flowchart().is_none() {
        let name = request.name.as_deref().unwrap_or(DEFAULT_FLOWCHART_NAME);
        session.set_flowchart(Some(Flowchart::new(name, doc)));
    } else if let Some(flowchart) = session.flowchart_mut() {
        flowchart.replace_doc(doc);
        flowchart.bump_rev();
        if let Some(name) = &request.name {
            flowchart.set_name(name.clone());
        }
    }

    if let Err(response) = persist(&state, &session) {
        return response;
    }
    let flowchart = session.flowchart().expect("flowchart was just set");
    match flowchart_state_response(flowchart) {
        Ok(response) => Json(response).into_response(),
        Err(response) => response,
    }
}

fn op_from_param(param: OpParam) -> Result<Op, Response> {
    fn parse_shape(raw: &str) -> Result<NodeShape, Response> {
        raw.parse().map_err(|_| {
            error_response(StatusCode::BAD_REQUEST, format!("unknown node shape: {raw}"))
        })
    }

    Ok(match param {
        OpParam::AddNode { id, label, shape } => Op::AddNode {
            node_id: id,
            label,
            shape: parse_shape(&shape)?,
        },
        OpParam::UpdateNode { id, label, shape } => Op::UpdateNode {
            node_id: id,
            patch: NodePatch {
                label,
                shape: match shape {
                    Some(raw) => Some(parse_shape(&raw)?),
                    None => None,
                },
            },
        },
        OpParam::SetNodeColor { id, color } => Op::SetNodeColor { node_id: id, color },
        OpParam::SetNodeFontSize { id, font_size } => {
            Op::SetNodeFontSize { node_id: id, font_size }
        }
        OpParam::RemoveNode { id } => Op::RemoveNode { node_id: id },
        OpParam::RelabelConnection { from, to, label } => {
            Op::RelabelConnection { from, to, label }
        }
        OpParam::SetStyle { id, style } => Op::SetStyle { node_id: id, style },
    })
}

fn apply_error_status(err: &ApplyError) -> StatusCode {
    match err {
        ApplyError::Conflict { .. } | ApplyError::NodeAlreadyExists { .. } => StatusCode::CONFLICT,
        ApplyError::NodeNotFound { .. } | ApplyError::ConnectionNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        ApplyError::InvalidNodeId { .. } | ApplyError::EmptyLabel { .. } => {
            StatusCode::BAD_REQUEST
        }
    }
}

/// Handler for `POST /api/flowchart/ops`: apply a typed edit batch under the submitted
/// base revision.
pub async fn apply_flowchart_ops(
    State(state): State<ApiState>,
    Json(request): Json<ApplyOpsRequest>,
) -> Response {
    let mut ops = Vec::with_capacity(request.ops.len());
    for param in request.ops {
        match op_from_param(param) {
            Ok(op) => ops.push(op),
            Err(response) => return response,
        }
    }

    let mut session = state.session.lock().await;
    let Some(flowchart) = session.flowchart_mut() else {
        return error_response(StatusCode::NOT_FOUND, "no flowchart loaded");
    };

    let result = match apply_ops(flowchart, request.base_rev, &ops) {
        Ok(result) => result,
        Err(err) => return error_response(apply_error_status(&err), err.to_string()),
    };

    if let Err(response) = persist(&state, &session) {
        return response;
    }

    Json(ApplyOpsResponse {
        rev: result.new_rev,
        applied: result.applied,
        delta: DeltaView {
            added: result.delta.added.iter().map(ToString::to_string).collect(),
            removed: result.delta.removed.iter().map(ToString::to_string).collect(),
            updated: result.delta.updated.iter().map(ToString::to_string).collect(),
        },
    })
    .into_response()
}

async fn rendered_svg(state: &ApiState) -> Result<String, Response> {
    let session = state.session.lock().await;
    let Some(flowchart) = session.flowchart() else {
        return Err(error_response(StatusCode::NOT_FOUND, "no flowchart loaded"));
    };
    render_flowchart_svg(flowchart.doc(), session.settings().font()).map_err(|err| {
        error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("cannot render flowchart: {err}"))
    })
}

/// Handler for `GET /api/flowchart/export.svg`: the document as a vector image.
pub async fn export_svg(State(state): State<ApiState>) -> Response {
    match rendered_svg(&state).await {
        Ok(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        Err(response) => response,
    }
}

/// Handler for `GET /api/flowchart/export.png`: the document rasterized at 2x.
pub async fn export_png(State(state): State<ApiState>) -> Response {
    let svg = match rendered_svg(&state).await {
        Ok(svg) => svg,
        Err(response) => return response,
    };
    match rasterize_png(&svg, DEFAULT_RASTER_SCALE) {
        Ok(png) => ([(header::CONTENT_TYPE, "image/png")], png).into_response(),
        Err(err) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("cannot rasterize flowchart: {err}"),
        ),
    }
}
