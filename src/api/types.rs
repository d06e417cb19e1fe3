// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Wire types for the HTTP API. Field names match the original browser
//! client (`mermaidCode`, `keyPoints`, `currentFlowchart`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub config: Option<GenerationConfigParam>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, rename = "currentFlowchart")]
    pub current_flowchart: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfigParam {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub font: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MermaidCodeResponse {
    pub mermaid_code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReplyResponse {
    pub response: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub summary: String,
    pub key_points: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PseudocodeResponse {
    pub pseudocode: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// The per-`type` response shapes of `POST /api/generate-flowchart`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GenerateResponse {
    Mermaid(MermaidCodeResponse),
    Chat(ChatReplyResponse),
    Summary(SummaryResponse),
    Pseudocode(PseudocodeResponse),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    pub id: String,
    pub label: String,
    pub shape: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionView {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleView {
    pub node_id: String,
    pub style: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowchartStateResponse {
    pub name: String,
    pub rev: u64,
    pub direction: String,
    pub mermaid_code: String,
    pub nodes: Vec<NodeView>,
    pub connections: Vec<ConnectionView>,
    pub styles: Vec<StyleView>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceFlowchartRequest {
    pub mermaid_code: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOpsRequest {
    pub base_rev: u64,
    pub ops: Vec<OpParam>,
}

/// One typed edit in an ops batch, tagged by `op`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum OpParam {
    #[serde(rename_all = "camelCase")]
    AddNode { id: String, label: String, shape: String },
    #[serde(rename_all = "camelCase")]
    UpdateNode {
        id: String,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        shape: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    SetNodeColor {
        id: String,
        #[serde(default)]
        color: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    SetNodeFontSize {
        id: String,
        #[serde(default)]
        font_size: Option<u32>,
    },
    #[serde(rename_all = "camelCase")]
    RemoveNode { id: String },
    #[serde(rename_all = "camelCase")]
    RelabelConnection {
        from: String,
        to: String,
        #[serde(default)]
        label: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    SetStyle { id: String, style: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct DeltaView {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub updated: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOpsResponse {
    pub rev: u64,
    pub applied: usize,
    pub delta: DeltaView,
}
