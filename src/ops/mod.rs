// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mutation operations for flowchart documents.
//!
//! Operations are applied with optimistic concurrency (revision checks) and
//! produce a minimal delta the caller can use to refresh derived state.
//! Matching is tokenized: node ids only ever match whole identifiers, never
//! substrings of other identifiers or of label text.

use std::collections::HashSet;
use std::fmt;

use crate::format::mermaid::{validate_ident, IdentError};
use crate::model::{Flowchart, FlowchartDoc, NodeDecl, NodeShape, Stmt, StyleDecl};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    AddNode {
        node_id: String,
        label: String,
        shape: NodeShape,
    },
    UpdateNode {
        node_id: String,
        patch: NodePatch,
    },
    SetNodeColor {
        node_id: String,
        color: Option<String>,
    },
    SetNodeFontSize {
        node_id: String,
        font_size: Option<u32>,
    },
    RemoveNode {
        node_id: String,
    },
    RelabelConnection {
        from: String,
        to: String,
        label: Option<String>,
    },
    SetStyle {
        node_id: String,
        style: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePatch {
    pub label: Option<String>,
    pub shape: Option<NodeShape>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub new_rev: u64,
    pub applied: usize,
    pub delta: Delta,
}

/// A document object touched by an op.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocRef {
    Node(String),
    Edge { from: String, to: String },
    Style(String),
}

impl fmt::Display for DocRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(node_id) => write!(f, "node:{node_id}"),
            Self::Edge { from, to } => write!(f, "edge:{from}->{to}"),
            Self::Style(node_id) => write!(f, "style:{node_id}"),
        }
    }
}

/// Minimal delta describing which objects changed as the result of applying
/// ops. Intentionally coarse: added/removed/updated refs only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<DocRef>,
    pub removed: Vec<DocRef>,
    pub updated: Vec<DocRef>,
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: HashSet<DocRef>,
    removed: HashSet<DocRef>,
    updated: HashSet<DocRef>,
}

impl DeltaBuilder {
    fn record_added(&mut self, doc_ref: DocRef) {
        self.removed.remove(&doc_ref);
        self.updated.remove(&doc_ref);
        self.added.insert(doc_ref);
    }

    fn record_removed(&mut self, doc_ref: DocRef) {
        self.added.remove(&doc_ref);
        self.updated.remove(&doc_ref);
        self.removed.insert(doc_ref);
    }

    fn record_updated(&mut self, doc_ref: DocRef) {
        if self.added.contains(&doc_ref) || self.removed.contains(&doc_ref) {
            return;
        }
        self.updated.insert(doc_ref);
    }

    fn finish(self) -> Delta {
        let mut added = self.added.into_iter().collect::<Vec<_>>();
        let mut removed = self.removed.into_iter().collect::<Vec<_>>();
        let mut updated = self.updated.into_iter().collect::<Vec<_>>();

        added.sort();
        removed.sort();
        updated.sort();

        Delta { added, removed, updated }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    Conflict {
        base_rev: u64,
        current_rev: u64,
    },
    NodeAlreadyExists {
        node_id: String,
    },
    NodeNotFound {
        node_id: String,
        closest: Option<String>,
    },
    ConnectionNotFound {
        from: String,
        to: String,
    },
    InvalidNodeId {
        node_id: String,
        reason: IdentError,
    },
    EmptyLabel {
        node_id: String,
    },
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict { base_rev, current_rev } => {
                write!(f, "stale base_rev (base_rev={base_rev}, current_rev={current_rev})")
            }
            Self::NodeAlreadyExists { node_id } => {
                write!(f, "node already exists (id={node_id})")
            }
            Self::NodeNotFound { node_id, closest } => match closest {
                Some(closest) => {
                    write!(f, "node not found (id={node_id}); did you mean '{closest}'?")
                }
                None => write!(f, "node not found (id={node_id})"),
            },
            Self::ConnectionNotFound { from, to } => {
                write!(f, "connection not found ({from} --> {to})")
            }
            Self::InvalidNodeId { node_id, reason } => {
                write!(f, "invalid node id '{node_id}': {reason}")
            }
            Self::EmptyLabel { node_id } => {
                write!(f, "empty label for node '{node_id}'")
            }
        }
    }
}

impl std::error::Error for ApplyError {}

/// Apply `ops` against `flowchart` if `base_rev` still matches its revision.
///
/// All ops apply to a working copy; a failing op leaves the flowchart
/// untouched. On success the revision is bumped exactly once.
pub fn apply_ops(
    flowchart: &mut Flowchart,
    base_rev: u64,
    ops: &[Op],
) -> Result<ApplyResult, ApplyError> {
    let current_rev = flowchart.rev();
    if base_rev != current_rev {
        return Err(ApplyError::Conflict { base_rev, current_rev });
    }

    if ops.is_empty() {
        return Ok(ApplyResult { new_rev: current_rev, applied: 0, delta: Delta::default() });
    }

    let mut doc = flowchart.doc().clone();
    let mut delta = DeltaBuilder::default();

    for op in ops {
        apply_op(&mut doc, op, &mut delta)?;
    }

    flowchart.replace_doc(doc);
    flowchart.bump_rev();

    Ok(ApplyResult {
        new_rev: flowchart.rev(),
        applied: ops.len(),
        delta: delta.finish(),
    })
}

fn apply_op(doc: &mut FlowchartDoc, op: &Op, delta: &mut DeltaBuilder) -> Result<(), ApplyError> {
    match op {
        Op::AddNode { node_id, label, shape } => apply_add_node(doc, node_id, label, *shape, delta),
        Op::UpdateNode { node_id, patch } => apply_update_node(doc, node_id, patch, delta),
        Op::SetNodeColor { node_id, color } => {
            apply_decl_edit(doc, node_id, delta, |decl| decl.set_color(color.clone()))
        }
        Op::SetNodeFontSize { node_id, font_size } => {
            apply_decl_edit(doc, node_id, delta, |decl| decl.set_font_size(*font_size))
        }
        Op::RemoveNode { node_id } => apply_remove_node(doc, node_id, delta),
        Op::RelabelConnection { from, to, label } => {
            apply_relabel_connection(doc, from, to, label.as_deref(), delta)
        }
        Op::SetStyle { node_id, style } => apply_set_style(doc, node_id, style, delta),
    }
}

/// Best fuzzy match among known node ids, for actionable not-found errors.
fn closest_node_id(doc: &FlowchartDoc, needle: &str) -> Option<String> {
    let mut best: Option<(f64, String)> = None;
    for candidate in doc.node_ids() {
        let ratio = rapidfuzz::fuzz::ratio(needle.chars(), candidate.chars());
        if ratio < 60.0 {
            continue;
        }
        if best.as_ref().map_or(true, |(best_ratio, _)| ratio > *best_ratio) {
            best = Some((ratio, candidate));
        }
    }
    best.map(|(_, candidate)| candidate)
}

fn node_not_found(doc: &FlowchartDoc, node_id: &str) -> ApplyError {
    ApplyError::NodeNotFound {
        node_id: node_id.to_owned(),
        closest: closest_node_id(doc, node_id),
    }
}

fn apply_add_node(
    doc: &mut FlowchartDoc,
    node_id: &str,
    label: &str,
    shape: NodeShape,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    validate_ident(node_id).map_err(|reason| ApplyError::InvalidNodeId {
        node_id: node_id.to_owned(),
        reason,
    })?;
    if label.trim().is_empty() {
        return Err(ApplyError::EmptyLabel { node_id: node_id.to_owned() });
    }
    if doc.contains_node(node_id) {
        return Err(ApplyError::NodeAlreadyExists { node_id: node_id.to_owned() });
    }

    let decl = NodeDecl::new_with(node_id, Some(label.trim().to_owned()), Some(shape));

    // Insert directly after the last node declaration statement, scanning
    // from the end; append when the document has none.
    let insert_at = doc
        .stmts()
        .iter()
        .rposition(|stmt| matches!(stmt, Stmt::Node(_)))
        .map(|idx| idx + 1)
        .unwrap_or(doc.stmts().len());
    doc.stmts_mut().insert(insert_at, Stmt::Node(decl));

    delta.record_added(DocRef::Node(node_id.to_owned()));
    Ok(())
}

/// Run `apply` on the node's first declaration (standalone or inline on an
/// edge endpoint). A node that only appears as a bare endpoint gains an
/// inline declaration. Returns false when the document never mentions the id.
fn update_first_decl(
    doc: &mut FlowchartDoc,
    node_id: &str,
    mut apply: impl FnMut(&mut NodeDecl),
) -> bool {
    for stmt in doc.stmts_mut().iter_mut() {
        match stmt {
            Stmt::Node(decl) if decl.id() == node_id => {
                apply(decl);
                return true;
            }
            Stmt::Edge(edge) => {
                if edge.from().id() == node_id && edge.from().decl().is_some() {
                    if let Some(decl) = edge.from_mut().decl_mut() {
                        apply(decl);
                    }
                    return true;
                }
                for segment in edge.segments_mut() {
                    if segment.to().id() == node_id && segment.to().decl().is_some() {
                        if let Some(decl) = segment.to_mut().decl_mut() {
                            apply(decl);
                        }
                        return true;
                    }
                }
            }
            _ => {}
        }
    }

    for stmt in doc.stmts_mut().iter_mut() {
        let Stmt::Edge(edge) = stmt else {
            continue;
        };
        if edge.from().id() == node_id {
            let mut decl = NodeDecl::new(node_id);
            apply(&mut decl);
            edge.from_mut().set_decl(Some(decl));
            return true;
        }
        for segment in edge.segments_mut() {
            if segment.to().id() == node_id {
                let mut decl = NodeDecl::new(node_id);
                apply(&mut decl);
                segment.to_mut().set_decl(Some(decl));
                return true;
            }
        }
    }

    false
}

fn apply_update_node(
    doc: &mut FlowchartDoc,
    node_id: &str,
    patch: &NodePatch,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    if patch.label.as_deref().is_some_and(|label| label.trim().is_empty()) {
        return Err(ApplyError::EmptyLabel { node_id: node_id.to_owned() });
    }

    let updated = update_first_decl(doc, node_id, |decl| {
        if let Some(label) = &patch.label {
            decl.set_label(Some(label.trim().to_owned()));
        }
        if let Some(shape) = patch.shape {
            decl.set_shape(Some(shape));
        }
    });
    if !updated {
        return Err(node_not_found(doc, node_id));
    }

    delta.record_updated(DocRef::Node(node_id.to_owned()));
    Ok(())
}

fn apply_decl_edit(
    doc: &mut FlowchartDoc,
    node_id: &str,
    delta: &mut DeltaBuilder,
    apply: impl FnMut(&mut NodeDecl),
) -> Result<(), ApplyError> {
    if !update_first_decl(doc, node_id, apply) {
        return Err(node_not_found(doc, node_id));
    }
    delta.record_updated(DocRef::Node(node_id.to_owned()));
    Ok(())
}

fn apply_remove_node(
    doc: &mut FlowchartDoc,
    node_id: &str,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    let mut removed_node = false;
    let mut removed_style = false;
    let mut removed_edges: Vec<(String, String)> = Vec::new();

    doc.stmts_mut().retain(|stmt| match stmt {
        Stmt::Node(decl) if decl.id() == node_id => {
            removed_node = true;
            false
        }
        Stmt::Edge(edge) if edge.references(node_id) => {
            let mut prev = edge.from().id().to_owned();
            for segment in edge.segments() {
                removed_edges.push((prev, segment.to().id().to_owned()));
                prev = segment.to().id().to_owned();
            }
            false
        }
        Stmt::Style(style) if style.node_id() == node_id => {
            removed_style = true;
            false
        }
        _ => true,
    });

    if !removed_node && !removed_style && removed_edges.is_empty() {
        return Err(node_not_found(doc, node_id));
    }

    delta.record_removed(DocRef::Node(node_id.to_owned()));
    for (from, to) in removed_edges {
        delta.record_removed(DocRef::Edge { from, to });
    }
    if removed_style {
        delta.record_removed(DocRef::Style(node_id.to_owned()));
    }
    Ok(())
}

fn apply_relabel_connection(
    doc: &mut FlowchartDoc,
    from: &str,
    to: &str,
    label: Option<&str>,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    for stmt in doc.stmts_mut().iter_mut() {
        let Stmt::Edge(edge) = stmt else {
            continue;
        };
        let mut prev = edge.from().id().to_owned();
        for segment in edge.segments_mut() {
            if prev == from && segment.to().id() == to {
                segment.set_label(label.map(str::to_owned));
                segment.set_connector::<String>(None);
                delta.record_updated(DocRef::Edge {
                    from: from.to_owned(),
                    to: to.to_owned(),
                });
                return Ok(());
            }
            prev = segment.to().id().to_owned();
        }
    }

    Err(ApplyError::ConnectionNotFound { from: from.to_owned(), to: to.to_owned() })
}

fn apply_set_style(
    doc: &mut FlowchartDoc,
    node_id: &str,
    style: &str,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    for stmt in doc.stmts_mut().iter_mut() {
        if let Stmt::Style(existing) = stmt {
            if existing.node_id() == node_id {
                existing.set_style(style);
                delta.record_updated(DocRef::Style(node_id.to_owned()));
                return Ok(());
            }
        }
    }

    doc.push_stmt(Stmt::Style(StyleDecl::new(node_id, style)));
    delta.record_added(DocRef::Style(node_id.to_owned()));
    Ok(())
}
