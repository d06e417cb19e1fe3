// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use super::shape::NodeShape;

/// Flow direction declared on the document header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Td,
    Tb,
    Lr,
    Rl,
    Bt,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Td => "TD",
            Self::Tb => "TB",
            Self::Lr => "LR",
            Self::Rl => "RL",
            Self::Bt => "BT",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "TD" => Some(Self::Td),
            "TB" => Some(Self::Tb),
            "LR" => Some(Self::Lr),
            "RL" => Some(Self::Rl),
            "BT" => Some(Self::Bt),
            _ => None,
        }
    }

    /// Ranks advance along the vertical axis for TD/TB/BT.
    pub fn is_vertical(&self) -> bool {
        matches!(self, Self::Td | Self::Tb | Self::Bt)
    }

    /// RL and BT lay ranks out against the natural axis direction.
    pub fn is_reversed(&self) -> bool {
        matches!(self, Self::Rl | Self::Bt)
    }
}

/// A node declaration: an identifier with optional label, shape and styling.
///
/// A bare identifier on its own line is a declaration with no label and no
/// shape; both default at extraction time (label = id, shape = rectangle).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDecl {
    id: String,
    label: Option<String>,
    shape: Option<NodeShape>,
    color: Option<String>,
    font_size: Option<u32>,
}

impl NodeDecl {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            shape: None,
            color: None,
            font_size: None,
        }
    }

    pub fn new_with(
        id: impl Into<String>,
        label: Option<String>,
        shape: Option<NodeShape>,
    ) -> Self {
        Self {
            id: id.into(),
            label,
            shape,
            color: None,
            font_size: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn shape(&self) -> Option<NodeShape> {
        self.shape
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn font_size(&self) -> Option<u32> {
        self.font_size
    }

    pub fn set_label<T: Into<String>>(&mut self, label: Option<T>) {
        self.label = label.map(Into::into);
    }

    pub fn set_shape(&mut self, shape: Option<NodeShape>) {
        self.shape = shape;
    }

    pub fn set_color<T: Into<String>>(&mut self, color: Option<T>) {
        self.color = color.map(Into::into);
    }

    pub fn set_font_size(&mut self, font_size: Option<u32>) {
        self.font_size = font_size;
    }
}

/// One end of an edge: a node reference, optionally carrying an inline
/// declaration (`A[Start] --> B`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    id: String,
    decl: Option<NodeDecl>,
}

impl Endpoint {
    pub fn bare(id: impl Into<String>) -> Self {
        Self { id: id.into(), decl: None }
    }

    pub fn declared(decl: NodeDecl) -> Self {
        Self { id: decl.id().to_owned(), decl: Some(decl) }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn decl(&self) -> Option<&NodeDecl> {
        self.decl.as_ref()
    }

    pub fn decl_mut(&mut self) -> Option<&mut NodeDecl> {
        self.decl.as_mut()
    }

    /// Attach or replace the inline declaration. The declaration's id wins so
    /// endpoint and declaration cannot drift apart.
    pub fn set_decl(&mut self, decl: Option<NodeDecl>) {
        if let Some(decl) = &decl {
            self.id = decl.id().to_owned();
        }
        self.decl = decl;
    }
}

/// One hop of an edge statement: `--> |label| <endpoint>`.
///
/// `connector` is `None` for the default `-->`; anything else (`-.->`,
/// `==>`, `---`, ...) is preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeSegment {
    connector: Option<String>,
    label: Option<String>,
    to: Endpoint,
}

impl EdgeSegment {
    pub fn new(to: Endpoint) -> Self {
        Self { connector: None, label: None, to }
    }

    pub fn new_with(to: Endpoint, label: Option<String>, connector: Option<String>) -> Self {
        Self { connector, label, to }
    }

    pub fn connector(&self) -> Option<&str> {
        self.connector.as_deref()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn to(&self) -> &Endpoint {
        &self.to
    }

    pub fn to_mut(&mut self) -> &mut Endpoint {
        &mut self.to
    }

    pub fn set_label<T: Into<String>>(&mut self, label: Option<T>) {
        self.label = label.map(Into::into);
    }

    pub fn set_connector<T: Into<String>>(&mut self, connector: Option<T>) {
        self.connector = connector.map(Into::into);
    }
}

/// An edge statement line: a first endpoint and one or more segments
/// (`A --> B --> C` carries two segments).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeStmt {
    from: Endpoint,
    segments: Vec<EdgeSegment>,
}

impl EdgeStmt {
    pub fn new(from: Endpoint, first: EdgeSegment) -> Self {
        Self { from, segments: vec![first] }
    }

    pub fn from(&self) -> &Endpoint {
        &self.from
    }

    pub fn from_mut(&mut self) -> &mut Endpoint {
        &mut self.from
    }

    pub fn segments(&self) -> &[EdgeSegment] {
        &self.segments
    }

    pub fn segments_mut(&mut self) -> &mut [EdgeSegment] {
        &mut self.segments
    }

    pub fn push_segment(&mut self, segment: EdgeSegment) {
        self.segments.push(segment);
    }

    /// Whether any endpoint of this statement references `node_id`.
    pub fn references(&self, node_id: &str) -> bool {
        self.from.id() == node_id || self.segments.iter().any(|s| s.to().id() == node_id)
    }
}

/// A `style <id> <text>` line. The style text is opaque and passed through
/// verbatim to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDecl {
    node_id: String,
    style: String,
}

impl StyleDecl {
    pub fn new(node_id: impl Into<String>, style: impl Into<String>) -> Self {
        Self { node_id: node_id.into(), style: style.into() }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn set_style(&mut self, style: impl Into<String>) {
        self.style = style.into();
    }
}

/// One statement line of the document.
///
/// `Raw` preserves recognized-but-unmodeled Mermaid lines (`subgraph`/`end`,
/// `classDef`, `class`, `click`, `linkStyle`) verbatim so round-tripping a
/// generated document never drops them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Node(NodeDecl),
    Edge(EdgeStmt),
    Style(StyleDecl),
    Comment(String),
    Blank,
    Raw(String),
}

/// Fully resolved node view: declaration defaults applied, duplicate
/// declarations merged first-wins per field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub id: String,
    pub label: String,
    pub shape: NodeShape,
    pub color: Option<String>,
    pub font_size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRecord {
    pub node_id: String,
    pub style: String,
}

/// An ordered, line-oriented flowchart document.
///
/// Statement order is significant and survives parse/export round trips.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlowchartDoc {
    direction: Direction,
    stmts: Vec<Stmt>,
}

#[derive(Debug, Default)]
struct PartialNode {
    label: Option<String>,
    shape: Option<NodeShape>,
    color: Option<String>,
    font_size: Option<u32>,
}

impl PartialNode {
    fn merge(&mut self, decl: &NodeDecl) {
        if self.label.is_none() {
            self.label = decl.label().map(str::to_owned);
        }
        if self.shape.is_none() {
            self.shape = decl.shape();
        }
        if self.color.is_none() {
            self.color = decl.color().map(str::to_owned);
        }
        if self.font_size.is_none() {
            self.font_size = decl.font_size();
        }
    }
}

impl FlowchartDoc {
    pub fn new(direction: Direction) -> Self {
        Self { direction, stmts: Vec::new() }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn stmts(&self) -> &[Stmt] {
        &self.stmts
    }

    pub fn stmts_mut(&mut self) -> &mut Vec<Stmt> {
        &mut self.stmts
    }

    pub fn push_stmt(&mut self, stmt: Stmt) {
        self.stmts.push(stmt);
    }

    fn visit_node_occurrences(&self, mut visit: impl FnMut(&str, Option<&NodeDecl>)) {
        for stmt in &self.stmts {
            match stmt {
                Stmt::Node(decl) => visit(decl.id(), Some(decl)),
                Stmt::Edge(edge) => {
                    visit(edge.from().id(), edge.from().decl());
                    for segment in edge.segments() {
                        visit(segment.to().id(), segment.to().decl());
                    }
                }
                Stmt::Style(_) | Stmt::Comment(_) | Stmt::Blank | Stmt::Raw(_) => {}
            }
        }
    }

    /// Every node the document mentions, in first-occurrence order.
    ///
    /// Nodes that only appear as bare edge endpoints are included with their
    /// defaults, mirroring implicit node creation in the markup language.
    pub fn nodes(&self) -> Vec<NodeRecord> {
        let mut order: Vec<String> = Vec::new();
        let mut partials: BTreeMap<String, PartialNode> = BTreeMap::new();

        self.visit_node_occurrences(|id, decl| {
            if !partials.contains_key(id) {
                order.push(id.to_owned());
                partials.insert(id.to_owned(), PartialNode::default());
            }
            if let Some(decl) = decl {
                if let Some(partial) = partials.get_mut(id) {
                    partial.merge(decl);
                }
            }
        });

        order
            .into_iter()
            .map(|id| {
                let partial = partials.remove(&id).unwrap_or_default();
                NodeRecord {
                    label: partial.label.unwrap_or_else(|| id.clone()),
                    shape: partial.shape.unwrap_or(NodeShape::Rectangle),
                    color: partial.color,
                    font_size: partial.font_size,
                    id,
                }
            })
            .collect()
    }

    /// Every directed connection, in statement order; chains are flattened.
    pub fn connections(&self) -> Vec<Connection> {
        let mut connections = Vec::new();
        for stmt in &self.stmts {
            let Stmt::Edge(edge) = stmt else {
                continue;
            };
            let mut from = edge.from().id().to_owned();
            for segment in edge.segments() {
                connections.push(Connection {
                    from: from.clone(),
                    to: segment.to().id().to_owned(),
                    label: segment.label().map(str::to_owned),
                });
                from = segment.to().id().to_owned();
            }
        }
        connections
    }

    pub fn styles(&self) -> Vec<StyleRecord> {
        self.stmts
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Style(style) => Some(StyleRecord {
                    node_id: style.node_id().to_owned(),
                    style: style.style().to_owned(),
                }),
                _ => None,
            })
            .collect()
    }

    pub fn contains_node(&self, node_id: &str) -> bool {
        let mut found = false;
        self.visit_node_occurrences(|id, _| {
            if id == node_id {
                found = true;
            }
        });
        found
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes().into_iter().map(|record| record.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Direction, EdgeSegment, EdgeStmt, Endpoint, FlowchartDoc, NodeDecl, Stmt, StyleDecl,
    };
    use crate::model::NodeShape;

    fn sample_doc() -> FlowchartDoc {
        let mut doc = FlowchartDoc::new(Direction::Td);
        doc.push_stmt(Stmt::Node(NodeDecl::new_with(
            "A",
            Some("Start".to_owned()),
            Some(NodeShape::Rectangle),
        )));
        doc.push_stmt(Stmt::Edge(EdgeStmt::new(
            Endpoint::bare("A"),
            EdgeSegment::new_with(
                Endpoint::declared(NodeDecl::new_with(
                    "B",
                    Some("Decide?".to_owned()),
                    Some(NodeShape::Diamond),
                )),
                Some("next".to_owned()),
                None,
            ),
        )));
        doc.push_stmt(Stmt::Style(StyleDecl::new("A", "fill:#f9f")));
        doc
    }

    #[test]
    fn nodes_resolve_defaults_and_inline_declarations() {
        let doc = sample_doc();
        let nodes = doc.nodes();

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].id, "A");
        assert_eq!(nodes[0].label, "Start");
        assert_eq!(nodes[0].shape, NodeShape::Rectangle);
        assert_eq!(nodes[1].id, "B");
        assert_eq!(nodes[1].label, "Decide?");
        assert_eq!(nodes[1].shape, NodeShape::Diamond);
    }

    #[test]
    fn bare_endpoints_become_implicit_nodes() {
        let mut doc = FlowchartDoc::new(Direction::Lr);
        doc.push_stmt(Stmt::Edge(EdgeStmt::new(
            Endpoint::bare("X"),
            EdgeSegment::new(Endpoint::bare("Y")),
        )));

        let nodes = doc.nodes();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].label, "X");
        assert_eq!(nodes[0].shape, NodeShape::Rectangle);
    }

    #[test]
    fn duplicate_declarations_merge_first_wins() {
        let mut doc = FlowchartDoc::new(Direction::Td);
        doc.push_stmt(Stmt::Node(NodeDecl::new_with("A", Some("First".to_owned()), None)));
        doc.push_stmt(Stmt::Node(NodeDecl::new_with(
            "A",
            Some("Second".to_owned()),
            Some(NodeShape::Circle),
        )));

        let nodes = doc.nodes();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].label, "First");
        // The first declaration left the shape open, so the second fills it.
        assert_eq!(nodes[0].shape, NodeShape::Circle);
    }

    #[test]
    fn connections_flatten_chains() {
        let mut doc = FlowchartDoc::new(Direction::Td);
        let mut edge = EdgeStmt::new(Endpoint::bare("A"), EdgeSegment::new(Endpoint::bare("B")));
        edge.push_segment(EdgeSegment::new(Endpoint::bare("C")));
        doc.push_stmt(Stmt::Edge(edge));

        let connections = doc.connections();
        assert_eq!(connections.len(), 2);
        assert_eq!((connections[0].from.as_str(), connections[0].to.as_str()), ("A", "B"));
        assert_eq!((connections[1].from.as_str(), connections[1].to.as_str()), ("B", "C"));
    }

    #[test]
    fn styles_and_contains_node() {
        let doc = sample_doc();
        let styles = doc.styles();
        assert_eq!(styles.len(), 1);
        assert_eq!(styles[0].node_id, "A");
        assert!(doc.contains_node("B"));
        assert!(!doc.contains_node("Z"));
    }
}
