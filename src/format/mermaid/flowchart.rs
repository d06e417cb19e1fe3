// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use super::ident::{validate_ident, IdentError};
use crate::model::{
    Direction, EdgeSegment, EdgeStmt, Endpoint, FlowchartDoc, NodeDecl, NodeShape, Stmt, StyleDecl,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowchartParseError {
    MissingHeader,
    InvalidDirection {
        line_no: usize,
        direction: String,
    },
    UnsupportedSyntax {
        line_no: usize,
        line: String,
    },
    InvalidNodeId {
        line_no: usize,
        name: String,
        reason: IdentError,
    },
    InvalidNodeLabelSyntax {
        line_no: usize,
        token: String,
    },
    EmptyNodeLabel {
        line_no: usize,
        token: String,
    },
    EmptyEdgeLabel {
        line_no: usize,
        line: String,
    },
    InvalidStyleLine {
        line_no: usize,
        line: String,
    },
}

impl fmt::Display for FlowchartParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHeader => {
                f.write_str("expected 'graph' or 'flowchart' as the first non-empty line")
            }
            Self::InvalidDirection { line_no, direction } => write!(
                f,
                "invalid flow direction on line {line_no}: {direction} (expected TD/TB/LR/RL/BT)"
            ),
            Self::UnsupportedSyntax { line_no, line } => {
                write!(f, "unsupported markup syntax on line {line_no}: {line}")
            }
            Self::InvalidNodeId { line_no, name, reason } => {
                write!(f, "invalid node id on line {line_no}: {name} ({reason})")
            }
            Self::InvalidNodeLabelSyntax { line_no, token } => write!(
                f,
                "invalid node label syntax on line {line_no}: {token} (expected '<id>[<label>]', '<id>(<label>)', '<id>{{<label>}}', or a double-delimiter variant)"
            ),
            Self::EmptyNodeLabel { line_no, token } => {
                write!(f, "empty node label on line {line_no}: {token}")
            }
            Self::EmptyEdgeLabel { line_no, line } => {
                write!(f, "empty edge label on line {line_no}: {line}")
            }
            Self::InvalidStyleLine { line_no, line } => {
                write!(f, "invalid style line on line {line_no}: {line} (expected 'style <id> <text>')")
            }
        }
    }
}

impl std::error::Error for FlowchartParseError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowchartExportError {
    InvalidNodeLabel { node_id: String, label: String },
    InvalidEdgeLabel { from: String, to: String, label: String },
    InvalidStyleText { node_id: String, style: String },
}

impl fmt::Display for FlowchartExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNodeLabel { node_id, label } => write!(
                f,
                "cannot export label for node '{node_id}': contains unsupported characters: {label:?}"
            ),
            Self::InvalidEdgeLabel { from, to, label } => write!(
                f,
                "cannot export label for edge '{from}' -> '{to}': contains unsupported characters: {label:?}"
            ),
            Self::InvalidStyleText { node_id, style } => write!(
                f,
                "cannot export style for node '{node_id}': contains unsupported characters: {style:?}"
            ),
        }
    }
}

impl std::error::Error for FlowchartExportError {}

/// Why externally generated markup was rejected before reaching the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedMarkupError {
    Parse(FlowchartParseError),
    Empty,
}

impl fmt::Display for GeneratedMarkupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(source) => write!(f, "generated markup does not parse: {source}"),
            Self::Empty => f.write_str("generated markup declares no nodes or edges"),
        }
    }
}

impl std::error::Error for GeneratedMarkupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(source) => Some(source),
            Self::Empty => None,
        }
    }
}

fn is_edge_op_start_char(ch: char) -> bool {
    matches!(ch, '<' | '-' | '=' | '.')
}

fn is_edge_op_char(ch: char) -> bool {
    matches!(ch, '<' | '>' | '-' | '=' | '.' | 'o' | 'x')
}

fn is_probable_edge_operator(op: &str) -> bool {
    op.chars().filter(|ch| matches!(ch, '-' | '=' | '.')).count() >= 2
}

/// Split a line at the first edge operator outside any label delimiters.
///
/// Returns `(lhs, operator, rhs)`; `None` when the line holds no operator.
fn split_once_edge_operator(line: &str) -> Option<(&str, &str, &str)> {
    let mut in_label: Option<char> = None;
    let mut op_start: Option<usize> = None;

    for (idx, ch) in line.char_indices() {
        if let Some(close) = in_label {
            if ch == close {
                in_label = None;
            }
            continue;
        }

        match ch {
            '[' => in_label = Some(']'),
            '(' => in_label = Some(')'),
            '{' => in_label = Some('}'),
            _ => {}
        }

        if in_label.is_some() {
            continue;
        }

        if op_start.is_none() && is_edge_op_start_char(ch) {
            op_start = Some(idx);
            break;
        }
    }

    let start = op_start?;
    let mut end = line.len();
    for (idx, ch) in line[start..].char_indices() {
        if !is_edge_op_char(ch) {
            end = start + idx;
            break;
        }
    }

    let lhs = &line[..start];
    let op = &line[start..end];
    let rhs = &line[end..];
    if lhs.trim().is_empty() || !is_probable_edge_operator(op) {
        return None;
    }

    Some((lhs, op, rhs))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeDirection {
    Forward,
    Reverse,
}

fn edge_direction(op: &str) -> EdgeDirection {
    let has_left = op.contains('<');
    let has_right = op.contains('>');
    if has_left && !has_right {
        EdgeDirection::Reverse
    } else {
        EdgeDirection::Forward
    }
}

fn normalize_edge_operator(op: &str, direction: EdgeDirection) -> String {
    let op = op.trim();
    match direction {
        EdgeDirection::Forward => op.to_owned(),
        EdgeDirection::Reverse => {
            let mut normalized = String::with_capacity(op.len().saturating_add(1));
            for ch in op.chars() {
                if ch != '<' {
                    normalized.push(ch);
                }
            }

            match normalized.chars().last() {
                Some('o' | 'x') => {
                    let decoration = normalized.pop().expect("non-empty after last()");
                    normalized.push('>');
                    normalized.push(decoration);
                }
                _ => normalized.push('>'),
            }

            normalized
        }
    }
}

fn strip_font_size_suffix(text: &str) -> Option<(&str, u32)> {
    let idx = text.rfind(",fontSize:")?;
    let value = text[idx + ",fontSize:".len()..].strip_suffix("px")?;
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let size = value.parse().ok()?;
    Some((&text[..idx], size))
}

fn strip_color_suffix(text: &str) -> Option<(&str, &str)> {
    let idx = text.rfind(",color:")?;
    let value = &text[idx + ",color:".len()..];
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some((&text[..idx], value))
}

/// Peel `,color:#RRGGBB` / `,fontSize:<n>px` suffixes off a label, in either
/// order, each at most once.
fn split_styling_suffixes(inner: &str) -> (&str, Option<String>, Option<u32>) {
    let mut text = inner;
    let mut color: Option<String> = None;
    let mut font_size: Option<u32> = None;

    loop {
        if font_size.is_none() {
            if let Some((rest, size)) = strip_font_size_suffix(text) {
                text = rest;
                font_size = Some(size);
                continue;
            }
        }
        if color.is_none() {
            if let Some((rest, value)) = strip_color_suffix(text) {
                text = rest;
                color = Some(value.to_owned());
                continue;
            }
        }
        break;
    }

    (text, color, font_size)
}

/// Parse a single node token: a bare identifier, or an identifier followed by
/// a delimited label with optional styling suffixes.
fn parse_node_token(token: &str, line_no: usize) -> Result<NodeDecl, FlowchartParseError> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(FlowchartParseError::UnsupportedSyntax {
            line_no,
            line: token.to_owned(),
        });
    }

    let mut open_idx: Option<usize> = None;
    for (idx, ch) in trimmed.char_indices() {
        if matches!(ch, '[' | '(' | '{') {
            open_idx = Some(idx);
            break;
        }
    }

    let Some(open_idx) = open_idx else {
        validate_ident(trimmed).map_err(|reason| FlowchartParseError::InvalidNodeId {
            line_no,
            name: trimmed.to_owned(),
            reason,
        })?;
        return Ok(NodeDecl::new(trimmed));
    };

    let id_raw = trimmed[..open_idx].trim();
    validate_ident(id_raw).map_err(|reason| FlowchartParseError::InvalidNodeId {
        line_no,
        name: id_raw.to_owned(),
        reason,
    })?;

    let rest = &trimmed[open_idx..];
    let shape = NodeShape::from_open_delimiter(rest).ok_or_else(|| {
        FlowchartParseError::InvalidNodeLabelSyntax { line_no, token: trimmed.to_owned() }
    })?;

    let after_open = &rest[shape.open_delimiter().len()..];
    let close = shape.close_delimiter();
    if !after_open.ends_with(close) {
        return Err(FlowchartParseError::InvalidNodeLabelSyntax {
            line_no,
            token: trimmed.to_owned(),
        });
    }
    let inner = &after_open[..after_open.len() - close.len()];

    // Stadium nodes `id([label])` are accepted as rounded rects; export emits
    // the canonical single-paren form.
    let inner = if shape == NodeShape::RoundedRect {
        inner
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(inner)
    } else {
        inner
    };

    let (label_raw, color, font_size) = split_styling_suffixes(inner);
    let label = label_raw.trim();
    if label.is_empty() {
        return Err(FlowchartParseError::EmptyNodeLabel {
            line_no,
            token: trimmed.to_owned(),
        });
    }

    let mut decl = NodeDecl::new_with(id_raw, Some(label.to_owned()), Some(shape));
    decl.set_color(color);
    decl.set_font_size(font_size);
    Ok(decl)
}

fn endpoint_from_decl(decl: NodeDecl) -> Endpoint {
    if decl.label().is_none() && decl.shape().is_none() {
        Endpoint::bare(decl.id().to_owned())
    } else {
        Endpoint::declared(decl)
    }
}

fn is_passthrough_line(trimmed: &str) -> bool {
    trimmed.starts_with("subgraph ")
        || trimmed == "end"
        || trimmed.starts_with("classDef ")
        || trimmed.starts_with("class ")
        || trimmed.starts_with("click ")
        || trimmed.starts_with("linkStyle ")
}

fn parse_style_line(
    trimmed: &str,
    line_no: usize,
) -> Result<StyleDecl, FlowchartParseError> {
    let rest = trimmed
        .strip_prefix("style ")
        .ok_or_else(|| FlowchartParseError::InvalidStyleLine {
            line_no,
            line: trimmed.to_owned(),
        })?
        .trim();

    let mut split_idx: Option<usize> = None;
    for (idx, ch) in rest.char_indices() {
        if ch.is_whitespace() {
            split_idx = Some(idx);
            break;
        }
    }
    let split_idx = split_idx.ok_or_else(|| FlowchartParseError::InvalidStyleLine {
        line_no,
        line: trimmed.to_owned(),
    })?;

    let node_id = rest[..split_idx].trim();
    let style = rest[split_idx..].trim();
    validate_ident(node_id).map_err(|reason| FlowchartParseError::InvalidNodeId {
        line_no,
        name: node_id.to_owned(),
        reason,
    })?;
    if style.is_empty() {
        return Err(FlowchartParseError::InvalidStyleLine {
            line_no,
            line: trimmed.to_owned(),
        });
    }

    Ok(StyleDecl::new(node_id, style))
}

type ParsedHop = (Endpoint, Option<String>, Option<String>, Endpoint);

fn push_hops(doc: &mut FlowchartDoc, hops: Vec<ParsedHop>) {
    let mut stmt: Option<EdgeStmt> = None;
    for (from_ep, label, connector, to_ep) in hops {
        let segment = EdgeSegment::new_with(to_ep, label, connector);
        let continues_chain = stmt
            .as_ref()
            .and_then(|s| s.segments().last())
            .is_some_and(|last| last.to().id() == from_ep.id());
        if continues_chain {
            if let Some(current) = stmt.as_mut() {
                current.push_segment(segment);
            }
        } else {
            if let Some(done) = stmt.take() {
                doc.push_stmt(Stmt::Edge(done));
            }
            stmt = Some(EdgeStmt::new(from_ep, segment));
        }
    }
    if let Some(done) = stmt {
        doc.push_stmt(Stmt::Edge(done));
    }
}

/// Parse the supported flowchart markup subset into a typed document.
///
/// Supported:
/// - `graph`/`flowchart` header with optional direction (`TD`/`TB`/`LR`/`RL`/`BT`)
/// - comment lines starting with `%%` (preserved)
/// - node declarations: `<id>`, `<id>[<label>]`, `<id>(<label>)`, `<id>{<label>}`,
///   `<id>((<label>))`, `<id>{{<label>}}`, `<id>[/<label>/]`, plus optional
///   `,color:#RRGGBB` / `,fontSize:<n>px` suffixes inside the delimiters
/// - edges with the `-->` operator family, `|label|` and `-- label -->` labels,
///   and chains `a --> b --> c`
/// - `style <id> <text>` lines
/// - `subgraph`/`end`, `classDef`, `class`, `click` and `linkStyle` lines are
///   preserved verbatim
///
/// Anything else is rejected with a line-numbered error.
pub fn parse_flowchart(input: &str) -> Result<FlowchartDoc, FlowchartParseError> {
    let mut doc = FlowchartDoc::default();
    let mut saw_header = false;

    for (idx, raw_line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = raw_line.trim();

        if !saw_header {
            if trimmed.is_empty() || trimmed.starts_with("%%") {
                continue;
            }

            let mut parts = trimmed.split_whitespace();
            let Some(keyword) = parts.next() else {
                continue;
            };
            if keyword != "graph" && keyword != "flowchart" {
                return Err(FlowchartParseError::MissingHeader);
            }
            if let Some(direction) = parts.next() {
                let Some(parsed) = Direction::from_token(direction) else {
                    return Err(FlowchartParseError::InvalidDirection {
                        line_no,
                        direction: direction.to_owned(),
                    });
                };
                doc.set_direction(parsed);
                if parts.next().is_some() {
                    return Err(FlowchartParseError::UnsupportedSyntax {
                        line_no,
                        line: trimmed.to_owned(),
                    });
                }
            }
            saw_header = true;
            continue;
        }

        if trimmed.is_empty() {
            doc.push_stmt(Stmt::Blank);
            continue;
        }
        if let Some(comment) = trimmed.strip_prefix("%%") {
            doc.push_stmt(Stmt::Comment(comment.to_owned()));
            continue;
        }
        if trimmed.starts_with("style ") {
            let style = parse_style_line(trimmed, line_no)?;
            doc.push_stmt(Stmt::Style(style));
            continue;
        }
        if is_passthrough_line(trimmed) {
            doc.push_stmt(Stmt::Raw(trimmed.to_owned()));
            continue;
        }

        // Inline label syntax: `<lhs> -- <label> <op> <rhs>`
        if let Some((lhs_raw, op1, rest1)) = split_once_edge_operator(trimmed) {
            if op1 == "--" || op1 == "==" {
                let rest1 = rest1.trim_start();
                if let Some((label_raw, op2, rhs_raw)) = split_once_edge_operator(rest1) {
                    let label = label_raw.trim();
                    if !label.is_empty() {
                        let lhs = endpoint_from_decl(parse_node_token(lhs_raw, line_no)?);
                        let rhs = endpoint_from_decl(parse_node_token(rhs_raw, line_no)?);

                        let direction = edge_direction(op2);
                        let connector = normalize_edge_operator(op2, direction);
                        let connector = (connector != "-->").then_some(connector);
                        let (from_ep, to_ep) = match direction {
                            EdgeDirection::Forward => (lhs, rhs),
                            EdgeDirection::Reverse => (rhs, lhs),
                        };

                        push_hops(
                            &mut doc,
                            vec![(from_ep, Some(label.to_owned()), connector, to_ep)],
                        );
                        continue;
                    }
                }
            }
        }

        // Plain edge (possibly a chain) or a standalone node declaration.
        let Some((first_raw, first_op, tail)) = split_once_edge_operator(trimmed) else {
            let decl = parse_node_token(trimmed, line_no)?;
            doc.push_stmt(Stmt::Node(decl));
            continue;
        };

        let mut current = endpoint_from_decl(parse_node_token(first_raw, line_no)?);
        let mut op = first_op;
        let mut rest = tail;
        let mut hops: Vec<ParsedHop> = Vec::new();

        loop {
            let mut edge_label: Option<String> = None;
            let rhs_and_more = rest.trim_start();
            let rhs_and_more = if let Some(after) = rhs_and_more.strip_prefix('|') {
                let Some(end_idx) = after.find('|') else {
                    return Err(FlowchartParseError::UnsupportedSyntax {
                        line_no,
                        line: trimmed.to_owned(),
                    });
                };
                let label = after[..end_idx].trim();
                if label.is_empty() {
                    return Err(FlowchartParseError::EmptyEdgeLabel {
                        line_no,
                        line: trimmed.to_owned(),
                    });
                }
                edge_label = Some(label.to_owned());
                after[end_idx + 1..].trim_start()
            } else {
                rhs_and_more
            };

            let (rhs_raw, next) = match split_once_edge_operator(rhs_and_more) {
                Some((rhs_raw, next_op, next_rest)) => (rhs_raw, Some((next_op, next_rest))),
                None => (rhs_and_more, None),
            };
            let rhs = endpoint_from_decl(parse_node_token(rhs_raw, line_no)?);

            let direction = edge_direction(op);
            let connector = normalize_edge_operator(op, direction);
            let connector = (connector != "-->").then_some(connector);
            let (from_ep, to_ep) = match direction {
                EdgeDirection::Forward => (current.clone(), rhs.clone()),
                EdgeDirection::Reverse => (rhs.clone(), current.clone()),
            };
            hops.push((from_ep, edge_label, connector, to_ep));

            let Some((next_op, next_rest)) = next else {
                break;
            };
            current = rhs;
            op = next_op;
            rest = next_rest;
        }

        push_hops(&mut doc, hops);
    }

    if !saw_header {
        return Err(FlowchartParseError::MissingHeader);
    }

    Ok(doc)
}

/// Parse one line as a node declaration.
///
/// A trailing edge fragment is ignored; `None` when the line does not start
/// with a labeled node declaration.
pub fn parse_node_line(line: &str) -> Option<NodeDecl> {
    let trimmed = line.trim();
    let token = match split_once_edge_operator(trimmed) {
        Some((lhs, _, _)) => lhs,
        None => trimmed,
    };
    parse_node_token(token, 1).ok().filter(|decl| decl.label().is_some())
}

fn validate_export_node_label(label: &str, close: &str) -> bool {
    !label.contains(close) && !label.contains('\n') && !label.contains('\r')
}

fn validate_export_edge_label(label: &str) -> bool {
    !label.contains('|') && !label.contains('\n') && !label.contains('\r')
}

fn validate_export_edge_operator(op: &str) -> bool {
    !op.is_empty()
        && op.chars().all(is_edge_op_char)
        && is_probable_edge_operator(op)
}

fn write_node(out: &mut String, decl: &NodeDecl) -> Result<(), FlowchartExportError> {
    out.push_str(decl.id());

    let implicit = decl.label().is_none()
        && decl.shape().is_none()
        && decl.color().is_none()
        && decl.font_size().is_none();
    if implicit {
        return Ok(());
    }

    let shape = decl.shape().unwrap_or(NodeShape::Rectangle);
    let label = decl.label().unwrap_or(decl.id());
    if !validate_export_node_label(label, shape.close_delimiter()) {
        return Err(FlowchartExportError::InvalidNodeLabel {
            node_id: decl.id().to_owned(),
            label: label.to_owned(),
        });
    }

    out.push_str(shape.open_delimiter());
    out.push_str(label);
    if let Some(color) = decl.color() {
        out.push_str(",color:");
        out.push_str(color);
    }
    if let Some(font_size) = decl.font_size() {
        out.push_str(",fontSize:");
        let mut buffer = itoa::Buffer::new();
        out.push_str(buffer.format(font_size));
        out.push_str("px");
    }
    out.push_str(shape.close_delimiter());
    Ok(())
}

fn write_endpoint(out: &mut String, endpoint: &Endpoint) -> Result<(), FlowchartExportError> {
    match endpoint.decl() {
        Some(decl) => write_node(out, decl),
        None => {
            out.push_str(endpoint.id());
            Ok(())
        }
    }
}

/// Serialize a document back to markup text.
///
/// Statement order is preserved; node/edge/style lines are emitted in the
/// canonical form (four-space indent, bijective shape delimiters, default
/// `-->` connector unless a non-default one was parsed).
pub fn export_flowchart(doc: &FlowchartDoc) -> Result<String, FlowchartExportError> {
    let mut out = String::new();
    out.push_str("graph ");
    out.push_str(doc.direction().as_str());
    out.push('\n');

    for stmt in doc.stmts() {
        match stmt {
            Stmt::Blank => out.push('\n'),
            Stmt::Comment(text) => {
                out.push_str("    %%");
                out.push_str(text);
                out.push('\n');
            }
            Stmt::Raw(line) => {
                out.push_str("    ");
                out.push_str(line);
                out.push('\n');
            }
            Stmt::Node(decl) => {
                out.push_str("    ");
                write_node(&mut out, decl)?;
                out.push('\n');
            }
            Stmt::Style(style) => {
                if style.style().contains('\n') || style.style().contains('\r') {
                    return Err(FlowchartExportError::InvalidStyleText {
                        node_id: style.node_id().to_owned(),
                        style: style.style().to_owned(),
                    });
                }
                out.push_str("    style ");
                out.push_str(style.node_id());
                out.push(' ');
                out.push_str(style.style());
                out.push('\n');
            }
            Stmt::Edge(edge) => {
                out.push_str("    ");
                write_endpoint(&mut out, edge.from())?;
                let mut prev_id = edge.from().id().to_owned();
                for segment in edge.segments() {
                    out.push(' ');
                    let op = segment
                        .connector()
                        .filter(|op| validate_export_edge_operator(op))
                        .unwrap_or("-->");
                    out.push_str(op);
                    if let Some(label) = segment.label() {
                        if !validate_export_edge_label(label) {
                            return Err(FlowchartExportError::InvalidEdgeLabel {
                                from: prev_id,
                                to: segment.to().id().to_owned(),
                                label: label.to_owned(),
                            });
                        }
                        out.push('|');
                        out.push_str(label);
                        out.push('|');
                    }
                    out.push(' ');
                    write_endpoint(&mut out, segment.to())?;
                    prev_id = segment.to().id().to_owned();
                }
                out.push('\n');
            }
        }
    }

    Ok(out)
}

/// Accept externally generated markup only when it parses and declares at
/// least one node or edge.
pub fn validate_generated(input: &str) -> Result<FlowchartDoc, GeneratedMarkupError> {
    let doc = parse_flowchart(input).map_err(GeneratedMarkupError::Parse)?;
    let has_content = doc
        .stmts()
        .iter()
        .any(|stmt| matches!(stmt, Stmt::Node(_) | Stmt::Edge(_)));
    if !has_content {
        return Err(GeneratedMarkupError::Empty);
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::{
        export_flowchart, parse_flowchart, parse_node_line, validate_generated,
        FlowchartParseError, GeneratedMarkupError,
    };
    use crate::model::{Direction, FlowchartDoc, NodeShape, Stmt};
    use std::collections::BTreeMap;

    type NodeView = BTreeMap<String, (String, String)>;
    type EdgeView = Vec<(String, String, Option<String>)>;

    fn semantic_view(doc: &FlowchartDoc) -> (NodeView, EdgeView) {
        let nodes = doc
            .nodes()
            .into_iter()
            .map(|record| (record.id, (record.label, record.shape.as_str().to_owned())))
            .collect::<BTreeMap<_, _>>();
        let edges = doc
            .connections()
            .into_iter()
            .map(|connection| (connection.from, connection.to, connection.label))
            .collect::<Vec<_>>();
        (nodes, edges)
    }

    #[test]
    fn parses_nodes_and_edges() {
        let input = r#"
            %% comment
            graph TD
            A[Start]
            B[End]
            A --> B
        "#;

        let doc = parse_flowchart(input).expect("parse");
        assert_eq!(doc.direction(), Direction::Td);
        let (nodes, edges) = semantic_view(&doc);

        assert_eq!(
            nodes,
            [
                ("A".to_owned(), ("Start".to_owned(), "rectangle".to_owned())),
                ("B".to_owned(), ("End".to_owned(), "rectangle".to_owned()))
            ]
            .into_iter()
            .collect()
        );
        assert_eq!(edges, vec![("A".to_owned(), "B".to_owned(), None)]);
    }

    #[test]
    fn parses_all_shape_delimiters() {
        let input = "graph TD\n    A[Box]\n    B(Round)\n    C{Gate}\n    D((Ring))\n    E[/Slant/]\n    F{{Hex}}\n";
        let doc = parse_flowchart(input).expect("parse");
        let shapes = doc
            .nodes()
            .into_iter()
            .map(|record| (record.id, record.shape))
            .collect::<BTreeMap<_, _>>();

        assert_eq!(shapes["A"], NodeShape::Rectangle);
        assert_eq!(shapes["B"], NodeShape::RoundedRect);
        assert_eq!(shapes["C"], NodeShape::Diamond);
        assert_eq!(shapes["D"], NodeShape::Circle);
        assert_eq!(shapes["E"], NodeShape::Parallelogram);
        assert_eq!(shapes["F"], NodeShape::Hexagon);
    }

    #[test]
    fn accepts_stadium_nodes_as_rounded_rects() {
        let doc = parse_flowchart("graph TD\n    A([Start]) --> B[Step]\n").expect("parse");
        let nodes = doc.nodes();
        assert_eq!(nodes[0].label, "Start");
        assert_eq!(nodes[0].shape, NodeShape::RoundedRect);

        let out = export_flowchart(&doc).expect("export");
        assert!(out.contains("A(Start)"));
    }

    #[test]
    fn parses_color_and_font_size_suffixes() {
        let doc = parse_flowchart("graph TD\n    A[Start,color:#ff8800,fontSize:18px]\n")
            .expect("parse");
        let nodes = doc.nodes();
        assert_eq!(nodes[0].label, "Start");
        assert_eq!(nodes[0].color.as_deref(), Some("#ff8800"));
        assert_eq!(nodes[0].font_size, Some(18));

        let out = export_flowchart(&doc).expect("export");
        assert!(out.contains("A[Start,color:#ff8800,fontSize:18px]"));
    }

    #[test]
    fn leaves_non_suffix_commas_in_labels() {
        let doc =
            parse_flowchart("graph TD\n    A[Reticulate, then spline]\n").expect("parse");
        assert_eq!(doc.nodes()[0].label, "Reticulate, then spline");
    }

    #[test]
    fn creates_implicit_nodes_from_edges() {
        let doc = parse_flowchart("graph TD\n    A --> B\n    A[Start]\n").expect("parse");
        let (nodes, edges) = semantic_view(&doc);

        assert_eq!(
            nodes,
            [
                ("A".to_owned(), ("Start".to_owned(), "rectangle".to_owned())),
                ("B".to_owned(), ("B".to_owned(), "rectangle".to_owned()))
            ]
            .into_iter()
            .collect()
        );
        assert_eq!(edges.len(), 1);
    }

    #[test]
    fn parses_edge_labels_and_inline_labels() {
        let input = "graph TD\n    A -->|yes| B\n    A -- no --> C\n";
        let doc = parse_flowchart(input).expect("parse");
        let (_, edges) = semantic_view(&doc);

        assert_eq!(
            edges,
            vec![
                ("A".to_owned(), "B".to_owned(), Some("yes".to_owned())),
                ("A".to_owned(), "C".to_owned(), Some("no".to_owned())),
            ]
        );
    }

    #[test]
    fn parses_chains_into_single_statements() {
        let doc = parse_flowchart("graph LR\n    A --> B --> C\n").expect("parse");
        let edge_stmts = doc
            .stmts()
            .iter()
            .filter(|stmt| matches!(stmt, Stmt::Edge(_)))
            .count();
        assert_eq!(edge_stmts, 1);
        assert_eq!(doc.connections().len(), 2);
    }

    #[test]
    fn reverse_edges_are_normalized() {
        let doc = parse_flowchart("graph TD\n    B <-- A\n").expect("parse");
        let connections = doc.connections();
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].from, "A");
        assert_eq!(connections[0].to, "B");
    }

    #[test]
    fn preserves_non_default_connectors() {
        let input = "graph TD\n    A -.-> B\n    B ==> C\n    C --- D\n";
        let doc = parse_flowchart(input).expect("parse");
        let out = export_flowchart(&doc).expect("export");
        assert!(out.contains("A -.-> B"));
        assert!(out.contains("B ==> C"));
        assert!(out.contains("C --- D"));
    }

    #[test]
    fn parses_style_lines_and_preserves_passthrough() {
        let input = "graph TD\n    A[Start]\n    style A fill:#f9f,stroke:#333\n    linkStyle 0 stroke:#ff3\n    %% note\n";
        let doc = parse_flowchart(input).expect("parse");

        let styles = doc.styles();
        assert_eq!(styles.len(), 1);
        assert_eq!(styles[0].node_id, "A");
        assert_eq!(styles[0].style, "fill:#f9f,stroke:#333");

        let out = export_flowchart(&doc).expect("export");
        assert!(out.contains("style A fill:#f9f,stroke:#333"));
        assert!(out.contains("linkStyle 0 stroke:#ff3"));
        assert!(out.contains("%% note"));
    }

    #[test]
    fn semantic_roundtrip_parse_export_parse() {
        let input = r#"
            graph LR
            A([Start]) --> B{Sign up?}
            B -->|Yes| C[Register]
            B -->|No| D[Browse as guest]
            style B fill:#ffcc00
        "#;

        let doc1 = parse_flowchart(input).expect("parse 1");
        let out = export_flowchart(&doc1).expect("export");
        let doc2 = parse_flowchart(&out).expect("parse 2");

        assert_eq!(semantic_view(&doc1), semantic_view(&doc2));
        assert_eq!(doc1.direction(), doc2.direction());
        assert_eq!(doc1.styles(), doc2.styles());
    }

    #[test]
    fn rejects_missing_header() {
        let err = parse_flowchart("A --> B\n").unwrap_err();
        assert_eq!(err, FlowchartParseError::MissingHeader);

        let err = parse_flowchart("").unwrap_err();
        assert_eq!(err, FlowchartParseError::MissingHeader);
    }

    #[test]
    fn rejects_invalid_direction() {
        let err = parse_flowchart("graph XY\nA --> B\n").unwrap_err();
        assert!(matches!(err, FlowchartParseError::InvalidDirection { .. }));
    }

    #[test]
    fn rejects_empty_labels() {
        let err = parse_flowchart("graph TD\n    A[]\n").unwrap_err();
        assert!(matches!(err, FlowchartParseError::EmptyNodeLabel { .. }));

        let err = parse_flowchart("graph TD\n    A -->|| B\n").unwrap_err();
        assert!(matches!(err, FlowchartParseError::EmptyEdgeLabel { .. }));
    }

    #[test]
    fn rejects_unterminated_labels() {
        let err = parse_flowchart("graph TD\n    A[Start\n").unwrap_err();
        assert!(matches!(err, FlowchartParseError::InvalidNodeLabelSyntax { .. }));
    }

    #[test]
    fn parse_node_line_extracts_declarations() {
        let decl = parse_node_line("    B{Decision?}").expect("node line");
        assert_eq!(decl.id(), "B");
        assert_eq!(decl.label(), Some("Decision?"));
        assert_eq!(decl.shape(), Some(NodeShape::Diamond));

        let decl = parse_node_line("A[Start,color:#112233] --> B").expect("node line");
        assert_eq!(decl.id(), "A");
        assert_eq!(decl.color(), Some("#112233"));

        assert!(parse_node_line("graph TD").is_none());
        assert!(parse_node_line("A").is_none());
        assert!(parse_node_line("style A fill:#fff").is_none());
    }

    #[test]
    fn validate_generated_accepts_real_output_and_rejects_empty() {
        let doc = validate_generated("graph TD\n    A[Start] --> B[End]\n").expect("validate");
        assert_eq!(doc.nodes().len(), 2);

        let err = validate_generated("graph TD\n    %% nothing here\n").unwrap_err();
        assert_eq!(err, GeneratedMarkupError::Empty);

        let err = validate_generated("here is your flowchart:\nA --> B").unwrap_err();
        assert!(matches!(err, GeneratedMarkupError::Parse(_)));
    }
}
