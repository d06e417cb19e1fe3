// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! SVG serialization of a laid-out flowchart.
//!
//! Shape geometry matches the interactive renderer the markup targets: a
//! circle spans the longer box side, diamonds/parallelograms/hexagons are
//! polygons with a fifth-of-width skew or indent, rounded rects use rx=10.

use std::collections::BTreeMap;

use super::layout::{EdgeLine, Layout, NodeBox};
use crate::model::{FlowchartDoc, NodeShape};

const DEFAULT_FILL: &str = "#ffffff";
const DEFAULT_STROKE: &str = "#000000";
const EDGE_STROKE: &str = "#333333";
const DEFAULT_FONT_SIZE: u32 = 14;
const EDGE_FONT_SIZE: u32 = 12;

fn push_int(out: &mut String, value: i32) {
    let mut buffer = itoa::Buffer::new();
    out.push_str(buffer.format(value));
}

fn push_attr_int(out: &mut String, name: &str, value: i32) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    push_int(out, value);
    out.push('"');
}

fn push_attr_str(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(value);
    out.push('"');
}

fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn push_point(out: &mut String, x: i32, y: i32) {
    push_int(out, x);
    out.push(',');
    push_int(out, y);
}

/// Mermaid style text is comma-separated CSS declarations; SVG inline style
/// wants semicolons.
fn style_attr_value(style_text: &str) -> String {
    style_text
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(";")
}

fn write_shape(out: &mut String, node: &NodeBox, style_override: Option<&str>) {
    let NodeBox { x, y, width, height, .. } = *node;
    let fill = node.record.color.as_deref().unwrap_or(DEFAULT_FILL);

    match node.record.shape {
        NodeShape::Circle => {
            out.push_str("<circle");
            push_attr_int(out, "cx", x + width / 2);
            push_attr_int(out, "cy", y + height / 2);
            push_attr_int(out, "r", width.max(height) / 2);
        }
        NodeShape::Diamond => {
            out.push_str("<polygon points=\"");
            push_point(out, x + width / 2, y);
            out.push(' ');
            push_point(out, x + width, y + height / 2);
            out.push(' ');
            push_point(out, x + width / 2, y + height);
            out.push(' ');
            push_point(out, x, y + height / 2);
            out.push('"');
        }
        NodeShape::Parallelogram => {
            let skew = width / 5;
            out.push_str("<polygon points=\"");
            push_point(out, x + skew, y);
            out.push(' ');
            push_point(out, x + width, y);
            out.push(' ');
            push_point(out, x + width - skew, y + height);
            out.push(' ');
            push_point(out, x, y + height);
            out.push('"');
        }
        NodeShape::Hexagon => {
            let indent = width / 5;
            out.push_str("<polygon points=\"");
            push_point(out, x + indent, y);
            out.push(' ');
            push_point(out, x + width - indent, y);
            out.push(' ');
            push_point(out, x + width, y + height / 2);
            out.push(' ');
            push_point(out, x + width - indent, y + height);
            out.push(' ');
            push_point(out, x + indent, y + height);
            out.push(' ');
            push_point(out, x, y + height / 2);
            out.push('"');
        }
        NodeShape::RoundedRect | NodeShape::Rectangle => {
            out.push_str("<rect");
            push_attr_int(out, "x", x);
            push_attr_int(out, "y", y);
            push_attr_int(out, "width", width);
            push_attr_int(out, "height", height);
            if node.record.shape == NodeShape::RoundedRect {
                push_attr_int(out, "rx", 10);
                push_attr_int(out, "ry", 10);
            }
        }
    }

    push_attr_str(out, "fill", fill);
    push_attr_str(out, "stroke", DEFAULT_STROKE);
    push_attr_str(out, "stroke-width", "2");
    if let Some(style) = style_override {
        push_attr_str(out, "style", &xml_escape(&style_attr_value(style)));
    }
    out.push_str("/>");
}

fn write_edge(out: &mut String, edge: &EdgeLine, font: &str) {
    let EdgeLine { x1, y1, x2, y2, .. } = *edge;

    out.push_str("<line");
    push_attr_int(out, "x1", x1);
    push_attr_int(out, "y1", y1);
    push_attr_int(out, "x2", x2);
    push_attr_int(out, "y2", y2);
    push_attr_str(out, "stroke", EDGE_STROKE);
    push_attr_str(out, "stroke-width", "2");
    push_attr_str(out, "marker-end", "url(#arrowhead)");
    out.push_str("/>");

    if let Some(label) = &edge.label {
        out.push_str("<text");
        push_attr_int(out, "x", (x1 + x2) / 2);
        push_attr_int(out, "y", (y1 + y2) / 2 - 6);
        push_attr_str(out, "text-anchor", "middle");
        push_attr_str(out, "fill", EDGE_STROKE);
        push_attr_str(out, "font-family", font);
        out.push_str(" font-size=\"");
        push_int(out, EDGE_FONT_SIZE as i32);
        out.push_str("\">");
        out.push_str(&xml_escape(label));
        out.push_str("</text>");
    }
}

fn write_node(out: &mut String, node: &NodeBox, font: &str, style_override: Option<&str>) {
    out.push_str("<g");
    push_attr_str(out, "id", &xml_escape(&node.record.id));
    push_attr_str(out, "class", "node");
    out.push('>');

    write_shape(out, node, style_override);

    let (cx, cy) = node.center();
    let font_size = node.record.font_size.unwrap_or(DEFAULT_FONT_SIZE);
    out.push_str("<text");
    push_attr_int(out, "x", cx);
    push_attr_int(out, "y", cy);
    push_attr_str(out, "text-anchor", "middle");
    push_attr_str(out, "dominant-baseline", "middle");
    push_attr_str(out, "fill", DEFAULT_STROKE);
    push_attr_str(out, "font-family", font);
    out.push_str(" font-size=\"");
    push_int(out, font_size as i32);
    out.push_str("\">");
    out.push_str(&xml_escape(&node.record.label));
    out.push_str("</text></g>");
}

/// Serialize a laid-out document to a standalone SVG string.
///
/// Edges are drawn under the nodes; `style` lines from the document override
/// the shape presentation of their node.
pub fn render_svg(doc: &FlowchartDoc, layout: &Layout, font: &str) -> String {
    let styles: BTreeMap<String, String> = doc
        .styles()
        .into_iter()
        .map(|record| (record.node_id, record.style))
        .collect();

    let mut out = String::new();
    out.push_str("<svg xmlns=\"http://www.w3.org/2000/svg\"");
    push_attr_int(&mut out, "width", layout.width);
    push_attr_int(&mut out, "height", layout.height);
    out.push_str(" viewBox=\"0 0 ");
    push_int(&mut out, layout.width);
    out.push(' ');
    push_int(&mut out, layout.height);
    out.push_str("\">");

    out.push_str(
        "<defs><marker id=\"arrowhead\" markerWidth=\"10\" markerHeight=\"10\" refX=\"28\" \
         refY=\"5\" orient=\"auto\" markerUnits=\"userSpaceOnUse\">\
         <path d=\"M0,0 L10,5 L0,10 z\" fill=\"#333333\"/></marker></defs>",
    );

    for edge in &layout.edges {
        write_edge(&mut out, edge, font);
    }
    for node in &layout.nodes {
        write_node(&mut out, node, font, styles.get(&node.record.id).map(String::as_str));
    }

    out.push_str("</svg>");
    out
}
