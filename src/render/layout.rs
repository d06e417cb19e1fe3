// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Rank-based placement for SVG export.
//!
//! Nodes are ranked breadth-first from the roots and placed in
//! first-occurrence order within a rank. Edges run center to center; the
//! arrowhead is clipped against the target box by the SVG marker.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::model::{FlowchartDoc, NodeRecord};

pub const NODE_HEIGHT: i32 = 60;
const MIN_NODE_WIDTH: i32 = 120;
const CHAR_WIDTH: i32 = 8;
const LABEL_PADDING: i32 = 24;
const RANK_GAP: i32 = 70;
const PEER_GAP: i32 = 40;
const MARGIN: i32 = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeBox {
    pub record: NodeRecord,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl NodeBox {
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLine {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub width: i32,
    pub height: i32,
    pub nodes: Vec<NodeBox>,
    pub edges: Vec<EdgeLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    EmptyDocument,
}

impl std::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDocument => f.write_str("cannot lay out a document with no nodes"),
        }
    }
}

impl std::error::Error for LayoutError {}

fn node_width(record: &NodeRecord) -> i32 {
    let label_width = record.label.chars().count() as i32 * CHAR_WIDTH + LABEL_PADDING;
    label_width.max(MIN_NODE_WIDTH)
}

fn assign_ranks(records: &[NodeRecord], doc: &FlowchartDoc) -> Vec<Vec<usize>> {
    let index_of: BTreeMap<&str, usize> = records
        .iter()
        .enumerate()
        .map(|(idx, record)| (record.id.as_str(), idx))
        .collect();

    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    let mut has_incoming: Vec<bool> = vec![false; records.len()];
    for connection in doc.connections() {
        let (Some(&from), Some(&to)) = (
            index_of.get(connection.from.as_str()),
            index_of.get(connection.to.as_str()),
        ) else {
            continue;
        };
        outgoing[from].push(to);
        has_incoming[to] = true;
    }

    let roots: Vec<usize> = {
        let without_incoming: Vec<usize> =
            (0..records.len()).filter(|&idx| !has_incoming[idx]).collect();
        if without_incoming.is_empty() {
            // Pure cycle: anchor the walk at the first declared node.
            vec![0]
        } else {
            without_incoming
        }
    };

    let mut rank_of: Vec<Option<usize>> = vec![None; records.len()];
    let mut queue: VecDeque<usize> = VecDeque::new();
    for root in roots {
        rank_of[root] = Some(0);
        queue.push_back(root);
    }
    while let Some(idx) = queue.pop_front() {
        let next_rank = rank_of[idx].unwrap_or(0) + 1;
        for &next in &outgoing[idx] {
            if rank_of[next].is_none() {
                rank_of[next] = Some(next_rank);
                queue.push_back(next);
            }
        }
    }

    let max_rank = rank_of.iter().flatten().copied().max().unwrap_or(0);
    let unreached_rank = if rank_of.iter().any(|rank| rank.is_none()) {
        max_rank + 1
    } else {
        max_rank
    };

    let mut ranks: Vec<Vec<usize>> = vec![Vec::new(); unreached_rank + 1];
    for (idx, rank) in rank_of.iter().enumerate() {
        ranks[rank.unwrap_or(unreached_rank)].push(idx);
    }
    ranks.retain(|rank| !rank.is_empty());
    ranks
}

pub fn layout_flowchart(doc: &FlowchartDoc) -> Result<Layout, LayoutError> {
    let records = doc.nodes();
    if records.is_empty() {
        return Err(LayoutError::EmptyDocument);
    }

    let mut ranks = assign_ranks(&records, doc);
    if doc.direction().is_reversed() {
        ranks.reverse();
    }

    let vertical = doc.direction().is_vertical();
    let widths: Vec<i32> = records.iter().map(node_width).collect();

    let mut positions: Vec<(i32, i32)> = vec![(0, 0); records.len()];
    let mut extent_cross = 0;
    let mut main_cursor = MARGIN;

    for rank in &ranks {
        let rank_main_size = if vertical {
            NODE_HEIGHT
        } else {
            rank.iter().map(|&idx| widths[idx]).max().unwrap_or(MIN_NODE_WIDTH)
        };

        let mut cross_cursor = MARGIN;
        for &idx in rank {
            if vertical {
                positions[idx] = (cross_cursor, main_cursor);
                cross_cursor += widths[idx] + PEER_GAP;
            } else {
                positions[idx] = (main_cursor, cross_cursor);
                cross_cursor += NODE_HEIGHT + PEER_GAP;
            }
        }
        extent_cross = extent_cross.max(cross_cursor - PEER_GAP);
        main_cursor += rank_main_size + RANK_GAP;
    }
    let extent_main = main_cursor - RANK_GAP;

    let (width, height) = if vertical {
        (extent_cross + MARGIN, extent_main + MARGIN)
    } else {
        (extent_main + MARGIN, extent_cross + MARGIN)
    };

    let nodes: Vec<NodeBox> = records
        .into_iter()
        .zip(positions)
        .zip(widths)
        .map(|((record, (x, y)), width)| NodeBox {
            record,
            x,
            y,
            width,
            height: NODE_HEIGHT,
        })
        .collect();

    let centers: BTreeMap<&str, (i32, i32)> = nodes
        .iter()
        .map(|node| (node.record.id.as_str(), node.center()))
        .collect();
    let mut seen_pairs: BTreeSet<(String, String)> = BTreeSet::new();
    let mut edges = Vec::new();
    for connection in doc.connections() {
        let (Some(&(x1, y1)), Some(&(x2, y2))) = (
            centers.get(connection.from.as_str()),
            centers.get(connection.to.as_str()),
        ) else {
            continue;
        };
        if !seen_pairs.insert((connection.from.clone(), connection.to.clone())) {
            continue;
        }
        edges.push(EdgeLine {
            from: connection.from,
            to: connection.to,
            label: connection.label,
            x1,
            y1,
            x2,
            y2,
        });
    }

    Ok(Layout { width, height, nodes, edges })
}
