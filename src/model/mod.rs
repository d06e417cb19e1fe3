// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model: the line-oriented flowchart document and session state.

pub mod document;
pub mod flowchart;
pub mod ids;
pub mod session;
pub mod shape;

pub use document::{
    Connection, Direction, EdgeSegment, EdgeStmt, Endpoint, FlowchartDoc, NodeDecl, NodeRecord,
    Stmt, StyleDecl, StyleRecord,
};
pub use flowchart::Flowchart;
pub use ids::{IdError, SessionId};
pub use session::{FlowchartKind, GenerationSettings, Session, UnknownFlowchartKindError};
pub use shape::{NodeShape, UnknownShapeError};
