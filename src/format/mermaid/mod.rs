// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Parsing and exporting of the Mermaid-ish flowchart markup.

pub mod flowchart;
mod ident;

pub use flowchart::{
    export_flowchart, parse_flowchart, parse_node_line, validate_generated, FlowchartExportError,
    FlowchartParseError, GeneratedMarkupError,
};
pub use ident::{validate_ident, IdentError};
