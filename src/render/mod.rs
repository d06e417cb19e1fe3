// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Export rendering: layout, SVG serialization, PNG rasterization.

pub mod layout;
pub mod raster;
pub mod svg;

pub use layout::{layout_flowchart, EdgeLine, Layout, LayoutError, NodeBox};
pub use raster::{rasterize_png, RasterError, DEFAULT_RASTER_SCALE};
pub use svg::render_svg;

use crate::model::FlowchartDoc;

/// Lay out and serialize a document in one step.
pub fn render_flowchart_svg(doc: &FlowchartDoc, font: &str) -> Result<String, LayoutError> {
    let layout = layout_flowchart(doc)?;
    Ok(render_svg(doc, &layout, font))
}
