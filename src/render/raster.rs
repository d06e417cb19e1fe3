// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! PNG rasterization of exported SVG.

use std::fmt;
use std::sync::Arc;

use resvg::{tiny_skia, usvg};

/// Bitmap export renders at double resolution so text stays crisp.
pub const DEFAULT_RASTER_SCALE: f32 = 2.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    Svg(String),
    PixmapAlloc { width: u32, height: u32 },
    Encode(String),
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Svg(message) => write!(f, "cannot parse SVG for rasterization: {message}"),
            Self::PixmapAlloc { width, height } => {
                write!(f, "cannot allocate {width}x{height} pixmap")
            }
            Self::Encode(message) => write!(f, "cannot encode PNG: {message}"),
        }
    }
}

impl std::error::Error for RasterError {}

/// Rasterize an SVG string to PNG bytes at the given scale.
///
/// System fonts are loaded so labels render where available; on a machine
/// without fonts the shapes still rasterize and text is skipped.
pub fn rasterize_png(svg: &str, scale: f32) -> Result<Vec<u8>, RasterError> {
    let mut options = usvg::Options::default();
    let mut fontdb = usvg::fontdb::Database::new();
    fontdb.load_system_fonts();
    options.fontdb = Arc::new(fontdb);

    let tree = usvg::Tree::from_data(svg.as_bytes(), &options)
        .map_err(|err| RasterError::Svg(err.to_string()))?;

    let size = tree.size();
    let width = ((size.width() * scale).ceil() as u32).max(1);
    let height = ((size.height() * scale).ceil() as u32).max(1);

    let Some(mut pixmap) = tiny_skia::Pixmap::new(width, height) else {
        return Err(RasterError::PixmapAlloc { width, height });
    };

    resvg::render(&tree, tiny_skia::Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap.encode_png().map_err(|err| RasterError::Encode(err.to_string()))
}
