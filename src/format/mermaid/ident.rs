// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentError {
    Empty,
    ContainsWhitespace,
    ContainsSlash,
    InvalidChar { ch: char },
}

impl fmt::Display for IdentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("must not be empty"),
            Self::ContainsWhitespace => f.write_str("must not contain whitespace"),
            Self::ContainsSlash => f.write_str("must not contain '/'"),
            Self::InvalidChar { ch } => write!(f, "contains invalid character: '{ch}'"),
        }
    }
}

impl std::error::Error for IdentError {}

/// Node identifiers are ASCII alphanumerics plus `_`, the subset every
/// downstream renderer accepts without quoting.
pub fn validate_ident(ident: &str) -> Result<(), IdentError> {
    if ident.is_empty() {
        return Err(IdentError::Empty);
    }
    if ident.chars().any(|c| c.is_whitespace()) {
        return Err(IdentError::ContainsWhitespace);
    }
    if ident.contains('/') {
        return Err(IdentError::ContainsSlash);
    }
    if let Some(ch) = ident.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '_') {
        return Err(IdentError::InvalidChar { ch });
    }
    Ok(())
}
