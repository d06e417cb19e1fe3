// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::document::FlowchartDoc;

/// A named flowchart document with a monotonic revision counter.
///
/// The revision gates optimistic concurrency in the ops layer: callers submit
/// the revision they read, and stale submissions are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flowchart {
    name: String,
    doc: FlowchartDoc,
    rev: u64,
}

impl Flowchart {
    pub fn new(name: impl Into<String>, doc: FlowchartDoc) -> Self {
        Self { name: name.into(), doc, rev: 0 }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn doc(&self) -> &FlowchartDoc {
        &self.doc
    }

    /// Replace the document without resetting the revision.
    pub fn replace_doc(&mut self, doc: FlowchartDoc) -> FlowchartDoc {
        std::mem::replace(&mut self.doc, doc)
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn set_rev(&mut self, rev: u64) {
        self.rev = rev;
    }

    pub fn bump_rev(&mut self) {
        self.rev = self.rev.saturating_add(1);
    }
}
