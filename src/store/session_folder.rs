// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::format::mermaid::{
    export_flowchart, parse_flowchart, FlowchartExportError, FlowchartParseError,
};
use crate::model::{Flowchart, IdError, Session, SessionId};

pub const SESSION_META_FILENAME: &str = "flowgpt-session.meta.json";
pub const FLOWCHART_FILENAME: &str = "flowchart.mmd";

/// Whether writes additionally fsync. Durable writes are slower and opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteDurability {
    #[default]
    BestEffort,
    Durable,
}

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    MarkupParse {
        path: PathBuf,
        source: Box<FlowchartParseError>,
    },
    MarkupExport {
        path: PathBuf,
        source: Box<FlowchartExportError>,
    },
    InvalidId {
        field: &'static str,
        value: String,
        source: Box<IdError>,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
            Self::MarkupParse { path, source } => {
                write!(f, "cannot parse flowchart markup from {path:?}: {source}")
            }
            Self::MarkupExport { path, source } => {
                write!(f, "cannot export flowchart markup to {path:?}: {source}")
            }
            Self::InvalidId { field, value, source } => {
                write!(f, "invalid id for {field}: {value:?}: {source}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::MarkupParse { source, .. } => Some(source),
            Self::MarkupExport { source, .. } => Some(source),
            Self::InvalidId { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionMetaJson {
    session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_prompt: Option<String>,
    settings: SettingsJson,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    flowchart: Option<FlowchartMetaJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SettingsJson {
    kind: String,
    theme: String,
    font: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FlowchartMetaJson {
    name: String,
    rev: u64,
}

/// A session directory holding the markup file and a JSON meta sidecar.
///
/// The markup stays a plain `.mmd` file so other tooling can read and edit
/// it; identity, revision, prompt and settings live in the sidecar.
#[derive(Debug, Clone)]
pub struct SessionFolder {
    dir: PathBuf,
    durability: WriteDurability,
}

impl SessionFolder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), durability: WriteDurability::default() }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn root(&self) -> &Path {
        &self.dir
    }

    pub fn meta_path(&self) -> PathBuf {
        self.dir.join(SESSION_META_FILENAME)
    }

    pub fn flowchart_path(&self) -> PathBuf {
        self.dir.join(FLOWCHART_FILENAME)
    }

    /// Load the stored session, or initialize a fresh one in the directory.
    pub fn load_or_init_session(&self) -> Result<Session, StoreError> {
        if self.meta_path().is_file() {
            return self.load_session();
        }

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let session_id =
            SessionId::new(format!("s-{nanos}")).expect("generated session id is valid");
        let session = Session::new(session_id);
        self.save_session(&session)?;
        Ok(session)
    }

    pub fn load_session(&self) -> Result<Session, StoreError> {
        let meta_path = self.meta_path();
        let raw = fs::read_to_string(&meta_path)
            .map_err(|source| StoreError::Io { path: meta_path.clone(), source })?;
        let meta: SessionMetaJson = serde_json::from_str(&raw)
            .map_err(|source| StoreError::Json { path: meta_path.clone(), source })?;

        let session_id = SessionId::new(meta.session_id.clone()).map_err(|source| {
            StoreError::InvalidId {
                field: "session_id",
                value: meta.session_id.clone(),
                source: Box::new(source),
            }
        })?;
        let mut session = Session::new(session_id);
        session.set_last_prompt(meta.last_prompt);

        // Settings written by older builds may carry kinds this build does not
        // know; fall back to the defaults rather than refusing the session.
        let settings = session.settings_mut();
        if let Ok(kind) = meta.settings.kind.parse() {
            settings.set_kind(kind);
        }
        settings.set_theme(meta.settings.theme);
        settings.set_font(meta.settings.font);

        if let Some(flowchart_meta) = meta.flowchart {
            let mmd_path = self.flowchart_path();
            let markup = fs::read_to_string(&mmd_path)
                .map_err(|source| StoreError::Io { path: mmd_path.clone(), source })?;
            let doc = parse_flowchart(&markup).map_err(|source| StoreError::MarkupParse {
                path: mmd_path,
                source: Box::new(source),
            })?;
            let mut flowchart = Flowchart::new(flowchart_meta.name, doc);
            flowchart.set_rev(flowchart_meta.rev);
            session.set_flowchart(Some(flowchart));
        }

        Ok(session)
    }

    pub fn save_session(&self, session: &Session) -> Result<(), StoreError> {
        if let Some(flowchart) = session.flowchart() {
            let mmd_path = self.flowchart_path();
            let markup =
                export_flowchart(flowchart.doc()).map_err(|source| StoreError::MarkupExport {
                    path: mmd_path.clone(),
                    source: Box::new(source),
                })?;
            self.write_atomic(&mmd_path, markup.as_bytes())?;
        }

        let meta = SessionMetaJson {
            session_id: session.session_id().as_str().to_owned(),
            last_prompt: session.last_prompt().map(str::to_owned),
            settings: SettingsJson {
                kind: session.settings().kind().as_str().to_owned(),
                theme: session.settings().theme().to_owned(),
                font: session.settings().font().to_owned(),
            },
            flowchart: session.flowchart().map(|flowchart| FlowchartMetaJson {
                name: flowchart.name().to_owned(),
                rev: flowchart.rev(),
            }),
        };

        let meta_path = self.meta_path();
        let mut raw = serde_json::to_string_pretty(&meta)
            .map_err(|source| StoreError::Json { path: meta_path.clone(), source })?;
        raw.push('\n');
        self.write_atomic(&meta_path, raw.as_bytes())
    }

    /// Write through a temp file in the same directory, then rename over the
    /// target, so readers never observe a partially written file.
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)
            .map_err(|source| StoreError::Io { path: self.dir.clone(), source })?;

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("flowgpt-write");
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let tmp_path = self
            .dir
            .join(format!(".{file_name}.tmp-{}-{nanos}", std::process::id()));

        let result = (|| {
            let mut file = fs::File::create(&tmp_path)
                .map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;
            file.write_all(contents)
                .map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;
            if self.durability == WriteDurability::Durable {
                file.sync_all()
                    .map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;
            }
            drop(file);
            fs::rename(&tmp_path, path)
                .map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
            if self.durability == WriteDurability::Durable {
                // Directory sync is best-effort; not every platform allows it.
                if let Ok(dir) = fs::File::open(&self.dir) {
                    let _ = dir.sync_all();
                }
            }
            Ok(())
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }
}

#[cfg(test)]
mod tests;
