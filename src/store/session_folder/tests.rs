// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rstest::{fixture, rstest};

use super::{SessionFolder, StoreError, WriteDurability, FLOWCHART_FILENAME};
use crate::format::mermaid::parse_flowchart;
use crate::model::{Flowchart, FlowchartKind, Session, SessionId};

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: std::path::PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = env::temp_dir();
        path.push(format!("flowgpt-{prefix}-{}-{nanos}-{counter}", std::process::id()));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

struct SessionFolderTestCtx {
    _tmp: TempDir,
    session_dir: std::path::PathBuf,
    folder: SessionFolder,
}

impl SessionFolderTestCtx {
    fn new(prefix: &str) -> Self {
        let tmp = TempDir::new(prefix);
        let session_dir = tmp.path().join("my-session");
        let folder = SessionFolder::new(&session_dir);
        Self { _tmp: tmp, session_dir, folder }
    }
}

#[fixture]
fn ctx() -> SessionFolderTestCtx {
    SessionFolderTestCtx::new("session-folder")
}

fn sample_session() -> Session {
    let mut session = Session::new(SessionId::new("s1").unwrap());
    session.set_last_prompt(Some("design a checkout flow"));
    session.settings_mut().set_kind(FlowchartKind::UserJourney);
    session.settings_mut().set_theme("dark");
    session.settings_mut().set_font("mono");

    let doc = parse_flowchart(
        "graph LR\n    A([Start]) --> B{Pay?}\n    B -->|Yes| C[Charge]\n    style B fill:#ffcc00\n",
    )
    .unwrap();
    let mut flowchart = Flowchart::new("Checkout", doc);
    flowchart.set_rev(3);
    session.set_flowchart(Some(flowchart));
    session
}

#[rstest]
fn init_creates_meta_and_loads_back(ctx: SessionFolderTestCtx) {
    let session = ctx.folder.load_or_init_session().unwrap();
    assert!(ctx.folder.meta_path().is_file());
    assert!(session.flowchart().is_none());
    assert!(session.last_prompt().is_none());

    // A second load returns the same session rather than minting a new id.
    let reloaded = ctx.folder.load_or_init_session().unwrap();
    assert_eq!(reloaded.session_id(), session.session_id());
}

#[rstest]
fn save_and_load_roundtrips_the_session(ctx: SessionFolderTestCtx) {
    let session = sample_session();
    ctx.folder.save_session(&session).unwrap();

    let mmd = std::fs::read_to_string(ctx.session_dir.join(FLOWCHART_FILENAME)).unwrap();
    assert!(mmd.starts_with("graph LR\n"));
    assert!(mmd.contains("B -->|Yes| C[Charge]"));

    let loaded = ctx.folder.load_session().unwrap();
    assert_eq!(loaded.session_id().as_str(), "s1");
    assert_eq!(loaded.last_prompt(), Some("design a checkout flow"));
    assert_eq!(loaded.settings().kind(), FlowchartKind::UserJourney);
    assert_eq!(loaded.settings().theme(), "dark");
    assert_eq!(loaded.settings().font(), "mono");

    let flowchart = loaded.flowchart().expect("flowchart");
    assert_eq!(flowchart.name(), "Checkout");
    assert_eq!(flowchart.rev(), 3);
    assert_eq!(flowchart.doc().nodes().len(), 3);
    assert_eq!(flowchart.doc().styles().len(), 1);
}

#[rstest]
fn durable_writes_roundtrip_too(ctx: SessionFolderTestCtx) {
    let folder = ctx.folder.clone().with_durability(WriteDurability::Durable);
    folder.save_session(&sample_session()).unwrap();
    let loaded = folder.load_session().unwrap();
    assert_eq!(loaded.session_id().as_str(), "s1");
}

#[rstest]
fn load_reports_broken_meta_json(ctx: SessionFolderTestCtx) {
    std::fs::create_dir_all(&ctx.session_dir).unwrap();
    std::fs::write(ctx.folder.meta_path(), b"{ not json").unwrap();

    let err = ctx.folder.load_session().unwrap_err();
    assert!(matches!(err, StoreError::Json { .. }));
}

#[rstest]
fn load_reports_broken_markup(ctx: SessionFolderTestCtx) {
    let session = sample_session();
    ctx.folder.save_session(&session).unwrap();
    std::fs::write(ctx.session_dir.join(FLOWCHART_FILENAME), b"no header here\n").unwrap();

    let err = ctx.folder.load_session().unwrap_err();
    assert!(matches!(err, StoreError::MarkupParse { .. }));
}

#[rstest]
fn unknown_settings_kind_falls_back_to_default(ctx: SessionFolderTestCtx) {
    let mut session = sample_session();
    session.set_flowchart(None);
    ctx.folder.save_session(&session).unwrap();

    let raw = std::fs::read_to_string(ctx.folder.meta_path()).unwrap();
    let patched = raw.replace("userJourney", "somethingElse");
    std::fs::write(ctx.folder.meta_path(), patched).unwrap();

    let loaded = ctx.folder.load_session().unwrap();
    assert_eq!(loaded.settings().kind(), FlowchartKind::Process);
}

#[rstest]
fn no_stray_temp_files_after_save(ctx: SessionFolderTestCtx) {
    ctx.folder.save_session(&sample_session()).unwrap();

    let strays = std::fs::read_dir(&ctx.session_dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp-"))
        .count();
    assert_eq!(strays, 0);
}
