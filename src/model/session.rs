// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use super::flowchart::Flowchart;
use super::ids::SessionId;

/// The flavor of diagram a generation request asks for; selects the prompt
/// template sent to the completion API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowchartKind {
    #[default]
    Process,
    UserJourney,
    SystemFlow,
}

impl FlowchartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::UserJourney => "userJourney",
            Self::SystemFlow => "systemFlow",
        }
    }
}

impl fmt::Display for FlowchartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFlowchartKindError {
    name: String,
}

impl fmt::Display for UnknownFlowchartKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown flowchart kind: {:?} (expected process/userJourney/systemFlow)",
            self.name
        )
    }
}

impl std::error::Error for UnknownFlowchartKindError {}

impl FromStr for FlowchartKind {
    type Err = UnknownFlowchartKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "process" => Ok(Self::Process),
            "userJourney" => Ok(Self::UserJourney),
            "systemFlow" => Ok(Self::SystemFlow),
            _ => Err(UnknownFlowchartKindError { name: s.to_owned() }),
        }
    }
}

/// Generation defaults a client can override per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSettings {
    kind: FlowchartKind,
    theme: String,
    font: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            kind: FlowchartKind::Process,
            theme: "default".to_owned(),
            font: "inter".to_owned(),
        }
    }
}

impl GenerationSettings {
    pub fn new(kind: FlowchartKind, theme: impl Into<String>, font: impl Into<String>) -> Self {
        Self { kind, theme: theme.into(), font: font.into() }
    }

    pub fn kind(&self) -> FlowchartKind {
        self.kind
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn font(&self) -> &str {
        &self.font
    }

    pub fn set_kind(&mut self, kind: FlowchartKind) {
        self.kind = kind;
    }

    pub fn set_theme(&mut self, theme: impl Into<String>) {
        self.theme = theme.into();
    }

    pub fn set_font(&mut self, font: impl Into<String>) {
        self.font = font.into();
    }
}

/// The top-level state the service runs against: the current flowchart, the
/// last free-text prompt and the generation defaults.
///
/// Owning this in one place replaces the ambient per-component state the
/// browser original scattered across its views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    session_id: SessionId,
    flowchart: Option<Flowchart>,
    last_prompt: Option<String>,
    settings: GenerationSettings,
}

impl Session {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            flowchart: None,
            last_prompt: None,
            settings: GenerationSettings::default(),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn flowchart(&self) -> Option<&Flowchart> {
        self.flowchart.as_ref()
    }

    pub fn flowchart_mut(&mut self) -> Option<&mut Flowchart> {
        self.flowchart.as_mut()
    }

    pub fn set_flowchart(&mut self, flowchart: Option<Flowchart>) {
        self.flowchart = flowchart;
    }

    pub fn last_prompt(&self) -> Option<&str> {
        self.last_prompt.as_deref()
    }

    pub fn set_last_prompt<T: Into<String>>(&mut self, prompt: Option<T>) {
        self.last_prompt = prompt.map(Into::into);
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut GenerationSettings {
        &mut self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::{FlowchartKind, Session};
    use crate::model::{Direction, Flowchart, FlowchartDoc, SessionId};

    #[test]
    fn session_tracks_flowchart_and_prompt() {
        let mut session = Session::new(SessionId::new("s1").expect("session id"));
        assert!(session.flowchart().is_none());
        assert!(session.last_prompt().is_none());

        session.set_flowchart(Some(Flowchart::new("Demo", FlowchartDoc::new(Direction::Td))));
        session.set_last_prompt(Some("make me a login flow"));

        assert_eq!(session.flowchart().map(|f| f.name()), Some("Demo"));
        assert_eq!(session.last_prompt(), Some("make me a login flow"));
    }

    #[test]
    fn flowchart_kind_parses_wire_names() {
        assert_eq!("process".parse(), Ok(FlowchartKind::Process));
        assert_eq!("userJourney".parse(), Ok(FlowchartKind::UserJourney));
        assert_eq!("systemFlow".parse(), Ok(FlowchartKind::SystemFlow));
        assert!("flow".parse::<FlowchartKind>().is_err());
    }
}
