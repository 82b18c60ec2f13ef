//! Per-user wizard state.
//!
//! The conversation is a three-step wizard; each step is a variant carrying
//! exactly the data accumulated so far, so an out-of-order transition is
//! unrepresentable instead of being a string comparison at runtime.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use series_analyzer::analysis::AnalysisKind;
use series_analyzer::models::series::CandleSeries;

use crate::transport::UserId;

/// The state of one user's wizard, tagged by the input awaited next.
#[derive(Debug, Clone, PartialEq)]
pub enum Session {
    /// Kind chosen; waiting for the CSV upload.
    AwaitingFile { kind: AnalysisKind },

    /// Upload parsed; waiting for the start date.
    AwaitingStartDate {
        kind: AnalysisKind,
        series: CandleSeries,
    },

    /// Start date accepted; waiting for the end date (or `none`).
    AwaitingEndDate {
        kind: AnalysisKind,
        series: CandleSeries,
        start: DateTime<Utc>,
    },
}

impl Session {
    /// The analysis kind chosen at the first step.
    pub fn kind(&self) -> AnalysisKind {
        match self {
            Self::AwaitingFile { kind }
            | Self::AwaitingStartDate { kind, .. }
            | Self::AwaitingEndDate { kind, .. } => *kind,
        }
    }
}

/// In-memory store of active sessions, keyed by user id.
///
/// Lifetime is the process: nothing is persisted and nothing expires. One
/// session per user; beginning a new wizard overwrites any previous one.
/// Events are handled one at a time per process, so no locking is needed
/// here.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: IndexMap<UserId, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the active session; `None` means "no active wizard".
    pub fn get(&self, user: UserId) -> Option<&Session> {
        self.sessions.get(&user)
    }

    /// Starts (or restarts) a wizard at the upload step.
    pub fn begin(&mut self, user: UserId, kind: AnalysisKind) {
        self.sessions.insert(user, Session::AwaitingFile { kind });
    }

    /// Replaces the user's session with the next step's state.
    pub fn advance(&mut self, user: UserId, next: Session) {
        self.sessions.insert(user, next);
    }

    /// Removes and returns the session, if any.
    pub fn clear(&mut self, user: UserId) -> Option<Session> {
        self.sessions.shift_remove(&user)
    }

    /// Number of active sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
