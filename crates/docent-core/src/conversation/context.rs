//! Session context and transition log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::event::ConversationEvent;

/// Dialogue lifecycle states.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConversationState {
    Idle,
    Ready,
    Engaged,
    Interrupted,
    Paused,
    Completed,
}

/// One immutable entry in the transition log.
///
/// Appended on every accepted transition, never edited or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from_state: ConversationState,
    pub to_state: ConversationState,
    pub event: ConversationEvent,
    pub timestamp: DateTime<Utc>,
    pub metadata: serde_json::Value,
}

/// The mutable session record driven by the state machine.
///
/// Field names and types are the persistence contract; saved sessions
/// deserialize only if they stay stable. The transition history is an
/// in-memory audit trail and is deliberately not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub current_state: ConversationState,
    pub current_unit_index: usize,
    pub total_units: usize,
    pub current_role: Option<String>,
    pub bot_is_generating: bool,
    pub awaiting_user_input: bool,
    /// Unit index at the most recent user-initiated interruption.
    pub interrupted_at_index: Option<usize>,
    pub interruption_count: usize,
    pub message_count: usize,
    pub session_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub last_activity: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub state_history: Vec<StateTransition>,
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self {
            current_state: ConversationState::Idle,
            current_unit_index: 0,
            total_units: 0,
            current_role: None,
            bot_is_generating: false,
            awaiting_user_input: false,
            interrupted_at_index: None,
            interruption_count: 0,
            message_count: 0,
            session_id: None,
            started_at: None,
            last_activity: None,
            state_history: Vec::new(),
        }
    }
}

impl ConversationContext {
    /// Fraction of units visited, in [0, 1]. Zero units is zero
    /// progress, not a division error.
    pub fn progress(&self) -> f32 {
        if self.total_units == 0 {
            return 0.0;
        }
        (self.current_unit_index as f32 / self.total_units as f32).min(1.0)
    }

    pub fn touch(&mut self) {
        self.last_activity = Some(Utc::now());
    }
}
