//! Conversation events.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Every event the dialogue state machine understands.
///
/// The set is closed; the transition table in `machine` is total over
/// no larger an alphabet than this.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConversationEvent {
    Initialize,
    DocumentLoaded,
    RolesAssigned,
    StartDialogue,
    UserMessage,
    BotResponse,
    NextUnit,
    UserInterrupt,
    Resume,
    Pause,
    Unpause,
    Complete,
    Reset,
}
