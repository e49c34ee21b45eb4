//! Conversation lifecycle.
//!
//! ## Module Structure
//!
//! - `event` - The closed event alphabet
//! - `context` - Session context and transition log
//! - `machine` - Transition table and frontend protocol
//! - `store` - Filesystem session persistence

pub mod context;
pub mod event;
pub mod machine;
pub mod store;

pub use context::{ConversationContext, ConversationState, StateTransition};
pub use event::ConversationEvent;
pub use machine::{
    AdvanceOutcome, ConversationStateMachine, InterruptAck, InterruptionTurn, StateSummary,
};
pub use store::SessionStore;
