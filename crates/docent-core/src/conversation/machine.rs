//! Interruption-resilient dialogue state machine.
//!
//! Transitions are a fixed finite map over (state, event); anything
//! outside the map is rejected before the context is touched. Entry
//! actions are keyed by (new state, triggering event) so re-entering
//! INTERRUPTED through a bot response does not re-count the
//! interruption.
//!
//! One machine owns one session's context. Nothing here locks; a host
//! serving many sessions keeps one machine per session and serializes
//! access itself.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use strum::IntoEnumIterator;

use super::context::{ConversationContext, ConversationState, StateTransition};
use super::event::ConversationEvent;
use crate::error::{DocentError, Result};

/// The transition table. `None` means the event is invalid from that
/// state.
fn transition_target(
    state: ConversationState,
    event: ConversationEvent,
) -> Option<ConversationState> {
    use ConversationEvent as E;
    use ConversationState as S;

    match (state, event) {
        // Setup flow
        (S::Idle, E::Initialize) => Some(S::Idle),
        (S::Idle, E::DocumentLoaded) => Some(S::Ready),
        (S::Ready, E::RolesAssigned) => Some(S::Ready),
        (S::Ready, E::StartDialogue) => Some(S::Engaged),

        // Normal conversation
        (S::Engaged, E::UserMessage) => Some(S::Engaged),
        (S::Engaged, E::BotResponse) => Some(S::Engaged),
        (S::Engaged, E::NextUnit) => Some(S::Engaged),

        // Interruption cycle
        (S::Engaged, E::UserInterrupt) => Some(S::Interrupted),
        (S::Interrupted, E::BotResponse) => Some(S::Interrupted),
        (S::Interrupted, E::Resume) => Some(S::Engaged),

        // Pause
        (S::Engaged, E::Pause) => Some(S::Paused),
        (S::Paused, E::Unpause) => Some(S::Engaged),

        // Completion
        (S::Engaged, E::Complete) => Some(S::Completed),

        // Reset from any post-setup state
        (S::Ready, E::Reset)
        | (S::Engaged, E::Reset)
        | (S::Interrupted, E::Reset)
        | (S::Paused, E::Reset)
        | (S::Completed, E::Reset) => Some(S::Idle),

        _ => None,
    }
}

/// Events accepted from a state, in canonical event order.
fn valid_events(state: ConversationState) -> Vec<ConversationEvent> {
    ConversationEvent::iter()
        .filter(|&event| transition_target(state, event).is_some())
        .collect()
}

/// Acknowledgment returned when an interrupt is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterruptAck {
    pub interrupted_at_unit: usize,
    /// UI prompt to show while collecting the question.
    pub prompt: String,
}

/// An interruption question handed back for text generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterruptionTurn {
    pub interrupted_unit: Option<usize>,
    pub user_message: String,
}

/// Result of advancing through the unit queue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdvanceOutcome {
    pub new_unit: usize,
    pub completed: bool,
}

/// UI-oriented snapshot of the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSummary {
    pub current_state: ConversationState,
    pub is_generating: bool,
    pub awaiting_input: bool,
    pub current_unit: usize,
    pub total_units: usize,
    /// Percentage of units visited, 0.0 when the queue is empty.
    pub percentage: f32,
    pub interruptions: usize,
    pub messages: usize,
    pub can_interrupt: bool,
    pub can_resume: bool,
    pub is_complete: bool,
}

/// Drives one conversation session through the dialogue lifecycle.
pub struct ConversationStateMachine {
    context: ConversationContext,
}

impl Default for ConversationStateMachine {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ConversationStateMachine {
    pub fn new(session_id: Option<String>) -> Self {
        tracing::info!("State machine initialized (session: {:?})", session_id);
        Self {
            context: ConversationContext {
                session_id,
                ..ConversationContext::default()
            },
        }
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    /// Whether the event is valid from the current state.
    pub fn can_transition(&self, event: ConversationEvent) -> bool {
        transition_target(self.context.current_state, event).is_some()
    }

    /// Executes one transition.
    ///
    /// # Errors
    ///
    /// Returns [`DocentError::InvalidTransition`] naming the current
    /// state and the currently valid events when the table has no
    /// entry for (state, event). The context is untouched on failure.
    pub fn transition(
        &mut self,
        event: ConversationEvent,
        metadata: serde_json::Value,
    ) -> Result<()> {
        let old_state = self.context.current_state;
        let new_state = transition_target(old_state, event).ok_or_else(|| {
            DocentError::InvalidTransition {
                from_state: old_state.to_string(),
                event: event.to_string(),
                valid_events: valid_events(old_state)
                    .iter()
                    .map(|e| e.to_string())
                    .collect(),
            }
        })?;

        self.context.state_history.push(StateTransition {
            from_state: old_state,
            to_state: new_state,
            event,
            timestamp: Utc::now(),
            metadata,
        });
        self.context.current_state = new_state;
        self.context.touch();

        self.handle_state_entry(new_state, event);

        tracing::debug!("Transition: {} -> {} ({})", old_state, new_state, event);
        Ok(())
    }

    /// Entry actions, keyed by (entered state, triggering event).
    fn handle_state_entry(&mut self, state: ConversationState, event: ConversationEvent) {
        match (state, event) {
            (ConversationState::Engaged, ConversationEvent::StartDialogue) => {
                self.context.started_at = Some(Utc::now());
                self.context.current_unit_index = 0;
            }
            // A bot response during INTERRUPTED re-enters the state
            // without passing through here; only the user's interrupt
            // itself is bookkept.
            (ConversationState::Interrupted, ConversationEvent::UserInterrupt) => {
                self.context.interrupted_at_index = Some(self.context.current_unit_index);
                self.context.interruption_count += 1;
                tracing::info!(
                    "Interrupt #{} at unit {}",
                    self.context.interruption_count,
                    self.context.current_unit_index
                );
            }
            (ConversationState::Engaged, ConversationEvent::Resume) => {
                tracing::info!("Resumed at unit {}", self.context.current_unit_index);
            }
            (ConversationState::Completed, _) => {
                tracing::info!("Conversation completed");
            }
            _ => {}
        }
    }

    // =========================================================================
    // Setup
    // =========================================================================

    /// Registers a processed document and its unit count.
    pub fn load_document(&mut self, total_units: usize) -> Result<()> {
        self.transition(
            ConversationEvent::DocumentLoaded,
            json!({ "total_units": total_units }),
        )?;
        self.context.total_units = total_units;
        Ok(())
    }

    pub fn mark_roles_assigned(&mut self) -> Result<()> {
        self.transition(ConversationEvent::RolesAssigned, json!({}))
    }

    pub fn start_dialogue(&mut self) -> Result<()> {
        self.transition(ConversationEvent::StartDialogue, json!({}))
    }

    /// Sets the display name of the role speaking for the current
    /// unit. Not a transition.
    pub fn set_current_role(&mut self, role: Option<String>) {
        self.context.current_role = role;
    }

    // =========================================================================
    // Frontend API
    // =========================================================================

    /// Bot starts generating. The UI shows a typing indicator. Not a
    /// transition.
    pub fn start_bot_response(&mut self) {
        self.context.bot_is_generating = true;
        self.context.awaiting_user_input = false;
        tracing::debug!("Bot started generating");
    }

    /// Bot finished generating. The UI re-enables input.
    pub fn finish_bot_response(&mut self) {
        self.context.bot_is_generating = false;
        self.context.awaiting_user_input = true;
        self.context.message_count += 1;
        tracing::debug!("Bot finished, awaiting user");
    }

    /// The user clicked the interrupt control.
    ///
    /// Captures the interruption point and transitions to INTERRUPTED.
    ///
    /// # Errors
    ///
    /// Fails without mutating anything when the session is not
    /// ENGAGED.
    pub fn user_clicks_interrupt(&mut self) -> Result<InterruptAck> {
        if self.context.current_state != ConversationState::Engaged {
            return Err(DocentError::precondition(
                "user_clicks_interrupt",
                format!("Cannot interrupt - state is {}", self.context.current_state),
            ));
        }

        let interrupted_at_unit = self.context.current_unit_index;

        self.context.bot_is_generating = false;
        self.context.awaiting_user_input = true;
        self.transition(
            ConversationEvent::UserInterrupt,
            json!({ "interrupted_at_unit": interrupted_at_unit }),
        )?;

        tracing::info!("User interrupted at unit {}", interrupted_at_unit);

        Ok(InterruptAck {
            interrupted_at_unit,
            prompt: "What's your question?".to_string(),
        })
    }

    /// The user submitted their interruption question.
    ///
    /// Does not transition; the caller feeds the returned turn to text
    /// generation and later calls [`resume_conversation`].
    ///
    /// [`resume_conversation`]: ConversationStateMachine::resume_conversation
    ///
    /// # Errors
    ///
    /// Fails when the session is not INTERRUPTED.
    pub fn process_interruption_message(&mut self, message: &str) -> Result<InterruptionTurn> {
        if self.context.current_state != ConversationState::Interrupted {
            return Err(DocentError::precondition(
                "process_interruption_message",
                format!(
                    "Not in interrupted state (current: {})",
                    self.context.current_state
                ),
            ));
        }

        tracing::info!("Processing interruption: '{}'", message);

        Ok(InterruptionTurn {
            interrupted_unit: self.context.interrupted_at_index,
            user_message: message.to_string(),
        })
    }

    /// Returns to ENGAGED after the interruption was answered. The
    /// unit index is untouched; the walkthrough continues exactly
    /// where it left off.
    ///
    /// # Errors
    ///
    /// Fails when the session is not INTERRUPTED.
    pub fn resume_conversation(&mut self) -> Result<usize> {
        if self.context.current_state != ConversationState::Interrupted {
            return Err(DocentError::precondition(
                "resume_conversation",
                format!("Not interrupted (current: {})", self.context.current_state),
            ));
        }

        let resuming_from = self.context.current_unit_index;
        self.transition(
            ConversationEvent::Resume,
            json!({ "resumed_from_unit": resuming_from }),
        )?;

        tracing::info!("Resuming from unit {}", resuming_from);
        Ok(resuming_from)
    }

    /// Handles an in-flow user message. Returns the current unit.
    ///
    /// # Errors
    ///
    /// Fails when the session is not ENGAGED.
    pub fn process_user_message(&mut self, message: &str) -> Result<usize> {
        if self.context.current_state != ConversationState::Engaged {
            return Err(DocentError::precondition(
                "process_user_message",
                format!(
                    "Cannot process message in state {}",
                    self.context.current_state
                ),
            ));
        }

        self.transition(ConversationEvent::UserMessage, json!({ "message": message }))?;
        Ok(self.context.current_unit_index)
    }

    /// Moves to the next unit, or completes the session when the
    /// current unit is the last.
    ///
    /// # Errors
    ///
    /// Fails when the session is not ENGAGED.
    pub fn advance_unit(&mut self) -> Result<AdvanceOutcome> {
        if self.context.current_state != ConversationState::Engaged {
            return Err(DocentError::precondition(
                "advance_unit",
                format!("Cannot advance in state {}", self.context.current_state),
            ));
        }

        if self.context.current_unit_index + 1 >= self.context.total_units {
            self.transition(ConversationEvent::Complete, json!({}))?;
            return Ok(AdvanceOutcome {
                new_unit: self.context.current_unit_index,
                completed: true,
            });
        }

        let old_unit = self.context.current_unit_index;
        self.context.current_unit_index += 1;
        self.transition(
            ConversationEvent::NextUnit,
            json!({ "from_unit": old_unit, "to_unit": self.context.current_unit_index }),
        )?;

        tracing::info!(
            "Advanced: unit {} -> {}",
            old_unit,
            self.context.current_unit_index
        );

        Ok(AdvanceOutcome {
            new_unit: self.context.current_unit_index,
            completed: false,
        })
    }

    /// Pure read for UI rendering.
    pub fn get_state_summary(&self) -> StateSummary {
        StateSummary {
            current_state: self.context.current_state,
            is_generating: self.context.bot_is_generating,
            awaiting_input: self.context.awaiting_user_input,
            current_unit: self.context.current_unit_index,
            total_units: self.context.total_units,
            percentage: self.context.progress() * 100.0,
            interruptions: self.context.interruption_count,
            messages: self.context.message_count,
            can_interrupt: self.context.current_state == ConversationState::Engaged,
            can_resume: self.context.current_state == ConversationState::Interrupted,
            is_complete: self.context.current_state == ConversationState::Completed,
        }
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Serializes the context for persistence. The transition history
    /// is excluded.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn save_state(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.context)?)
    }

    /// Replaces the in-memory context wholesale with a saved one.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload does not deserialize.
    pub fn load_state(&mut self, state_json: &str) -> Result<()> {
        self.context = serde_json::from_str(state_json)?;
        tracing::info!("State loaded for session {:?}", self.context.session_id);
        Ok(())
    }

    /// Returns to IDLE. No-op when already there.
    ///
    /// # Errors
    ///
    /// Infallible in practice; RESET is valid from every non-IDLE
    /// state.
    pub fn reset(&mut self) -> Result<()> {
        if self.context.current_state != ConversationState::Idle {
            self.transition(ConversationEvent::Reset, json!({}))?;
        }
        tracing::info!("State machine reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Machine set up through the dialogue start, with `units` queued.
    fn engaged_machine(units: usize) -> ConversationStateMachine {
        let mut machine = ConversationStateMachine::new(Some("test-session".to_string()));
        machine.load_document(units).unwrap();
        machine.mark_roles_assigned().unwrap();
        machine.start_dialogue().unwrap();
        machine
    }

    #[test]
    fn test_setup_flow() {
        let machine = engaged_machine(5);
        assert_eq!(machine.context().current_state, ConversationState::Engaged);
        assert_eq!(machine.context().total_units, 5);
        assert_eq!(machine.context().current_unit_index, 0);
        assert!(machine.context().started_at.is_some());
    }

    #[test]
    fn test_invalid_transition_is_rejected_before_mutation() {
        let mut machine = ConversationStateMachine::default();
        let before = machine.context().clone();

        let err = machine
            .transition(ConversationEvent::UserInterrupt, serde_json::json!({}))
            .unwrap_err();

        assert!(err.is_invalid_transition());
        let message = err.to_string();
        assert!(message.contains("idle"));
        assert!(message.contains("user_interrupt"));
        assert!(message.contains("initialize"));
        assert!(message.contains("document_loaded"));
        assert_eq!(machine.context(), &before);
    }

    #[test]
    fn test_interruption_cycle_preserves_position() {
        let mut machine = engaged_machine(5);
        machine.advance_unit().unwrap();
        machine.advance_unit().unwrap();
        assert_eq!(machine.context().current_unit_index, 2);

        let ack = machine.user_clicks_interrupt().unwrap();
        assert_eq!(ack.interrupted_at_unit, 2);
        assert_eq!(
            machine.context().current_state,
            ConversationState::Interrupted
        );
        assert_eq!(machine.context().interruption_count, 1);
        assert_eq!(machine.context().interrupted_at_index, Some(2));

        let turn = machine
            .process_interruption_message("what does this mean?")
            .unwrap();
        assert_eq!(turn.interrupted_unit, Some(2));
        assert_eq!(turn.user_message, "what does this mean?");

        let resumed_from = machine.resume_conversation().unwrap();
        assert_eq!(resumed_from, 2);
        assert_eq!(machine.context().current_state, ConversationState::Engaged);
        assert_eq!(machine.context().current_unit_index, 2);
    }

    #[test]
    fn test_bot_response_while_interrupted_does_not_recount() {
        let mut machine = engaged_machine(5);
        machine.user_clicks_interrupt().unwrap();
        assert_eq!(machine.context().interruption_count, 1);

        // Bot answers twice before the user resumes.
        machine
            .transition(ConversationEvent::BotResponse, serde_json::json!({}))
            .unwrap();
        machine
            .transition(ConversationEvent::BotResponse, serde_json::json!({}))
            .unwrap();

        assert_eq!(
            machine.context().current_state,
            ConversationState::Interrupted
        );
        assert_eq!(machine.context().interruption_count, 1);
        assert_eq!(machine.context().interrupted_at_index, Some(0));
    }

    #[test]
    fn test_interrupt_requires_engaged() {
        let mut machine = ConversationStateMachine::default();
        let err = machine.user_clicks_interrupt().unwrap_err();
        assert!(err.is_precondition());
        assert_eq!(machine.context().current_state, ConversationState::Idle);
        assert_eq!(machine.context().interruption_count, 0);
    }

    #[test]
    fn test_advance_to_completion() {
        let mut machine = engaged_machine(3);

        let first = machine.advance_unit().unwrap();
        assert_eq!(first.new_unit, 1);
        assert!(!first.completed);

        let second = machine.advance_unit().unwrap();
        assert_eq!(second.new_unit, 2);
        assert!(!second.completed);

        let last = machine.advance_unit().unwrap();
        assert!(last.completed);
        assert_eq!(last.new_unit, 2);
        assert_eq!(
            machine.context().current_state,
            ConversationState::Completed
        );

        // COMPLETED is terminal apart from reset.
        assert!(machine.advance_unit().is_err());
        assert!(machine.user_clicks_interrupt().is_err());
    }

    #[test]
    fn test_empty_queue_completes_on_first_advance() {
        let mut machine = engaged_machine(0);
        let outcome = machine.advance_unit().unwrap();
        assert!(outcome.completed);
    }

    #[test]
    fn test_pause_and_unpause() {
        let mut machine = engaged_machine(5);
        machine
            .transition(ConversationEvent::Pause, serde_json::json!({}))
            .unwrap();
        assert_eq!(machine.context().current_state, ConversationState::Paused);

        // No interrupting while paused.
        assert!(machine.user_clicks_interrupt().is_err());

        machine
            .transition(ConversationEvent::Unpause, serde_json::json!({}))
            .unwrap();
        assert_eq!(machine.context().current_state, ConversationState::Engaged);
    }

    #[test]
    fn test_bot_response_flags_and_message_count() {
        let mut machine = engaged_machine(5);

        machine.start_bot_response();
        assert!(machine.context().bot_is_generating);
        assert!(!machine.context().awaiting_user_input);

        machine.finish_bot_response();
        assert!(!machine.context().bot_is_generating);
        assert!(machine.context().awaiting_user_input);
        assert_eq!(machine.context().message_count, 1);
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut machine = engaged_machine(7);
        machine.advance_unit().unwrap();
        machine.set_current_role(Some("Explainer".to_string()));
        machine.user_clicks_interrupt().unwrap();

        let saved = machine.save_state().unwrap();

        let mut restored = ConversationStateMachine::default();
        restored.load_state(&saved).unwrap();

        assert_eq!(
            restored.context().current_state,
            ConversationState::Interrupted
        );
        assert_eq!(restored.context().current_unit_index, 1);
        assert_eq!(restored.context().total_units, 7);
        assert_eq!(
            restored.context().session_id.as_deref(),
            Some("test-session")
        );
        assert_eq!(restored.context().interrupted_at_index, Some(1));
        assert_eq!(
            restored.context().current_role.as_deref(),
            Some("Explainer")
        );

        // Restored session keeps working.
        restored.resume_conversation().unwrap();
        assert_eq!(
            restored.context().current_state,
            ConversationState::Engaged
        );
    }

    #[test]
    fn test_persisted_field_names() {
        let machine = engaged_machine(2);
        let saved = machine.save_state().unwrap();
        let value: serde_json::Value = serde_json::from_str(&saved).unwrap();

        for field in [
            "current_state",
            "current_unit_index",
            "total_units",
            "current_role",
            "bot_is_generating",
            "awaiting_user_input",
            "interrupted_at_index",
            "interruption_count",
            "message_count",
            "session_id",
            "started_at",
            "last_activity",
        ] {
            assert!(value.get(field).is_some(), "missing field {}", field);
        }
        assert_eq!(value["current_state"], "engaged");
        assert!(value.get("state_history").is_none());
    }

    #[test]
    fn test_reset_from_every_state() {
        let mut machine = engaged_machine(5);
        machine.user_clicks_interrupt().unwrap();
        machine.reset().unwrap();
        assert_eq!(machine.context().current_state, ConversationState::Idle);

        // Idempotent when already idle.
        machine.reset().unwrap();
        assert_eq!(machine.context().current_state, ConversationState::Idle);
    }

    #[test]
    fn test_transitions_append_history() {
        let mut machine = engaged_machine(5);
        let before = machine.context().state_history.len();
        machine.process_user_message("hello").unwrap();
        let history = &machine.context().state_history;

        assert_eq!(history.len(), before + 1);
        let last = history.last().unwrap();
        assert_eq!(last.from_state, ConversationState::Engaged);
        assert_eq!(last.to_state, ConversationState::Engaged);
        assert_eq!(last.event, ConversationEvent::UserMessage);
        assert_eq!(last.metadata["message"], "hello");
    }

    #[test]
    fn test_state_summary_flags() {
        let mut machine = engaged_machine(4);
        machine.advance_unit().unwrap();

        let summary = machine.get_state_summary();
        assert_eq!(summary.current_state, ConversationState::Engaged);
        assert_eq!(summary.current_unit, 1);
        assert_eq!(summary.total_units, 4);
        assert!((summary.percentage - 25.0).abs() < 1e-3);
        assert!(summary.can_interrupt);
        assert!(!summary.can_resume);
        assert!(!summary.is_complete);

        machine.user_clicks_interrupt().unwrap();
        let summary = machine.get_state_summary();
        assert!(!summary.can_interrupt);
        assert!(summary.can_resume);
    }
}
