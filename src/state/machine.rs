use super::error::{StateError, StateResult};
use super::{SessionEvent, SessionPhase, StateTransition};

#[derive(Debug)]
pub struct StateMachine {
    phase: SessionPhase,
    transition_history: Vec<StateTransition>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::default(),
            transition_history: Vec::new(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn can_transition(&self, event: SessionEvent) -> bool {
        self.next_phase(event).is_some()
    }

    pub fn next_phase(&self, event: SessionEvent) -> Option<SessionPhase> {
        use SessionEvent::*;
        match (self.phase, event) {
            (_, Reset) => Some(SessionPhase::Empty),
            (SessionPhase::Empty | SessionPhase::Ready, LoadImage) => Some(SessionPhase::Ready),
            (SessionPhase::Ready, BeginAutoMask) => Some(SessionPhase::AutoMasking),
            (SessionPhase::Ready, BeginEdit) => Some(SessionPhase::Editing),
            (SessionPhase::Ready, BeginUpscale) => Some(SessionPhase::Upscaling),
            (
                SessionPhase::AutoMasking | SessionPhase::Editing | SessionPhase::Upscaling,
                RemoteSettled,
            ) => Some(SessionPhase::Ready),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: SessionEvent) -> StateResult<SessionPhase> {
        tracing::debug!(from = ?self.phase, event = ?event, "request session transition");
        let next = self.next_phase(event).ok_or_else(|| {
            let from = self.phase;
            tracing::warn!(from = ?from, event = ?event, "invalid session transition requested");
            StateError::InvalidStateTransition { from, event }
        })?;

        let record = StateTransition::new(Some(self.phase), event, next);
        self.phase = next;
        self.transition_history.push(record);

        Ok(self.phase)
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.transition_history
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionPhase::{:?}", self.phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_work_requires_a_loaded_image() {
        let machine = StateMachine::new();
        assert!(!machine.can_transition(SessionEvent::BeginAutoMask));
        assert!(!machine.can_transition(SessionEvent::BeginEdit));
        assert!(!machine.can_transition(SessionEvent::BeginUpscale));
        assert!(machine.can_transition(SessionEvent::LoadImage));
    }

    #[test]
    fn remote_phases_are_mutually_exclusive() {
        let mut machine = StateMachine::new();
        machine
            .transition(SessionEvent::LoadImage)
            .expect("empty -> ready should transition");
        machine
            .transition(SessionEvent::BeginEdit)
            .expect("ready -> editing should transition");

        assert!(!machine.can_transition(SessionEvent::BeginAutoMask));
        assert!(!machine.can_transition(SessionEvent::BeginUpscale));
        assert!(!machine.can_transition(SessionEvent::LoadImage));

        machine
            .transition(SessionEvent::RemoteSettled)
            .expect("editing -> ready should transition");
        assert!(machine.can_transition(SessionEvent::BeginUpscale));
    }

    #[test]
    fn reset_is_always_accepted() {
        let mut machine = StateMachine::new();
        machine.transition(SessionEvent::LoadImage).unwrap();
        machine.transition(SessionEvent::BeginAutoMask).unwrap();
        assert_eq!(
            machine.transition(SessionEvent::Reset).unwrap(),
            SessionPhase::Empty
        );
    }

    #[test]
    fn transition_records_history_with_ordered_entries() {
        let mut machine = StateMachine::new();
        machine.transition(SessionEvent::LoadImage).unwrap();
        machine.transition(SessionEvent::BeginUpscale).unwrap();
        machine.transition(SessionEvent::RemoteSettled).unwrap();

        assert_eq!(machine.phase(), SessionPhase::Ready);
        assert_eq!(
            machine.history(),
            &[
                StateTransition::new(
                    Some(SessionPhase::Empty),
                    SessionEvent::LoadImage,
                    SessionPhase::Ready
                ),
                StateTransition::new(
                    Some(SessionPhase::Ready),
                    SessionEvent::BeginUpscale,
                    SessionPhase::Upscaling
                ),
                StateTransition::new(
                    Some(SessionPhase::Upscaling),
                    SessionEvent::RemoteSettled,
                    SessionPhase::Ready
                ),
            ]
        );
    }

    #[test]
    fn invalid_transition_returns_error_without_mutating_history() {
        let mut machine = StateMachine::new();

        let err = machine
            .transition(SessionEvent::RemoteSettled)
            .expect_err("empty -> settled should fail");
        assert!(matches!(
            err,
            StateError::InvalidStateTransition {
                from: SessionPhase::Empty,
                event: SessionEvent::RemoteSettled
            }
        ));
        assert_eq!(machine.phase(), SessionPhase::Empty);
        assert!(machine.history().is_empty());
    }
}
