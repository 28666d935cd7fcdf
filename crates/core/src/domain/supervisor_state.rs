// Supervisor State Machine (strictly forward)

use super::error::{DomainError, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SupervisorState {
    #[default]
    Idle,
    Running,
    ShuttingDown,
    Terminated,
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupervisorState::Idle => write!(f, "IDLE"),
            SupervisorState::Running => write!(f, "RUNNING"),
            SupervisorState::ShuttingDown => write!(f, "SHUTTING_DOWN"),
            SupervisorState::Terminated => write!(f, "TERMINATED"),
        }
    }
}

impl SupervisorState {
    /// The only state reachable from `self`, if any
    pub fn successor(&self) -> Option<SupervisorState> {
        match self {
            SupervisorState::Idle => Some(SupervisorState::Running),
            SupervisorState::Running => Some(SupervisorState::ShuttingDown),
            SupervisorState::ShuttingDown => Some(SupervisorState::Terminated),
            SupervisorState::Terminated => None,
        }
    }

    /// Move to `to`, rejecting anything but the single forward step
    pub fn transition(&mut self, to: SupervisorState) -> Result<()> {
        if self.successor() != Some(to) {
            return Err(DomainError::InvalidStateTransition {
                from: self.to_string(),
                to: to.to_string(),
            });
        }
        *self = to;
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SupervisorState::Terminated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_sequence() {
        let mut state = SupervisorState::default();
        assert_eq!(state, SupervisorState::Idle);

        state.transition(SupervisorState::Running).unwrap();
        state.transition(SupervisorState::ShuttingDown).unwrap();
        state.transition(SupervisorState::Terminated).unwrap();

        assert!(state.is_terminal());
        assert!(state.successor().is_none());
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        let mut state = SupervisorState::Idle;
        assert!(state.transition(SupervisorState::ShuttingDown).is_err());
        assert_eq!(state, SupervisorState::Idle);

        state.transition(SupervisorState::Running).unwrap();
        assert!(state.transition(SupervisorState::Idle).is_err());
        assert!(state.transition(SupervisorState::Running).is_err());

        let mut done = SupervisorState::Terminated;
        let err = done.transition(SupervisorState::Running).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid state transition: TERMINATED -> RUNNING"
        );
    }
}
