use chrono::NaiveDateTime;

use crate::error::FlockError;

/// A closed status type with an explicit transition table.
pub trait Transitions: Copy + PartialEq + std::fmt::Display + 'static {
    const ENTITY: &'static str;

    /// States reachable from `self`, in the order a single "advance" should prefer.
    fn next_states(&self) -> &'static [Self];

    fn can_transition_to(&self, to: Self) -> bool {
        self.next_states().contains(&to)
    }

    fn is_final(&self) -> bool {
        self.next_states().is_empty()
    }

    fn check_transition(&self, to: Self) -> Result<(), FlockError> {
        if self.can_transition_to(to) {
            Ok(())
        } else {
            Err(FlockError::InvalidTransition {
                entity: Self::ENTITY,
                from: self.to_string(),
                to: to.to_string(),
            })
        }
    }
}

/// A record whose status moves only along its status type's transition table.
pub trait Lifecycle: Clone {
    type Status: Transitions;

    fn status(&self) -> Self::Status;
    fn set_status(&mut self, status: Self::Status);

    /// Side effects of entering `status`, e.g. stamping a sent time.
    fn entered(&mut self, _status: Self::Status, _now: NaiveDateTime) {}

    /// A copy of `self` moved to `to`, or the rejected transition.
    fn transitioned(&self, to: Self::Status, now: NaiveDateTime) -> Result<Self, FlockError> {
        self.status().check_transition(to)?;
        let mut next = self.clone();
        next.set_status(to);
        next.entered(to, now);
        Ok(next)
    }

    /// Moves to the preferred next state.
    fn advanced(&self, now: NaiveDateTime) -> Result<Self, FlockError> {
        let current = self.status();
        match current.next_states().first() {
            Some(to) => self.transitioned(*to, now),
            None => Err(FlockError::InvalidTransition {
                entity: <Self::Status as Transitions>::ENTITY,
                from: current.to_string(),
                to: "any other status".to_string(),
            }),
        }
    }
}
