//! Link state machine

/// Network link states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// Not associated; each tick retries association
    Disconnected,
    /// Associated with a listener; each tick serves and draws
    Connected,
}

/// Events that move the link between states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// Association succeeded
    Associated,
    /// Association attempt exhausted its polls
    AssociationFailed,
    /// A liveness check found the link down
    AssociationLost,
}

impl LinkState {
    /// Whether ticks in this state service connections
    pub fn is_connected(&self) -> bool {
        matches!(self, LinkState::Connected)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: LinkEvent) -> Self {
        use LinkEvent::*;
        use LinkState::*;

        match (self, event) {
            (Disconnected, Associated) => Connected,
            (Disconnected, AssociationFailed) => Disconnected,
            (Connected, AssociationLost) => Disconnected,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_associate_connects() {
        let next = LinkState::Disconnected.transition(LinkEvent::Associated);
        assert_eq!(next, LinkState::Connected);
        assert!(next.is_connected());
    }

    #[test]
    fn test_failure_stays_disconnected() {
        let next = LinkState::Disconnected.transition(LinkEvent::AssociationFailed);
        assert_eq!(next, LinkState::Disconnected);
    }

    #[test]
    fn test_loss_disconnects() {
        let next = LinkState::Connected.transition(LinkEvent::AssociationLost);
        assert_eq!(next, LinkState::Disconnected);
        assert!(!next.is_connected());
    }

    #[test]
    fn test_irrelevant_events_ignored() {
        assert_eq!(
            LinkState::Connected.transition(LinkEvent::Associated),
            LinkState::Connected
        );
        assert_eq!(
            LinkState::Disconnected.transition(LinkEvent::AssociationLost),
            LinkState::Disconnected
        );
    }
}
