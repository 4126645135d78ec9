//! Per-endpoint "try it" controller.
//!
//! # Design
//! A `Console` owns the view state of one documented endpoint and nothing
//! else, so consoles never interact. Every invocation takes a [`Ticket`]
//! stamped with a generation number; a result is only applied when its
//! ticket is still the newest one and the console is still waiting. Results
//! of superseded invocations are dropped, which is all the cancellation a
//! one-shot diagnostic tool needs.
//!
//! Callers that run the round-trip elsewhere (another thread, an event loop)
//! use [`Console::begin`] and [`Console::complete`] directly;
//! [`Console::try_it`] does the whole invocation inline.

use crate::assemble::{assemble, Assembly, EndpointSpec};
use crate::descriptor::{read_descriptors, ParameterEntry};
use crate::error::AssemblyError;
use crate::normalize::{normalize_result, OutcomeView};
use crate::transport::Transport;

/// Identity of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleState {
    Idle,
    Showing(OutcomeView),
}

#[derive(Debug, Clone)]
pub struct Console {
    endpoint: EndpointSpec,
    generation: u64,
    state: ConsoleState,
}

impl Console {
    pub fn new(endpoint: EndpointSpec) -> Self {
        Self {
            endpoint,
            generation: 0,
            state: ConsoleState::Idle,
        }
    }

    pub fn endpoint(&self) -> &EndpointSpec {
        &self.endpoint
    }

    pub fn state(&self) -> &ConsoleState {
        &self.state
    }

    /// The outcome on display, `None` while idle.
    pub fn outcome(&self) -> Option<&OutcomeView> {
        match &self.state {
            ConsoleState::Idle => None,
            ConsoleState::Showing(view) => Some(view),
        }
    }

    /// Start an invocation: clears whatever was shown and enters `Pending`.
    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        self.state = ConsoleState::Showing(OutcomeView::Pending);
        Ticket {
            generation: self.generation,
        }
    }

    /// Apply the result of the invocation identified by `ticket`.
    ///
    /// Returns `false` and leaves the view untouched when the ticket has been
    /// superseded, the invocation already finished, or `outcome` is itself
    /// `Pending`.
    pub fn complete(&mut self, ticket: Ticket, outcome: OutcomeView) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                stale = ticket.generation,
                current = self.generation,
                "discarding result of superseded invocation"
            );
            return false;
        }
        if outcome.is_pending() || !matches!(self.state, ConsoleState::Showing(OutcomeView::Pending)) {
            return false;
        }
        self.state = ConsoleState::Showing(outcome);
        true
    }

    /// Back to `Idle`. Results still in flight are discarded when they arrive.
    pub fn dismiss(&mut self) {
        self.generation += 1;
        self.state = ConsoleState::Idle;
    }

    /// Read the parameter rows and assemble the request they describe.
    pub fn prepare(&self, entries: &[ParameterEntry]) -> Result<Assembly, AssemblyError> {
        let descriptors = read_descriptors(entries)?;
        assemble(&self.endpoint, &descriptors)
    }

    /// Run one complete invocation and return the outcome it produced.
    pub fn try_it<T: Transport + ?Sized>(&mut self, transport: &T, entries: &[ParameterEntry]) -> OutcomeView {
        let ticket = self.begin();
        let outcome = match self.prepare(entries) {
            Ok(assembly) => normalize_result(transport.execute(&assembly.request)),
            Err(err) => OutcomeView::Failure(err.to_string()),
        };
        self.complete(ticket, outcome.clone());
        outcome
    }
}
