//! Export lifecycle:
//!
//! ```text
//! Idle -> Preparing -> Rendering -> Rasterizing -> Encoding -> Done
//!            |            |             |             |
//!            +------------+-------------+-------------+-----> Failed
//! ```
//!
//! `Done` and `Failed` are terminal for one run; a new run starts from either.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportState {
    Idle,
    Preparing,
    Rendering,
    Rasterizing,
    Encoding,
    Done,
    Failed,
}

impl ExportState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ExportState::Done | ExportState::Failed)
    }

    pub fn is_running(self) -> bool {
        !self.is_terminal() && self != ExportState::Idle
    }

    pub fn can_transition_to(self, next: ExportState) -> bool {
        use ExportState::*;
        match (self, next) {
            (Idle | Done | Failed, Preparing) => true,
            (Preparing, Rendering) | (Rendering, Rasterizing) | (Rasterizing, Encoding) => true,
            (Encoding, Done) => true,
            (Preparing | Rendering | Rasterizing | Encoding, Failed) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ExportState::*;
    use super::*;

    #[test]
    fn test_happy_path_is_valid() {
        let path = [Idle, Preparing, Rendering, Rasterizing, Encoding, Done];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_any_running_state_can_fail() {
        for state in [Preparing, Rendering, Rasterizing, Encoding] {
            assert!(state.is_running());
            assert!(state.can_transition_to(Failed));
        }
        assert!(!Idle.can_transition_to(Failed));
        assert!(!Done.can_transition_to(Failed));
    }

    #[test]
    fn test_no_skipping_stages() {
        assert!(!Preparing.can_transition_to(Encoding));
        assert!(!Rendering.can_transition_to(Done));
        assert!(!Idle.can_transition_to(Rendering));
    }

    #[test]
    fn test_finished_runs_can_restart() {
        assert!(Done.can_transition_to(Preparing));
        assert!(Failed.can_transition_to(Preparing));
        assert!(!Done.is_running());
    }
}
