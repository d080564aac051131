// events.rs - Progress events published to the observer

use std::fmt;

use serde::Serialize;

use crate::grid::Cell;

/// Lifecycle phase carried by `Event::StateChange`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum State {
    Executing,
    Quitting,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Executing => write!(f, "Executing"),
            State::Quitting  => write!(f, "Quitting"),
        }
    }
}

/// One record on the event stream. The stream is one-directional: the
/// engine only ever sends, and closes it after the final `Quitting`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    StateChange { completed_turns: usize, new_state: State },
    AliveCellsCount { completed_turns: usize, cells_count: usize },
    TurnComplete { completed_turns: usize },
    FinalTurnComplete { completed_turns: usize, alive: Vec<Cell> },
    ImageOutputComplete { completed_turns: usize, filename: String },
}

impl Event {
    pub fn completed_turns(&self) -> usize {
        match self {
            Event::StateChange { completed_turns, .. }
            | Event::AliveCellsCount { completed_turns, .. }
            | Event::TurnComplete { completed_turns }
            | Event::FinalTurnComplete { completed_turns, .. }
            | Event::ImageOutputComplete { completed_turns, .. } => *completed_turns,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::StateChange { new_state, .. } => write!(f, "{new_state}"),
            Event::AliveCellsCount { cells_count, .. } => write!(f, "Alive Cells {cells_count}"),
            Event::TurnComplete { completed_turns } => write!(f, "Turn {completed_turns} complete"),
            Event::FinalTurnComplete { alive, .. } => write!(f, "Final Turn Complete ({} alive)", alive.len()),
            Event::ImageOutputComplete { filename, .. } => write!(f, "File {filename} output complete"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::AliveCellsCount { completed_turns: 4, cells_count: 9 };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"AliveCellsCount","completed_turns":4,"cells_count":9}"#);
    }

    #[test]
    fn display_matches_observer_wording() {
        let quit = Event::StateChange { completed_turns: 10, new_state: State::Quitting };
        assert_eq!(quit.to_string(), "Quitting");
        assert_eq!(quit.completed_turns(), 10);
        let out = Event::ImageOutputComplete { completed_turns: 10, filename: "16x16x10".into() };
        assert_eq!(out.to_string(), "File 16x16x10 output complete");
    }
}
