//! Section reordering: turns a finished drag gesture into a new section order.
//!
//! A move is applied whole or not at all. Cancelled gestures and indices that
//! fall outside the sequence leave the order untouched.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::Section;

/// What the drag-and-drop collaborator reports when a gesture ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropEvent {
    pub source: usize,
    /// `None` when the gesture was cancelled or dropped outside the list.
    pub destination: Option<usize>,
}

impl DropEvent {
    pub fn new(source: usize, destination: Option<usize>) -> Self {
        DropEvent {
            source,
            destination,
        }
    }
}

/// Returns the sequence with `sections[source]` relocated to `destination`.
pub fn move_section(sections: &[Section], event: DropEvent) -> Vec<Section> {
    let Some(destination) = event.destination else {
        debug!(source = event.source, "Drag cancelled, order unchanged");
        return sections.to_vec();
    };
    if event.source >= sections.len() || destination >= sections.len() {
        debug!(
            source = event.source,
            destination,
            len = sections.len(),
            "Drop outside the section list, order unchanged"
        );
        return sections.to_vec();
    }

    let mut next = sections.to_vec();
    let moved = next.remove(event.source);
    next.insert(destination, moved);
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SectionId, SectionType};

    fn sections(ids: &[&str]) -> Vec<Section> {
        ids.iter()
            .map(|id| Section {
                id: SectionId::new(*id),
                title: id.to_uppercase(),
                kind: SectionType::Text,
                is_visible: true,
                items: vec![],
            })
            .collect()
    }

    fn ids(sections: &[Section]) -> Vec<&str> {
        sections.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_cancelled_drop_is_identity() {
        let input = sections(&["a", "b", "c"]);
        let out = move_section(&input, DropEvent::new(1, None));
        assert_eq!(out, input);
    }

    #[test]
    fn test_move_down_and_up() {
        let input = sections(&["a", "b", "c", "d"]);
        assert_eq!(ids(&move_section(&input, DropEvent::new(0, Some(2)))), ["b", "c", "a", "d"]);
        assert_eq!(ids(&move_section(&input, DropEvent::new(3, Some(0)))), ["d", "a", "b", "c"]);
    }

    #[test]
    fn test_same_index_is_identity() {
        let input = sections(&["a", "b", "c"]);
        assert_eq!(move_section(&input, DropEvent::new(1, Some(1))), input);
    }

    #[test]
    fn test_out_of_range_indices_leave_order_untouched() {
        let input = sections(&["a", "b"]);
        assert_eq!(move_section(&input, DropEvent::new(2, Some(0))), input);
        assert_eq!(move_section(&input, DropEvent::new(0, Some(5))), input);
        assert!(move_section(&[], DropEvent::new(0, Some(0))).is_empty());
    }

    /// Exhaustive over every valid (source, destination) pair of a small list:
    /// the result is a permutation, the moved section lands at `destination`, and
    /// everything else keeps its relative order.
    #[test]
    fn test_every_valid_move_is_a_pure_relocation() {
        let input = sections(&["a", "b", "c", "d", "e"]);
        for source in 0..input.len() {
            for destination in 0..input.len() {
                let out = move_section(&input, DropEvent::new(source, Some(destination)));
                assert_eq!(out.len(), input.len());
                assert_eq!(out[destination], input[source]);

                let mut rest_in: Vec<_> = input.clone();
                rest_in.remove(source);
                let mut rest_out = out.clone();
                rest_out.remove(destination);
                assert_eq!(rest_in, rest_out, "source={source} destination={destination}");
            }
        }
    }
}
