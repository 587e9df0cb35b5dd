//! View state machine: which screen the user is on.
//!
//! ```text
//! Home --choose_template--> Editor <--toggle_preview--> Preview
//!   ^                          |                           |
//!   +---------- home ----------+---------------------------+
//! ```
//!
//! The export pipeline bypasses the user transitions with [`ViewController::force`]
//! to bring the preview up and later restore whatever was showing.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

use crate::models::Template;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    Home,
    Editor,
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ViewAction {
    /// Picks a template from the home screen and opens the editor.
    ChooseTemplate { template: Template },
    TogglePreview,
    Home,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot {action:?} from the {from:?} view")]
pub struct ViewError {
    pub from: ViewMode,
    pub action: ViewAction,
}

impl ViewMode {
    /// Next view for a user action, or `None` if the action is not allowed here.
    pub fn next(self, action: ViewAction) -> Option<ViewMode> {
        match (self, action) {
            (ViewMode::Home, ViewAction::ChooseTemplate { .. }) => Some(ViewMode::Editor),
            (ViewMode::Editor, ViewAction::TogglePreview) => Some(ViewMode::Preview),
            (ViewMode::Preview, ViewAction::TogglePreview) => Some(ViewMode::Editor),
            (ViewMode::Editor | ViewMode::Preview, ViewAction::Home) => Some(ViewMode::Home),
            _ => None,
        }
    }
}

/// Shared handle on the current view. Clones observe the same state.
#[derive(Clone)]
pub struct ViewController {
    tx: Arc<watch::Sender<ViewMode>>,
}

impl ViewController {
    pub fn new(initial: ViewMode) -> Self {
        let (tx, _rx) = watch::channel(initial);
        ViewController { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> ViewMode {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewMode> {
        self.tx.subscribe()
    }

    /// Applies a user action.
    pub fn dispatch(&self, action: ViewAction) -> Result<ViewMode, ViewError> {
        let mut result = Err(ViewError {
            from: self.current(),
            action,
        });
        self.tx.send_if_modified(|view| match view.next(action) {
            Some(next) => {
                debug!(from = ?*view, to = ?next, "View transition");
                *view = next;
                result = Ok(next);
                true
            }
            None => {
                result = Err(ViewError {
                    from: *view,
                    action,
                });
                false
            }
        });
        result
    }

    /// Sets the view unconditionally and returns the one it replaced.
    pub fn force(&self, mode: ViewMode) -> ViewMode {
        let previous = self.tx.send_replace(mode);
        if previous != mode {
            debug!(from = ?previous, to = ?mode, "View forced");
        }
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_flow_home_editor_preview() {
        let view = ViewController::new(ViewMode::Home);
        assert_eq!(
            view.dispatch(ViewAction::ChooseTemplate {
                template: Template::Classic
            }),
            Ok(ViewMode::Editor)
        );
        assert_eq!(view.dispatch(ViewAction::TogglePreview), Ok(ViewMode::Preview));
        assert_eq!(view.dispatch(ViewAction::TogglePreview), Ok(ViewMode::Editor));
        assert_eq!(view.dispatch(ViewAction::Home), Ok(ViewMode::Home));
    }

    #[test]
    fn test_invalid_transition_leaves_view_unchanged() {
        let view = ViewController::new(ViewMode::Home);
        let err = view.dispatch(ViewAction::TogglePreview).unwrap_err();
        assert_eq!(err.from, ViewMode::Home);
        assert_eq!(view.current(), ViewMode::Home);
    }

    #[test]
    fn test_force_returns_previous_and_notifies() {
        let view = ViewController::new(ViewMode::Editor);
        let mut rx = view.subscribe();
        assert_eq!(view.force(ViewMode::Preview), ViewMode::Editor);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), ViewMode::Preview);
    }
}
