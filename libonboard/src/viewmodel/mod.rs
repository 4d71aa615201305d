//! View-model state machines for the onboarding screens
//!
//! Each view-model holds one small state record behind a watch channel and
//! transitions through editing, submitting, and either an error message or a
//! terminal success. State updates replace the whole record under the
//! channel lock, so observers never see partial states.
//!
//! One-shot navigation commands travel through a separate mpsc queue with a
//! single consumer: unlike state, a command is delivered exactly once and is
//! never re-delivered to a late or repeated subscriber.
//!
//! Repository calls run as spawned tokio tasks. The view-model does not
//! guard against double submission; the rendering layer disables the submit
//! control while `is_submitting` is set. Screen teardown must call
//! `dispose()` to abort outstanding tasks; disposal is explicit, not
//! automatic.

use std::sync::Mutex;

use tokio::task::JoinHandle;

pub mod create_company;
pub mod login;
pub mod register;
pub mod role_selection;

pub use create_company::{CreateCompanyEvent, CreateCompanyState, CreateCompanyViewModel};
pub use login::{LoginEvent, LoginState, LoginViewModel};
pub use register::{RegisterEvent, RegisterState, RegisterViewModel};
pub use role_selection::{RoleChoice, RoleSelectionEvent, RoleSelectionState, RoleSelectionViewModel};

/// Tracks the spawned tasks owned by one view-model
pub(crate) struct TaskSet {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl TaskSet {
    pub(crate) fn new() -> Self {
        Self {
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Record a spawned task, pruning any that already finished
    pub(crate) fn track(&self, handle: JoinHandle<()>) {
        let mut handles = self.handles.lock().unwrap();
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    /// Abort every outstanding task
    pub(crate) fn dispose(&self) {
        let mut handles = self.handles.lock().unwrap();
        for handle in handles.drain(..) {
            handle.abort();
        }
    }
}
