//! Role-selection screen state machine

use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, watch};
use tracing::warn;

use super::TaskSet;
use crate::repository::UserRepository;
use crate::types::UserRole;

/// Roles offered during onboarding
///
/// View-only is assigned elsewhere; the onboarding flow only offers the two
/// roles a fresh user can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleChoice {
    Admin,
    Collaborator,
}

impl From<RoleChoice> for UserRole {
    fn from(choice: RoleChoice) -> Self {
        match choice {
            RoleChoice::Admin => UserRole::Admin,
            RoleChoice::Collaborator => UserRole::Collaborator,
        }
    }
}

/// Observable state backing the role-selection screen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleSelectionState {
    pub selected_role: Option<RoleChoice>,
    pub error_message: Option<String>,
}

/// One-shot commands emitted when the flow moves on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleSelectionEvent {
    NavigateNext,
}

/// Listens to the active user and persists role changes
pub struct RoleSelectionViewModel {
    repo: Arc<dyn UserRepository>,
    state: Arc<watch::Sender<RoleSelectionState>>,
    events: mpsc::UnboundedSender<RoleSelectionEvent>,
    event_rx: Mutex<Option<mpsc::UnboundedReceiver<RoleSelectionEvent>>>,
    tasks: TaskSet,
}

impl RoleSelectionViewModel {
    /// Create the view-model and start watching the active-user stream
    ///
    /// If the active user already carries an offered role it is pre-selected,
    /// so returning to the screen shows the previous choice.
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        let (state, _) = watch::channel(RoleSelectionState::default());
        let state = Arc::new(state);
        let (events, event_rx) = mpsc::unbounded_channel();
        let tasks = TaskSet::new();

        let mut stream = repo.active_user_stream();
        let watcher_state = Arc::clone(&state);
        tasks.track(tokio::spawn(async move {
            loop {
                let choice = stream.borrow_and_update().as_ref().and_then(|user| {
                    match user.role {
                        Some(UserRole::Admin) => Some(RoleChoice::Admin),
                        Some(UserRole::Collaborator) => Some(RoleChoice::Collaborator),
                        _ => None,
                    }
                });
                if let Some(choice) = choice {
                    watcher_state.send_modify(|s| s.selected_role = Some(choice));
                }
                if stream.changed().await.is_err() {
                    break;
                }
            }
        }));

        Self {
            repo,
            state,
            events,
            event_rx: Mutex::new(Some(event_rx)),
            tasks,
        }
    }

    /// Subscribe to state transitions
    pub fn state(&self) -> watch::Receiver<RoleSelectionState> {
        self.state.subscribe()
    }

    /// The current state record
    pub fn snapshot(&self) -> RoleSelectionState {
        self.state.borrow().clone()
    }

    /// Take the command queue; `None` after the first call
    pub fn take_events(&self) -> Option<mpsc::UnboundedReceiver<RoleSelectionEvent>> {
        self.event_rx.lock().unwrap().take()
    }

    pub fn on_role_selected(&self, choice: RoleChoice) {
        self.state.send_modify(|s| {
            s.selected_role = Some(choice);
            s.error_message = None;
        });
    }

    /// Persist the selected role and move the flow forward
    ///
    /// Requires a selection. When no user is active the role is not
    /// persisted but the flow still advances, matching the storage-less
    /// preview path.
    pub fn on_continue(&self) {
        let Some(choice) = self.snapshot().selected_role else {
            self.state
                .send_modify(|s| s.error_message = Some("Select a role to continue".to_string()));
            return;
        };

        let repo = Arc::clone(&self.repo);
        let state = Arc::clone(&self.state);
        let events = self.events.clone();

        self.tasks.track(tokio::spawn(async move {
            let result = async {
                match repo.active_user().await? {
                    Some(user) => repo.update_user_role(user.id, choice.into()).await,
                    None => {
                        warn!("no active user; role selection not persisted");
                        Ok(())
                    }
                }
            }
            .await;

            match result {
                Ok(()) => {
                    let _ = events.send(RoleSelectionEvent::NavigateNext);
                }
                Err(e) => state.send_modify(|s| s.error_message = Some(e.to_string())),
            }
        }));
    }

    /// Abort outstanding work; call on screen teardown
    pub fn dispose(&self) {
        self.tasks.dispose();
    }
}
