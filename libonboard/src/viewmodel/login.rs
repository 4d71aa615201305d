//! Login screen state machine

use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, watch};

use super::TaskSet;
use crate::repository::UserRepository;

/// Observable state backing the login screen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginState {
    pub email: String,
    pub password: String,
    pub is_submitting: bool,
    pub error_message: Option<String>,
}

/// One-shot commands emitted on terminal success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginEvent {
    NavigateHome,
}

/// Validates credentials against the user repository
pub struct LoginViewModel {
    repo: Arc<dyn UserRepository>,
    state: Arc<watch::Sender<LoginState>>,
    events: mpsc::UnboundedSender<LoginEvent>,
    event_rx: Mutex<Option<mpsc::UnboundedReceiver<LoginEvent>>>,
    tasks: TaskSet,
}

impl LoginViewModel {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        let (state, _) = watch::channel(LoginState::default());
        let (events, event_rx) = mpsc::unbounded_channel();
        Self {
            repo,
            state: Arc::new(state),
            events,
            event_rx: Mutex::new(Some(event_rx)),
            tasks: TaskSet::new(),
        }
    }

    /// Subscribe to state transitions
    pub fn state(&self) -> watch::Receiver<LoginState> {
        self.state.subscribe()
    }

    /// The current state record
    pub fn snapshot(&self) -> LoginState {
        self.state.borrow().clone()
    }

    /// Take the command queue; `None` after the first call
    pub fn take_events(&self) -> Option<mpsc::UnboundedReceiver<LoginEvent>> {
        self.event_rx.lock().unwrap().take()
    }

    pub fn on_email_change(&self, value: &str) {
        let email = value.to_string();
        self.state.send_modify(|s| s.email = email);
    }

    pub fn on_password_change(&self, value: &str) {
        let password = value.to_string();
        self.state.send_modify(|s| s.password = password);
    }

    pub fn clear_error(&self) {
        self.state.send_modify(|s| s.error_message = None);
    }

    /// Validate input and issue the credential check
    ///
    /// Blank email or password fails before any repository call. A false
    /// result surfaces a generic invalid-credentials message; success emits
    /// [`LoginEvent::NavigateHome`].
    pub fn on_login_requested(&self) {
        let snapshot = self.snapshot();
        if snapshot.email.trim().is_empty() || snapshot.password.trim().is_empty() {
            self.state.send_modify(|s| {
                s.error_message = Some("Email and password are required".to_string());
                s.is_submitting = false;
            });
            return;
        }

        let repo = Arc::clone(&self.repo);
        let state = Arc::clone(&self.state);
        let events = self.events.clone();

        self.tasks.track(tokio::spawn(async move {
            state.send_modify(|s| {
                s.is_submitting = true;
                s.error_message = None;
            });

            match repo
                .validate_credentials(&snapshot.email, &snapshot.password)
                .await
            {
                Ok(true) => {
                    state.send_modify(|s| s.is_submitting = false);
                    let _ = events.send(LoginEvent::NavigateHome);
                }
                Ok(false) => state.send_modify(|s| {
                    s.is_submitting = false;
                    s.error_message = Some("Invalid credentials".to_string());
                }),
                Err(e) => state.send_modify(|s| {
                    s.is_submitting = false;
                    s.error_message = Some(e.to_string());
                }),
            }
        }));
    }

    /// Abort outstanding work; call on screen teardown
    pub fn dispose(&self) {
        self.tasks.dispose();
    }
}
