//! Registration screen state machine

use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, watch};

use super::TaskSet;
use crate::repository::UserRepository;

const MIN_PASSWORD_LEN: usize = 6;

/// Observable state backing the registration screen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterState {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub is_submitting: bool,
    pub error_message: Option<String>,
    pub is_success: bool,
}

/// One-shot commands emitted on terminal success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterEvent {
    NavigateToRoleSelection,
}

/// Validates registration input and persists the new user
pub struct RegisterViewModel {
    repo: Arc<dyn UserRepository>,
    state: Arc<watch::Sender<RegisterState>>,
    events: mpsc::UnboundedSender<RegisterEvent>,
    event_rx: Mutex<Option<mpsc::UnboundedReceiver<RegisterEvent>>>,
    tasks: TaskSet,
}

impl RegisterViewModel {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        let (state, _) = watch::channel(RegisterState::default());
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
    pub fn state(&self) -> watch::Receiver<RegisterState> {
        self.state.subscribe()
    }

    /// The current state record
    pub fn snapshot(&self) -> RegisterState {
        self.state.borrow().clone()
    }

    /// Take the command queue; `None` after the first call
    pub fn take_events(&self) -> Option<mpsc::UnboundedReceiver<RegisterEvent>> {
        self.event_rx.lock().unwrap().take()
    }

    pub fn on_full_name_change(&self, value: &str) {
        let full_name = value.to_string();
        self.state.send_modify(|s| {
            s.full_name = full_name;
            s.error_message = None;
            s.is_success = false;
        });
    }

    pub fn on_email_change(&self, value: &str) {
        let email = value.to_string();
        self.state.send_modify(|s| {
            s.email = email;
            s.error_message = None;
            s.is_success = false;
        });
    }

    pub fn on_password_change(&self, value: &str) {
        let password = value.to_string();
        self.state.send_modify(|s| {
            s.password = password;
            s.error_message = None;
            s.is_success = false;
        });
    }

    pub fn on_confirm_password_change(&self, value: &str) {
        let confirm = value.to_string();
        self.state.send_modify(|s| {
            s.confirm_password = confirm;
            s.error_message = None;
            s.is_success = false;
        });
    }

    /// Validate all fields, then persist the new user
    ///
    /// The first failing rule wins; no repository call is made until every
    /// rule passes. Success emits [`RegisterEvent::NavigateToRoleSelection`].
    pub fn on_register_requested(&self) {
        let snapshot = self.snapshot();
        if let Some(error) = validate(&snapshot) {
            self.state
                .send_modify(|s| s.error_message = Some(error.to_string()));
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
                .register_user(&snapshot.full_name, &snapshot.email, &snapshot.password)
                .await
            {
                Ok(_) => {
                    state.send_modify(|s| {
                        s.is_submitting = false;
                        s.is_success = true;
                    });
                    let _ = events.send(RegisterEvent::NavigateToRoleSelection);
                }
                Err(e) => state.send_modify(|s| {
                    s.is_submitting = false;
                    s.is_success = false;
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

fn validate(state: &RegisterState) -> Option<&'static str> {
    if state.full_name.trim().is_empty() {
        return Some("Full name is required");
    }
    if state.email.trim().is_empty() {
        return Some("Email is required");
    }
    if !state.email.contains('@') {
        return Some("Enter a valid email");
    }
    if state.password.chars().count() < MIN_PASSWORD_LEN {
        return Some("Password must be at least 6 characters");
    }
    if state.password != state.confirm_password {
        return Some("Passwords do not match");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryUserRepository;
    use std::time::Duration;
    use tokio::time::timeout;

    fn vm_with_repo() -> (RegisterViewModel, Arc<InMemoryUserRepository>) {
        let repo = Arc::new(InMemoryUserRepository::new());
        (RegisterViewModel::new(repo.clone()), repo)
    }

    fn fill_valid(vm: &RegisterViewModel) {
        vm.on_full_name_change("Ana");
        vm.on_email_change("ana@x.com");
        vm.on_password_change("secret1");
        vm.on_confirm_password_change("secret1");
    }

    #[tokio::test]
    async fn test_blank_name_fails_first() {
        let (vm, repo) = vm_with_repo();
        vm.on_email_change("ana@x.com");
        vm.on_password_change("secret1");
        vm.on_confirm_password_change("secret1");

        vm.on_register_requested();

        assert_eq!(
            vm.snapshot().error_message.as_deref(),
            Some("Full name is required")
        );
        assert_eq!(repo.register_call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_email_fails() {
        let (vm, _repo) = vm_with_repo();
        vm.on_full_name_change("Ana");

        vm.on_register_requested();

        assert_eq!(
            vm.snapshot().error_message.as_deref(),
            Some("Email is required")
        );
    }

    #[tokio::test]
    async fn test_email_without_at_sign_fails() {
        let (vm, _repo) = vm_with_repo();
        vm.on_full_name_change("Ana");
        vm.on_email_change("not-an-email");

        vm.on_register_requested();

        assert_eq!(
            vm.snapshot().error_message.as_deref(),
            Some("Enter a valid email")
        );
    }

    #[tokio::test]
    async fn test_short_password_fails() {
        let (vm, _repo) = vm_with_repo();
        vm.on_full_name_change("Ana");
        vm.on_email_change("ana@x.com");
        vm.on_password_change("12345");

        vm.on_register_requested();

        assert_eq!(
            vm.snapshot().error_message.as_deref(),
            Some("Password must be at least 6 characters")
        );
    }

    #[tokio::test]
    async fn test_mismatched_confirmation_fails() {
        let (vm, repo) = vm_with_repo();
        vm.on_full_name_change("Ana");
        vm.on_email_change("ana@x.com");
        vm.on_password_change("secret1");
        vm.on_confirm_password_change("secret2");

        vm.on_register_requested();

        assert_eq!(
            vm.snapshot().error_message.as_deref(),
            Some("Passwords do not match")
        );
        assert_eq!(repo.register_call_count(), 0);
    }

    #[tokio::test]
    async fn test_successful_registration_emits_event() {
        let (vm, repo) = vm_with_repo();
        fill_valid(&vm);
        let mut events = vm.take_events().unwrap();

        vm.on_register_requested();

        let event = timeout(Duration::from_secs(5), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event, RegisterEvent::NavigateToRoleSelection);
        assert!(vm.snapshot().is_success);
        assert_eq!(repo.register_call_count(), 1);

        let active = repo.active_user().await.unwrap().unwrap();
        assert_eq!(active.email, "ana@x.com");
        assert_eq!(active.role, None);
    }

    #[tokio::test]
    async fn test_editing_clears_error_and_success() {
        let (vm, _repo) = vm_with_repo();
        vm.on_register_requested();
        assert!(vm.snapshot().error_message.is_some());

        vm.on_full_name_change("Ana");
        let state = vm.snapshot();
        assert!(state.error_message.is_none());
        assert!(!state.is_success);
    }
}
