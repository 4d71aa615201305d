//! Company-creation screen state machine

use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, watch};

use super::TaskSet;
use crate::repository::{CompanyRepository, UserRepository};
use crate::types::CompanyCategory;

const DEFAULT_EMPLOYEES_COUNT: u32 = 50;

/// Observable state backing the company-creation screen
#[derive(Debug, Clone, PartialEq)]
pub struct CreateCompanyState {
    pub name: String,
    pub category: CompanyCategory,
    pub employees_count: u32,
    pub is_submitting: bool,
    pub error_message: Option<String>,
}

impl Default for CreateCompanyState {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: CompanyCategory::General,
            employees_count: DEFAULT_EMPLOYEES_COUNT,
            is_submitting: false,
            error_message: None,
        }
    }
}

/// One-shot commands emitted on terminal success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateCompanyEvent {
    NavigateHome,
}

/// Creates a company owned by the active user
pub struct CreateCompanyViewModel {
    companies: Arc<dyn CompanyRepository>,
    users: Arc<dyn UserRepository>,
    state: Arc<watch::Sender<CreateCompanyState>>,
    events: mpsc::UnboundedSender<CreateCompanyEvent>,
    event_rx: Mutex<Option<mpsc::UnboundedReceiver<CreateCompanyEvent>>>,
    tasks: TaskSet,
}

impl CreateCompanyViewModel {
    pub fn new(companies: Arc<dyn CompanyRepository>, users: Arc<dyn UserRepository>) -> Self {
        let (state, _) = watch::channel(CreateCompanyState::default());
        let (events, event_rx) = mpsc::unbounded_channel();
        Self {
            companies,
            users,
            state: Arc::new(state),
            events,
            event_rx: Mutex::new(Some(event_rx)),
            tasks: TaskSet::new(),
        }
    }

    /// Subscribe to state transitions
    pub fn state(&self) -> watch::Receiver<CreateCompanyState> {
        self.state.subscribe()
    }

    /// The current state record
    pub fn snapshot(&self) -> CreateCompanyState {
        self.state.borrow().clone()
    }

    /// Take the command queue; `None` after the first call
    pub fn take_events(&self) -> Option<mpsc::UnboundedReceiver<CreateCompanyEvent>> {
        self.event_rx.lock().unwrap().take()
    }

    pub fn on_name_change(&self, value: &str) {
        let name = value.to_string();
        self.state.send_modify(|s| {
            s.name = name;
            s.error_message = None;
        });
    }

    pub fn on_category_selected(&self, category: CompanyCategory) {
        self.state.send_modify(|s| {
            s.category = category;
            s.error_message = None;
        });
    }

    pub fn on_employees_change(&self, count: u32) {
        self.state.send_modify(|s| {
            s.employees_count = count;
            s.error_message = None;
        });
    }

    /// Create the company for the active user
    ///
    /// Requires a non-blank name and an active user; nothing is persisted
    /// when either check fails. Success emits
    /// [`CreateCompanyEvent::NavigateHome`].
    pub fn on_create_requested(&self) {
        let snapshot = self.snapshot();
        if snapshot.name.trim().is_empty() {
            self.state
                .send_modify(|s| s.error_message = Some("Company name is required".to_string()));
            return;
        }

        let companies = Arc::clone(&self.companies);
        let users = Arc::clone(&self.users);
        let state = Arc::clone(&self.state);
        let events = self.events.clone();

        self.tasks.track(tokio::spawn(async move {
            state.send_modify(|s| {
                s.is_submitting = true;
                s.error_message = None;
            });

            let result = async {
                match users.active_user().await? {
                    Some(user) => companies
                        .create_company(
                            user.id,
                            snapshot.name.trim(),
                            snapshot.category,
                            snapshot.employees_count,
                        )
                        .await
                        .map(Some),
                    None => Ok(None),
                }
            }
            .await;

            match result {
                Ok(Some(_)) => {
                    state.send_modify(|s| s.is_submitting = false);
                    let _ = events.send(CreateCompanyEvent::NavigateHome);
                }
                Ok(None) => state.send_modify(|s| {
                    s.is_submitting = false;
                    s.error_message = Some("No active user".to_string());
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
