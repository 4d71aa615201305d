//! Shared backstack navigation
//!
//! The navigator holds an in-memory ordered stack of routes; the current
//! screen is the last element. The stack is never empty and is not persisted
//! across process restarts. Subscribers observe every stack transition in
//! order through a watch channel.

use tokio::sync::watch;

/// Destinations reachable from the onboarding flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Welcome,
    Login,
    Register,
    RoleSelection,
    CreateCompany,
    About,
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Route::Welcome => "welcome",
            Route::Login => "login",
            Route::Register => "register",
            Route::RoleSelection => "role-selection",
            Route::CreateCompany => "create-company",
            Route::About => "about",
        };
        write!(f, "{}", name)
    }
}

/// Receiver half of the backstack stream
pub type BackstackStream = watch::Receiver<Vec<Route>>;

/// In-memory route stack driving screen composition
pub struct Navigator {
    stack: watch::Sender<Vec<Route>>,
}

impl Navigator {
    /// Create a navigator rooted at the welcome screen
    pub fn new() -> Self {
        Self::with_root(Route::Welcome)
    }

    /// Create a navigator with a custom root route
    pub fn with_root(root: Route) -> Self {
        let (stack, _) = watch::channel(vec![root]);
        Self { stack }
    }

    /// Push a route onto the stack
    pub fn navigate(&self, route: Route) {
        self.stack.send_modify(|stack| stack.push(route));
    }

    /// Pop the current route
    ///
    /// Returns `false` and leaves the stack unchanged when only the root
    /// remains; a failed pop emits no stack transition.
    pub fn pop(&self) -> bool {
        let mut popped = false;
        self.stack.send_if_modified(|stack| {
            if stack.len() > 1 {
                stack.pop();
                popped = true;
            }
            popped
        });
        popped
    }

    /// Discard the whole stack and restart at a single route
    pub fn replace_all(&self, route: Route) {
        self.stack.send_modify(|stack| {
            stack.clear();
            stack.push(route);
        });
    }

    /// The route currently on top of the stack
    pub fn current(&self) -> Route {
        *self
            .stack
            .borrow()
            .last()
            .expect("backstack is never empty")
    }

    /// Current stack depth
    pub fn depth(&self) -> usize {
        self.stack.borrow().len()
    }

    /// Subscribe to stack transitions
    pub fn subscribe(&self) -> BackstackStream {
        self.stack.subscribe()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}
