//! Current-route lookup and login redirects.

use std::sync::{Mutex, PoisonError};
use tracing::info;

/// Query parameter that carries the return target on the login route.
pub const REDIRECT_PARAM: &str = "redirect";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: String,
    pub full_path: String,
    pub query: Vec<(String, String)>,
}

impl Route {
    pub fn new(name: impl Into<String>, full_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_path: full_path.into(),
            query: Vec::new(),
        }
    }

    /// Parses `full_path`, naming the route after its first segment (`home` for `/`).
    pub fn from_path(full_path: &str) -> Self {
        let (path, query) = full_path.split_once('?').unwrap_or((full_path, ""));
        let name = path
            .trim_start_matches('/')
            .split('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("home");
        Self {
            name: name.to_owned(),
            full_path: full_path.to_owned(),
            query: query
                .split('&')
                .filter(|pair| !pair.is_empty())
                .map(|pair| {
                    let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                    (k.to_owned(), v.to_owned())
                })
                .collect(),
        }
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

pub trait Navigator: Send + Sync {
    fn current_route(&self) -> Route;

    /// Navigates to the login view, remembering `return_to` for after login.
    fn redirect_to_login(&self, return_to: &str);

    /// Navigates to an application path such as `/problems/7?tab=solutions`.
    fn navigate(&self, full_path: &str);
}

/// In-memory router that keeps every route it visited.
#[derive(Debug)]
pub struct HistoryNavigator {
    login_route: String,
    history: Mutex<Vec<Route>>,
}

impl HistoryNavigator {
    pub fn new(start: Route, login_route: impl Into<String>) -> Self {
        Self {
            login_route: login_route.into(),
            history: Mutex::new(vec![start]),
        }
    }

    pub fn push(&self, route: Route) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route);
    }

    pub fn history(&self) -> Vec<Route> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// How many times the login view was pushed.
    pub fn login_redirects(&self) -> usize {
        self.history()
            .iter()
            .skip(1)
            .filter(|r| r.name == self.login_route)
            .count()
    }
}

impl Navigator for HistoryNavigator {
    fn current_route(&self) -> Route {
        let history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        history
            .last()
            .cloned()
            .unwrap_or_else(|| Route::new("home", "/"))
    }

    fn redirect_to_login(&self, return_to: &str) {
        info!(return_to, "Redirecting to login");
        let mut login = Route::new(self.login_route.clone(), format!("/{}", self.login_route));
        login
            .query
            .push((REDIRECT_PARAM.to_owned(), return_to.to_owned()));
        self.push(login);
    }

    fn navigate(&self, full_path: &str) {
        info!(full_path, "Navigating");
        self.push(Route::from_path(full_path));
    }
}
