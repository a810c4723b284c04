//! Logical navigation destinations and a push-only history.

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Home,
    SignUp,
}

impl Route {
    pub fn path<'a>(&self, routes: &'a Routes) -> &'a str {
        match self {
            Route::Login => &routes.login,
            Route::Home => &routes.home,
            Route::SignUp => &routes.signup,
        }
    }
}

/// Path for each route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Routes {
    pub login: String,
    pub home: String,
    pub signup: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            login: "/".to_string(),
            home: "/home".to_string(),
            signup: "/signup".to_string(),
        }
    }
}

impl Routes {
    pub fn resolve(&self, path: &str) -> Option<Route> {
        [Route::Login, Route::Home, Route::SignUp]
            .into_iter()
            .find(|route| route.path(self) == path)
    }
}

/// History of visited routes. Starts at the login entry point.
#[derive(Debug, Clone)]
pub struct Navigator {
    history: Vec<Route>,
    redirected: bool,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Login)
    }
}

impl Navigator {
    pub fn new(start: Route) -> Self {
        Self {
            history: vec![start],
            redirected: false,
        }
    }

    pub fn push(&mut self, route: Route) {
        debug!(?route, "Navigating");
        self.history.push(route);
        self.redirected = true;
    }

    pub fn current(&self) -> Route {
        self.history.last().copied().unwrap_or(Route::Login)
    }

    pub fn history(&self) -> &[Route] {
        &self.history
    }

    /// The current route if anything was pushed since the last call.
    pub fn take_redirect(&mut self) -> Option<Route> {
        if std::mem::take(&mut self.redirected) {
            Some(self.current())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let routes = Routes::default();
        assert_eq!(Route::Login.path(&routes), "/");
        assert_eq!(Route::Home.path(&routes), "/home");
        assert_eq!(Route::SignUp.path(&routes), "/signup");
    }

    #[test]
    fn test_resolve() {
        let routes = Routes {
            home: "/todos".to_string(),
            ..Routes::default()
        };
        assert_eq!(routes.resolve("/todos"), Some(Route::Home));
        assert_eq!(routes.resolve("/"), Some(Route::Login));
        assert_eq!(routes.resolve("/home"), None);
    }

    #[test]
    fn test_navigator_push_and_take_redirect() {
        let mut nav = Navigator::default();
        assert_eq!(nav.current(), Route::Login);
        assert_eq!(nav.take_redirect(), None);

        nav.push(Route::Home);
        assert_eq!(nav.current(), Route::Home);
        assert_eq!(nav.take_redirect(), Some(Route::Home));
        assert_eq!(nav.take_redirect(), None);
        assert_eq!(nav.history(), &[Route::Login, Route::Home]);
    }
}
