//! The mounted application and the target it is mounted on.

use std::sync::Arc;

use thiserror::Error;

use crate::http::ApiClient;
use crate::identity::Session;
use crate::observability::metrics;
use crate::routing::{ResolvedRoute, RouteError, Router};

#[derive(Debug, Error)]
pub enum MountError {
    #[error("an application is already mounted on '{0}'")]
    AlreadyMounted(String),

    #[error("mount target failed: {0}")]
    Target(String),
}

/// Everything the views need once the user is authenticated.
#[derive(Debug, Clone)]
pub struct Application {
    router: Arc<Router>,
    api: ApiClient,
    session: Session,
}

impl Application {
    pub fn new(router: Arc<Router>, api: ApiClient, session: Session) -> Self {
        Self { router, api, session }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// The shared client, carrying the session's bearer token.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Resolve a path through the route table.
    pub fn navigate(&self, path: &str) -> Result<ResolvedRoute, RouteError> {
        match self.router.resolve(path) {
            Ok(route) => {
                metrics::record_navigation(route.name(), "ok");
                tracing::info!(
                    path = %route.path,
                    route = route.name(),
                    view = route.view.component,
                    params = %route.params,
                    "Navigated"
                );
                Ok(route)
            }
            Err(e) => {
                metrics::record_navigation("none", "not_found");
                tracing::warn!(path = %path, error = %e, "Navigation failed");
                Err(e)
            }
        }
    }
}

/// Where an application gets mounted.
pub trait Mount {
    fn mount(&mut self, app: Application) -> Result<(), MountError>;
}

/// A single-slot mount target, e.g. `#app`.
#[derive(Debug)]
pub struct MountPoint {
    selector: String,
    app: Option<Application>,
}

impl MountPoint {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            app: None,
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn is_mounted(&self) -> bool {
        self.app.is_some()
    }

    pub fn app(&self) -> Option<&Application> {
        self.app.as_ref()
    }

    pub fn take(&mut self) -> Option<Application> {
        self.app.take()
    }
}

impl Mount for MountPoint {
    fn mount(&mut self, app: Application) -> Result<(), MountError> {
        if self.app.is_some() {
            return Err(MountError::AlreadyMounted(self.selector.clone()));
        }
        tracing::info!(target_selector = %self.selector, "Application mounted");
        self.app = Some(app);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;

    fn app() -> Application {
        Application::new(
            Arc::new(Router::default_table()),
            ApiClient::new(&ApiConfig::default()).unwrap(),
            Session::bearer("t"),
        )
    }

    #[test]
    fn test_mount_once() {
        let mut root = MountPoint::new("#app");
        assert!(!root.is_mounted());

        root.mount(app()).unwrap();
        assert!(root.is_mounted());
        assert!(matches!(root.mount(app()), Err(MountError::AlreadyMounted(s)) if s == "#app"));
    }

    #[test]
    fn test_navigate() {
        let app = app();
        let route = app.navigate("/tradition/abc/def/ghi").unwrap();
        assert_eq!(route.name(), "FolioViewer");
        assert_eq!(route.params.get("folio"), Some("ghi"));
        assert!(app.navigate("/nowhere").is_err());
    }
}
