//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store the route table
//! - Look up the matching route for a path
//! - Return the matched route or an explicit no-match
//! - Build paths from named routes
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in table order; first match wins
//! - Explicit NotFound rather than a silent fallback route

use thiserror::Error;

use crate::routing::matcher::{normalize, Matcher, PathTemplate, RouteParams};
use crate::routing::view::{LazyView, ViewDescriptor, ViewKind};

/// Routing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("no route matches '{0}'")]
    NotFound(String),

    #[error("unknown route '{0}'")]
    UnknownRoute(String),

    #[error("route '{route}' requires parameter '{param}'")]
    MissingParam { route: String, param: String },

    #[error("invalid route template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },
}

/// One row of the route table.
#[derive(Debug)]
pub struct RouteEntry {
    pub template: PathTemplate,
    pub name: Option<&'static str>,
    pub view: LazyView,
}

impl RouteEntry {
    pub fn new(template: &str, name: Option<&'static str>, view: LazyView) -> Result<Self, RouteError> {
        Ok(Self {
            template: PathTemplate::parse(template)?,
            name,
            view,
        })
    }

    fn builtin(template: &'static str, name: Option<&'static str>, kind: ViewKind) -> Self {
        Self {
            template: PathTemplate::from_static(template),
            name,
            view: LazyView::new(kind),
        }
    }

    /// Route name, or the view's component name for unnamed routes.
    pub fn label(&self) -> &'static str {
        self.name.unwrap_or_else(|| self.view.kind().component())
    }
}

/// Outcome of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// Declared route name, if the route has one.
    pub route_name: Option<&'static str>,
    pub view: ViewDescriptor,
    pub params: RouteParams,
    /// The normalized path that was resolved.
    pub path: String,
}

impl ResolvedRoute {
    /// Route name, or the view's component name for unnamed routes.
    pub fn name(&self) -> &'static str {
        self.route_name.unwrap_or(self.view.component)
    }
}

/// Immutable route table.
#[derive(Debug)]
pub struct Router {
    base: String,
    routes: Vec<RouteEntry>,
}

impl Router {
    pub fn new(routes: Vec<RouteEntry>) -> Self {
        Self {
            base: String::new(),
            routes,
        }
    }

    /// The application's route table: home → traditions → manuscripts → folios.
    pub fn default_table() -> Self {
        Self::new(vec![
            RouteEntry::builtin("/", Some("home"), ViewKind::HomePage),
            RouteEntry::builtin("/traditions", Some("traditions"), ViewKind::TraditionMenu),
            RouteEntry::builtin("/tradition/:tradition", None, ViewKind::ManuscriptMenu),
            RouteEntry::builtin("/tradition/:tradition/:manuscript", None, ViewKind::FolioMenu),
            RouteEntry::builtin(
                "/tradition/:tradition/:manuscript/:folio",
                None,
                ViewKind::FolioViewer,
            ),
        ])
    }

    /// Serve the table below a base path (e.g. `/viewer`).
    pub fn with_base(mut self, base: &str) -> Self {
        self.base = base.trim_end_matches('/').to_string();
        self
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    /// Resolve a path to its view and parameters.
    pub fn resolve(&self, path: &str) -> Result<ResolvedRoute, RouteError> {
        let local = self.strip_base(path).ok_or_else(|| RouteError::NotFound(path.to_string()))?;

        for entry in &self.routes {
            if let Some(params) = entry.template.match_path(local) {
                let view = *entry.view.load();
                tracing::debug!(
                    path = %local,
                    route = entry.label(),
                    view = view.component,
                    params = %params,
                    "Route resolved"
                );
                return Ok(ResolvedRoute {
                    route_name: entry.name,
                    view,
                    params,
                    path: normalize(local).unwrap_or(local).to_string(),
                });
            }
        }

        tracing::debug!(path = %path, "No route matched");
        Err(RouteError::NotFound(path.to_string()))
    }

    /// Build a path (including the base) for a route name or view component name.
    pub fn href(&self, name: &str, params: &RouteParams) -> Result<String, RouteError> {
        let entry = self
            .routes
            .iter()
            .find(|e| e.name == Some(name))
            .or_else(|| self.routes.iter().find(|e| e.name.is_none() && e.view.kind().component() == name))
            .ok_or_else(|| RouteError::UnknownRoute(name.to_string()))?;

        let path = entry.template.render(params)?;
        if self.base.is_empty() {
            Ok(path)
        } else if path == "/" {
            Ok(format!("{}/", self.base))
        } else {
            Ok(format!("{}{}", self.base, path))
        }
    }

    fn strip_base<'a>(&self, path: &'a str) -> Option<&'a str> {
        if self.base.is_empty() {
            return Some(path);
        }
        let rest = path.strip_prefix(self.base.as_str())?;
        match rest.chars().next() {
            Some('/') => Some(rest),
            // "/viewer", "/viewer?x" and "/viewer#x" address the root
            None | Some('?') | Some('#') => Some("/"),
            // "/viewerx" is a different path
            Some(_) => None,
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::default_table()
    }
}
