//! View references held by the route table.
//!
//! Views are loaded on first navigation and cached for the lifetime of the
//! route table.

use std::fmt;
use std::sync::OnceLock;

/// The views the application knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    HomePage,
    TraditionMenu,
    ManuscriptMenu,
    FolioMenu,
    FolioViewer,
}

impl ViewKind {
    pub const ALL: [ViewKind; 5] = [
        ViewKind::HomePage,
        ViewKind::TraditionMenu,
        ViewKind::ManuscriptMenu,
        ViewKind::FolioMenu,
        ViewKind::FolioViewer,
    ];

    /// Component name of the view.
    pub fn component(self) -> &'static str {
        match self {
            ViewKind::HomePage => "HomePage",
            ViewKind::TraditionMenu => "TraditionMenu",
            ViewKind::ManuscriptMenu => "ManuscriptMenu",
            ViewKind::FolioMenu => "FolioMenu",
            ViewKind::FolioViewer => "FolioViewer",
        }
    }

    /// Path parameters the view consumes.
    pub fn params(self) -> &'static [&'static str] {
        match self {
            ViewKind::HomePage | ViewKind::TraditionMenu => &[],
            ViewKind::ManuscriptMenu => &["tradition"],
            ViewKind::FolioMenu => &["tradition", "manuscript"],
            ViewKind::FolioViewer => &["tradition", "manuscript", "folio"],
        }
    }

    fn title(self) -> &'static str {
        match self {
            ViewKind::HomePage => "Home",
            ViewKind::TraditionMenu => "Traditions",
            ViewKind::ManuscriptMenu => "Manuscripts",
            ViewKind::FolioMenu => "Folios",
            ViewKind::FolioViewer => "Folio",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.component())
    }
}

/// A loaded view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewDescriptor {
    pub kind: ViewKind,
    pub component: &'static str,
    pub title: &'static str,
    pub params: &'static [&'static str],
}

/// Default loader: describe the view from its kind.
pub fn describe(kind: ViewKind) -> ViewDescriptor {
    ViewDescriptor {
        kind,
        component: kind.component(),
        title: kind.title(),
        params: kind.params(),
    }
}

/// A view reference resolved on first use.
pub struct LazyView {
    kind: ViewKind,
    loader: fn(ViewKind) -> ViewDescriptor,
    loaded: OnceLock<ViewDescriptor>,
}

impl LazyView {
    pub fn new(kind: ViewKind) -> Self {
        Self::with_loader(kind, describe)
    }

    pub fn with_loader(kind: ViewKind, loader: fn(ViewKind) -> ViewDescriptor) -> Self {
        Self {
            kind,
            loader,
            loaded: OnceLock::new(),
        }
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }

    /// Load the view, running the loader at most once.
    pub fn load(&self) -> &ViewDescriptor {
        self.loaded.get_or_init(|| {
            tracing::debug!(view = %self.kind, "Loading view");
            (self.loader)(self.kind)
        })
    }
}

impl fmt::Debug for LazyView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyView")
            .field("kind", &self.kind)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static LOADS: AtomicUsize = AtomicUsize::new(0);

    fn counting_loader(kind: ViewKind) -> ViewDescriptor {
        LOADS.fetch_add(1, Ordering::SeqCst);
        describe(kind)
    }

    #[test]
    fn test_loads_once() {
        let view = LazyView::with_loader(ViewKind::FolioViewer, counting_loader);
        assert!(!view.is_loaded());
        assert_eq!(LOADS.load(Ordering::SeqCst), 0);

        let first = *view.load();
        let second = *view.load();
        assert_eq!(first, second);
        assert!(view.is_loaded());
        assert_eq!(LOADS.load(Ordering::SeqCst), 1);
        assert_eq!(first.params, ["tradition", "manuscript", "folio"]);
    }

    #[test]
    fn test_component_names() {
        let names: Vec<_> = ViewKind::ALL.iter().map(|k| k.to_string()).collect();
        assert_eq!(
            names,
            ["HomePage", "TraditionMenu", "ManuscriptMenu", "FolioMenu", "FolioViewer"]
        );
    }
}
