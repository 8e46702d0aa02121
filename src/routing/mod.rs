//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Navigation (path, optional query/fragment)
//!     → router.rs (strip base, scan table)
//!     → matcher.rs (match template, extract params)
//!     → view.rs (load view on first use)
//!     → Return: ResolvedRoute or NotFound
//!
//! Route table (at startup):
//!     "/"                                        → home        (HomePage)
//!     "/traditions"                              → traditions  (TraditionMenu)
//!     "/tradition/:tradition"                    → ManuscriptMenu
//!     "/tradition/:tradition/:manuscript"        → FolioMenu
//!     "/tradition/:tradition/:manuscript/:folio" → FolioViewer
//! ```
//!
//! # Design Decisions
//! - Routes built at startup, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: same input always matches same route
//! - First match wins (table order)

pub mod matcher;
pub mod router;
pub mod view;

pub use matcher::{Matcher, PathTemplate, RouteParams};
pub use router::{ResolvedRoute, RouteEntry, RouteError, Router};
pub use view::{LazyView, ViewDescriptor, ViewKind};
