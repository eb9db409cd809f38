//! Terminal frontends and the collaborator traits the engine talks to
//!
//! The engine never draws anything itself: it hands ordered lines to a
//! [`Renderer`], emits single-line messages through a [`Notifier`], and
//! triggers the host's own documentation hover through a
//! [`HoverFallback`]. This keeps the lookup-and-navigation core
//! independent of any particular frontend and lets tests substitute
//! recording mocks.

pub mod mock;
pub mod pager;
pub mod plain;
pub mod traits;

pub use traits::{
    HoverFallback, Notifier, Placement, Renderer, Severity, SizeClass, ViewRequest,
};
