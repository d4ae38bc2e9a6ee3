//! App shell: route table, entry overlay, and the global loading bar.

pub mod animation;
pub mod progress;
pub mod routes;

pub use animation::{EntryAnimation, EntryAnimationHandle, EntryPhase};
pub use progress::{LoadingProgress, ProgressState};
pub use routes::{navigate, resolve_route, Location, Page};
