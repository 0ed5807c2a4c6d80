//! Content script injection: scheduling, isolated worlds, page sessions.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`scheduler`] | Phase-based payload scheduling |
//! | [`worlds`] | Isolated world allocation and registry |
//! | [`session`] | Per-page orchestration of the above |

pub mod scheduler;
pub mod session;
pub mod worlds;

pub use scheduler::{LoadPhase, ScriptScheduler};
pub use session::{BackgroundMessage, PageSession, SessionConfig, SharedSession};
pub use worlds::{WorldAllocator, WorldRegistry, WorldSetup};
