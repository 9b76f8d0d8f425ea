//! Domain models and parameter types.
//!
//! Domain models are converted from entity models at the repository boundary so
//! services never handle raw database rows. Operation-specific parameter types
//! (`Create*Param`, `Update*Param`) carry input into the repositories.

pub mod clan;
pub mod event;
pub mod health;
pub mod player_link;
pub mod reminder;
pub mod scheduler;
