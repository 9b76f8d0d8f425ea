//! Reminder engine services.
//!
//! The engine runs in two passes driven by the job scheduler. The materializer
//! resolves live event windows through the game-data client and writes one scheduler
//! record per (rule, clan, event instance, lead time). The dispatcher claims due
//! records, renders them against live clan state and hands them to a delivery sink,
//! retrying transient failures from an in-memory queue.
//!
//! External I/O sits behind the `GameDataClient` and `DeliverySink` traits so the
//! passes can be tested with mocks.

pub mod clash_api;
pub mod delivery;
pub mod dispatch;
pub mod event_window;
pub mod game_data;
pub mod materializer;
pub mod reminder_rule;
pub mod render;
pub mod retry;
