//! Headless engine for CastPoll, a poll mini-app that runs embedded in a
//! Farcaster client. Polls live entirely in the visiting browser: the engine
//! keeps one serialized collection of polls, derives expiry/winner state on
//! demand, and talks to the embedding host only for viewer identity, the
//! ready signal, and the share composer. The rendering layer on top of this
//! crate is expected to be a thin view over [`shell::AppShell`].

#[macro_use]
extern crate tracing;

pub mod bridge;
pub mod config;
pub mod create;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod model;
pub mod shell;
pub mod store;
pub mod vote;

pub use config::AppConfig;
pub use error::{BridgeError, PollError};
pub use model::{Fid, Poll, PollDuration, PollOption};
pub use shell::{AppShell, Route, View};
pub use store::PollStore;
pub use vote::PollView;
