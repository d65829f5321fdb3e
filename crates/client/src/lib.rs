#![forbid(unsafe_code)]

//! Client for the remote job-shop scheduling service.
//!
//! [`ScheduleClient`] talks to the backend through a [`Transport`] and keeps a
//! [`ScheduleStore`] replica of the server's task and machine lists. Every
//! mutation is followed by a full re-fetch of the affected list; the replica
//! is never patched locally.

mod client;
mod config;
mod error;
mod outcome;
mod store;
mod transport;

pub use client::ScheduleClient;
pub use config::{ClientConfig, ConfigError, API_URL_ENV};
pub use error::ClientError;
pub use outcome::{OptimizerReport, Outcome, OutcomeStatus};
pub use store::{ScheduleState, ScheduleStore};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport, TransportError};
