#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Shared models, parsing and validation for the job-shop schedule client.

pub mod api;
pub mod model;
pub mod time;
pub mod validation;

pub use api::*;
pub use model::*;
pub use time::{format_optimizer_start, parse_timestamp};
pub use validation::*;
