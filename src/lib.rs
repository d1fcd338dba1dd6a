//! Copydesk drives a content site's AI processing pipeline from the
//! operator's side. It pulls the pending article queue from the studio
//! API, makes sure the local inference engine is up, processes the
//! queue one item at a time and sorts the results into published, held
//! and failed. A timer can take over and repeat the pass on a fixed
//! interval, never letting two runs overlap.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod grading;
pub mod queue;
pub mod runner;
pub mod scheduler;
pub mod stats;
pub mod store;
pub mod ui;

pub use error::CopydeskError;
