//! Gateway implementations

mod builder;
mod orchestrator;

pub use builder::{Muninn, MuninnBuilder};
pub use orchestrator::{FetchOrchestrator, MAX_LIMIT, MIN_LIMIT};
