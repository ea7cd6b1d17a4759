//! my-finances: the state containers and month aggregation behind a personal income and expense
//! tracker.
//!
//! Screens are [`container::Container`]s driving a [`container::Reducer`]. They reach data only
//! through the use cases in [`usecase`], which wrap a [`repository::FinanceRepository`] and report
//! every load as a [`state::GenericState`].

pub mod aggregation;
pub mod args;
pub mod commands;
mod config;
pub mod container;
mod error;
pub mod model;
pub mod repository;
pub mod screens;
pub mod state;
pub mod usecase;
mod utils;


pub use config::Config;
pub use error::Error;
pub use error::Result;
