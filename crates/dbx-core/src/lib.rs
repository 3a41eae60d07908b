pub mod api;
pub mod builder;
pub mod bundle;
pub mod config;
pub mod deploy;
pub mod error;
pub mod install;
pub mod job;
pub mod paths;
pub mod run;
pub mod upload;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{DbxError, Result};
