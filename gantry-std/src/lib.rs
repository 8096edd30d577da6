//! # gantry-std
//!
//! Standard implementations for the Gantry request-handling framework.
//!
//! This crate provides:
//! - **Argument resolution**: [`resolve`], [`resolve_for_message`]
//! - **Metadata registry**: [`MetadataRegistry`], [`RegistryBuilder`]
//! - **Hook pipeline**: [`HookPipeline`]
//! - **Dispatch**: [`Dispatcher`], [`ActionHandler`]
//! - **Standard hooks**: Response cache, Logging
//! - **Stores**: [`MemoryCacheStore`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use gantry_core;

// Modules
pub mod dispatch;
pub mod hooks;
pub mod pipeline;
pub mod registry;
pub mod resolve;
pub mod store;
pub mod testing;

pub use dispatch::{ActionHandler, Dispatcher, FnHandler, handler_fn};
pub use pipeline::HookPipeline;
pub use registry::{MetadataRegistry, RegistryBuilder};
pub use resolve::{parse_cookies, query_params, resolve, resolve_for_message};
pub use store::MemoryCacheStore;
