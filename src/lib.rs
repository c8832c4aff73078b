//! Blockfall (workspace facade crate).
//!
//! Re-exports the workspace crates under one name: `blockfall::{core, engine, types}`.
//! The rules live in `core`, the async runtime around them in `engine`.

pub use blockfall_core as core;
pub use blockfall_engine as engine;
pub use blockfall_types as types;
