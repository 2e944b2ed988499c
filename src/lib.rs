//! Dockhand Library
//!
//! An interactive docker shell: a reedline REPL whose completion engine
//! resolves the cursor's position into a command context and assembles
//! suggestions from a static catalog, the local engine, and Docker Hub.

pub mod cli;
pub mod completion;
pub mod engine;
pub mod registry;
