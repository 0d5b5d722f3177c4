//! SnipVault background engine process.
//!
//! `bootstrap` assembles the workspace crates into a running engine and
//! `bridge` connects it to the host application over stdin/stdout.

pub mod bootstrap;
pub mod bridge;
