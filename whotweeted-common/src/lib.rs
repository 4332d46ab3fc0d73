//! Shared plumbing for the Who Tweeted? workspace.
//!
//! Today that is only [`observability`]: every binary and integration test
//! routes its `tracing` output through the same initializer so logs land in one
//! rolling file and never interleave with the game on stdout.
pub mod observability;
