//! Purpose: Library crate backing the `tailtrim` CLI and its tests.
//! Exports: `core` (line trimming, tree walking, errors).
//! Role: Keeps file mutation logic out of the binary so it can be unit-tested.
//! Invariants: Every file mutation goes through `core::trim::trim_last_line`.
//! Invariants: Core functions take explicit inputs and never print to stdout.
pub mod core;
