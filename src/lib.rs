//! Core library for the aideon-tablediff command line application.
//!
//! The library compares two snapshots of the same tabular dataset and reports
//! unchanged, added, removed and modified records. Responsibilities are kept
//! narrow: records are shaped in [`aideon::tablediff::mapper`] with keys from
//! [`aideon::tablediff::key`], matched by the merge in
//! [`aideon::tablediff::align`], laid out by [`aideon::tablediff::report`],
//! and read or written by the adapters under [`aideon::tablediff::io`]. The
//! [`aideon::tablediff::compare::compare_tables`] entry point is pure and does
//! no IO.

pub mod aideon;

pub use aideon::tablediff::{
    Result, ToolError, align, compare, config, error, io, key, mapper, model, report, run,
    transform,
};
