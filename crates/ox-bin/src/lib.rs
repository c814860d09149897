//! Headless replay of editing-surface scenarios.
//!
//! The `oxsurface` binary loads a TOML scenario, drives a surface built from
//! the headless collaborators through the same event dispatch the async
//! runtime uses, and prints one line per apply pass.

pub mod scenario;

pub use scenario::{PassRecord, Replay, Scenario, ScenarioError, Step, describe, replay};
