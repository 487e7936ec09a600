//! # Confgen Library
//!
//! Generates a `pyrightconfig.json` whose search paths resolve inside a
//! developer's workspace instead of the read-only package deployment the
//! runtime environment points at.
//!
//! ## Quick Example
//!
//! ```
//! use confgen::identity::{fingerprint, RootPrefixes};
//!
//! let roots = RootPrefixes::new(["/site/packages/int/"]);
//! let id = roots.decompose("/site/packages/int/foo/1.2.0/python");
//! assert_eq!(id.package_name, "foo");
//! assert_eq!(fingerprint("abc"), "ba7816");
//! ```
//!
//! ## Core Concepts
//!
//! - **Path identity (`identity`)**: Splits a search path into root prefix,
//!   package name and remainder, and derives a short fingerprint.
//! - **Local mirror (`mirror`)**: Copies or links each search path into a
//!   workspace directory keyed by package and fingerprint.
//! - **Repository directory (`directory`)**: Reads package names from cloned
//!   repositories and maps them back to the clones.
//! - **Clone orchestration (`orchestrator`, `git`, `hosting`, `credentials`)**:
//!   Lists an organization's repositories and clones or force-updates them
//!   in parallel.
//! - **Path translation (`translate`)**: Rewrites search paths to the
//!   matching directory inside a clone.
//! - **IDE configuration (`ide_config`)**: Merges the resulting paths into
//!   the pyright configuration file.
//!
//! ## Execution Flow
//!
//! `confgen generate` collects the search paths from the environment, then
//! either mirrors them (`--method localized`) or translates them against the
//! organization's clones (`--method repo`), and finally writes the IDE
//! configuration.

pub mod config;
pub mod credentials;
pub mod defaults;
pub mod directory;
pub mod error;
pub mod git;
pub mod hosting;
pub mod ide_config;
pub mod identity;
pub mod mirror;
pub mod orchestrator;
pub mod pattern;
pub mod translate;

#[cfg(test)]
mod identity_proptest;
