//! JDK installer library.
//!
//! This crate turns a vendor JDK archive into a relocated, self-contained
//! installation: the archive is resolved from a catalog, downloaded and
//! verified, unpacked, patched to run against an explicit set of runtime
//! dependencies, and wrapped in launchers that export those dependencies.
//! It is used by the `jdk-installer` CLI binary and can be consumed
//! programmatically for testing or custom installation workflows.
//!
//! # Modules
//!
//! - [`artefact`] - Platforms, digests, download, verification, extraction
//! - [`catalog`] - Catalog document and selector resolution
//! - [`cli`] - Command-line argument definitions
//! - [`command`] - External command execution with timeouts
//! - [`config`] - TOML configuration and lookup order
//! - [`elf`] - ELF inspection and patching through `patchelf`
//! - [`error`] - Semantic error types with recovery hints
//! - [`logging`] - Stderr backend for the `log` facade
//! - [`metadata`] - Setup hook, propagated inputs, install manifest
//! - [`output`] - User-facing message formatting
//! - [`pipeline`] - Install and finalize orchestration
//! - [`relocation`] - Header links, cleanup, library patching
//! - [`updater`] - Catalog regeneration from provider APIs
//! - [`wrapper`] - Launcher script generation

pub mod artefact;
pub mod catalog;
pub mod cli;
pub mod command;
pub mod config;
pub mod elf;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod relocation;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod updater;
pub mod wrapper;
