// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap
//!
//! Sits outside the domain/application/infrastructure layers and owns
//! everything a binary entry point needs before the first line of
//! business logic runs:
//!
//! - CLI argument parsing and validation ([`cli`])
//! - Logging/tracing setup ([`logger`])
//! - Unix-style exit code mapping ([`exit_code`])
//!
//! Enterprise layers (domain, application, infrastructure, in the
//! `evidence-pipeline` crate) never depend on this crate; this crate may
//! depend on them.

pub mod cli;
pub mod exit_code;
pub mod logger;

pub use cli::{Cli, Command};
pub use exit_code::{map_core_error_kind, ExitCode};
pub use logger::{init as init_logging, LogFormat};
