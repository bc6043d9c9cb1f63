// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Tracing/logging initialization.
//!
//! Development gets a human-readable, ANSI-colored format; production
//! gets newline-delimited JSON so log shippers can parse it without a
//! grammar. Both honor `RUST_LOG` via [`EnvFilter`].

use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Development,
    Production,
}

pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Development => {
            fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(true)
                .init();
        }
        LogFormat::Production => {
            fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .json()
                .flatten_event(true)
                .init();
        }
    }
}
