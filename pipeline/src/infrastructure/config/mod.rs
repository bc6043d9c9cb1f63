// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Configuration (spec.md §6.4): a single bag with a fixed, enumerated key
//! set, layered defaults → file → environment, unknown keys rejected.

pub mod app_config;

pub use app_config::{AppConfig, CacheBackend, Environment, TierLimits};
