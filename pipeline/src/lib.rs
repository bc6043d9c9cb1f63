// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Evidence Pipeline
//!
//! The application and infrastructure layers built on top of
//! `evidence-domain`: the Evidence Processor, Access & Quota Gate,
//! Chain-of-Custody audit logger, and every concrete adapter that
//! implements a domain service port (content store, cache, metrics,
//! event bus, task queue, repositories, stage adapters).
//!
//! Following the domain crate's own rule, this crate never reaches
//! back below it: `application` depends only on `evidence_domain`
//! traits, and `infrastructure` is the only place a SQL query, a
//! filesystem path, or a third-party crate name appears.

pub mod application;
pub mod infrastructure;

pub use evidence_domain as domain;
