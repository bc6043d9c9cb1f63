// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Command-line surface for the `evidence-pipeline` binary.
//!
//! This is a CLI harness for the pipeline library, not the HTTP surface
//! (spec.md §6.1, out of scope) — it exists so the core operations (§4.1,
//! §4.8, §4.9) can be exercised and demonstrated without a server.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "evidence-pipeline", version, about = "Evidence processing and legal analysis core")]
pub struct Cli {
    /// Path to the configuration file (TOML). Falls back to environment
    /// defaults when omitted in development (spec.md §6.4).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ingest an evidence artifact into the Content Store (spec.md §4.1 Ingest).
    Ingest {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        declared_type: String,
        #[arg(long)]
        owner: String,
        #[arg(long)]
        case_number: Option<String>,
        /// Whether the submitted file is the original artifact rather
        /// than a copy or derivative (spec.md §4.5 `COMP-ORIG-001`).
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        original: bool,
        /// Whether the artifact's authenticity has already been
        /// established at the point of submission (spec.md §4.5
        /// `COMP-AUTH-002`).
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        authenticated: bool,
    },
    /// Run the full pipeline over a previously ingested artifact (spec.md §4.1 Process).
    Process {
        #[arg(long)]
        evidence_id: String,
        #[arg(long, default_value = "v3")]
        analyzer_profile_version: String,
    },
    /// Render a completed analysis (spec.md §4.1 Report).
    Report {
        #[arg(long)]
        analysis_id: String,
        #[arg(long, default_value = "canonical-json")]
        format: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Produce a court-export bundle for a completed analysis (spec.md §6.3).
    Export {
        #[arg(long)]
        analysis_id: String,
        #[arg(long)]
        out: PathBuf,
    },
    /// Re-compute and print the audit chain digest for a range (spec.md §4.9 verify).
    AuditVerify {
        #[arg(long)]
        from_partition: String,
        #[arg(long)]
        to_partition: String,
    },
    /// Print liveness status for the configured components (spec.md §6.1 /health).
    Health,
}
