// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Domain service ports: the interfaces infrastructure adapters implement
//! and the application layer depends on. The domain names *what*; it
//! never imports an infrastructure crate to say *how* (spec.md §9).

mod cache;
mod clock;
mod content_store;
pub mod datetime_serde;
mod event_bus;
mod metrics;
mod password_hasher;
mod registry;
mod repositories;
mod stage_ports;
mod task_queue;

pub use cache::{BoxFuture, Cache};
pub use clock::{Clock, SystemClock};
pub use content_store::{BlobMetadata, ContentStore};
pub use event_bus::{EventBus, EventHandler};
pub use metrics::{MetricsCollector, MetricsSnapshot, OperationSnapshot};
pub use password_hasher::PasswordHasher;
pub use registry::{ReadinessState, ServiceRegistry};
pub use repositories::{
    AnalysisRepository, ApiKeyRepository, AuditRepository, EvidenceRepository, UsageRepository, UserRepository,
};
pub use stage_ports::{
    ComplianceAttributes, ComplianceCheckerStage, MotionRecommenderStage, OcrRequest, OcrStage,
    ReportSynthesizerStage, Synthesis, SynthesisInput, TranscriptionRequest, TranscriptionStage, ViolationContext,
    ViolationScannerStage,
};
pub use task_queue::{Backpressure, BoxedTask, TaskQueue};
