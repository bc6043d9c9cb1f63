// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Service Registry port (spec.md §2, §4.10, §9): name -> instance lookup.
//! Registration is idempotent; deregistration marks an instance
//! not-ready but keeps it reachable until drained. Returns fixed, typed
//! capability references — never name-based reflective dispatch (spec.md
//! §9 "Reflective/dynamic dispatch over 'services'").

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessState {
    Ready,
    Draining,
}

pub trait ServiceRegistry: Send + Sync {
    fn register(&self, name: &str);
    fn deregister(&self, name: &str);
    fn readiness(&self, name: &str) -> Option<ReadinessState>;
    fn registered_names(&self) -> Vec<String>;
}
