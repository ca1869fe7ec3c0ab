// SPDX-License-Identifier: MIT

//! Effective agent set for one scan request (§4.4 step 2).
//!
//! An explicit `agents` list on the request is honored verbatim — including
//! an agent whose declared languages don't match, which still gets invoked
//! and relies on its own internal gating (§4.3) to no-op. Auto-select mode
//! (empty `agents`) pre-filters by language so a scan for one language
//! doesn't spawn containers for agents that declare no support for it at
//! all; each selected agent still re-checks scope itself before running.

use std::sync::Arc;

use scan_agents::Agent;
use scan_core::ScanRequest;

/// Pick which registered agents run for `request`.
pub fn select_agents(agents: &[Arc<dyn Agent>], request: &ScanRequest) -> Vec<Arc<dyn Agent>> {
    if request.has_explicit_agents() {
        agents
            .iter()
            .filter(|agent| {
                request.agents.iter().any(|name| name.eq_ignore_ascii_case(&agent.describe().name))
            })
            .cloned()
            .collect()
    } else {
        agents
            .iter()
            .filter(|agent| {
                let descriptor = agent.describe();
                request.languages.is_empty()
                    || request.languages.iter().any(|l| descriptor.supports_language(l))
            })
            .cloned()
            .collect()
    }
}
