use std::collections::HashSet;

use crate::catalog::StepDescriptor;
use crate::tour::traits::{ElementHandle, TargetResolution, TargetResolver};

/// Resolves every target except an explicit set of missing ones.
///
/// Used by the replay binary and by hosts that render without a live page.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    missing: HashSet<String>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_missing<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            missing: targets.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_missing(&self, target: &str) -> bool {
        self.missing.contains(target)
    }
}

impl TargetResolver for StaticResolver {
    fn resolve(&self, step: &StepDescriptor) -> TargetResolution {
        if self.is_missing(&step.target) {
            return TargetResolution::NotFound;
        }
        // Stable per-target node id so repeated resolutions agree.
        let node_id = step
            .target
            .bytes()
            .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));
        TargetResolution::Found(ElementHandle::new(step.target.clone(), node_id))
    }

    fn scroll_into_view(&self, handle: &ElementHandle) {
        tracing::trace!(target_ref = %handle.target, node_id = handle.node_id, "Scrolling target into view");
    }
}
