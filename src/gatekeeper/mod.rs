//! Gatekeeper: the host tool's pre/post mutation hook.
//!
//! Before a file mutation the gatekeeper asks the coordinator for a lease
//! and turns the answer into a [`Verdict`]; after the mutation it releases
//! the lease. It fails open: any storage or input problem yields
//! [`Verdict::Warn`] and the mutation proceeds. The only blocking case is a
//! successfully read live lease owned by another agent.

mod hook;
mod policy;

pub use hook::{HookInput, ToolInput, normalize_lexically, operation_for_tool};
pub use policy::ExclusionPolicy;

use crate::context::LockContext;
use crate::error::Result;
use crate::identity::{IdentitySource, resolve_agent_id};
use crate::journal::{ActivityAction, ActivityEvent};
use crate::locks::{AcquireOutcome, AcquireRequest, LockCoordinator, ReleaseOutcome};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What the host tool should do with the pending mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Proceed.
    Allow,
    /// Do not proceed; show `reason` to the agent.
    Block { reason: String },
    /// Proceed, but coordination could not be checked.
    Warn { message: String },
}

/// Pre/post mutation hook over a coordinator and an exclusion policy.
#[derive(Debug, Clone)]
pub struct Gatekeeper {
    coordinator: LockCoordinator,
    policy: ExclusionPolicy,
    fallback_cwd: PathBuf,
}

impl Gatekeeper {
    pub fn new(
        coordinator: LockCoordinator,
        policy: ExclusionPolicy,
        fallback_cwd: PathBuf,
    ) -> Self {
        Self {
            coordinator,
            policy,
            fallback_cwd,
        }
    }

    /// Build a gatekeeper from a resolved context. The lock and activity
    /// directories are always excluded.
    pub fn from_context(ctx: &LockContext, fallback_cwd: PathBuf) -> Result<Self> {
        let policy = ExclusionPolicy::from_patterns(&ctx.config.exclude_patterns)?
            .with_excluded_dir(&ctx.lock_dir)
            .with_excluded_dir(&ctx.activity_dir);

        Ok(Self::new(
            LockCoordinator::from_context(ctx),
            policy,
            fallback_cwd,
        ))
    }

    pub fn coordinator(&self) -> &LockCoordinator {
        &self.coordinator
    }

    /// The agent id for a hook invocation.
    pub fn agent_for(&self, input: &HookInput) -> String {
        resolve_agent_id(&IdentitySource::from_env(input.session_id.as_deref()))
    }

    /// Decide whether the mutation described by `input` may proceed.
    pub fn before_mutation(&self, input: &HookInput) -> Verdict {
        let agent_id = self.agent_for(input);
        self.before_mutation_as(input, &agent_id)
    }

    /// [`before_mutation`](Self::before_mutation) for an already-resolved agent.
    pub fn before_mutation_as(&self, input: &HookInput, agent_id: &str) -> Verdict {
        let Some(target) = self.guarded_target(input) else {
            return Verdict::Allow;
        };
        let path = target.to_string_lossy().to_string();
        let operation = input.operation();

        let req = AcquireRequest::new(&path, agent_id, &operation)
            .with_session(input.session_id.as_deref());

        match self.coordinator.acquire(&req) {
            Ok(AcquireOutcome::Granted(_)) => Verdict::Allow,
            Ok(AcquireOutcome::DeniedBy(info)) => {
                self.coordinator.journal().record(
                    &ActivityEvent::new(ActivityAction::LockDenied, agent_id)
                        .with_resource(path.as_str())
                        .with_details(json!({
                            "owner_agent_id": info.owner_agent_id,
                            "owner_operation": info.operation,
                            "remaining_minutes": info.remaining_minutes,
                            "tool": input.tool_name,
                        })),
                );
                Verdict::Block {
                    reason: format!(
                        "{}. Another agent is working on this file; wait for the lease to be \
                         released or expire, or work on a different file.",
                        info
                    ),
                }
            }
            Err(e) => {
                warn!(resource = %path, error = %e, "lock check failed; allowing operation");
                Verdict::Warn {
                    message: format!(
                        "could not check lock for '{}' ({}); proceeding without a lease",
                        path, e
                    ),
                }
            }
        }
    }

    /// Release the lease taken for `input` and record the operation.
    ///
    /// `NotHeld` and `NotOwner` are informational. Storage errors are logged
    /// and reported as `NotHeld`.
    pub fn after_mutation(&self, input: &HookInput) -> ReleaseOutcome {
        let agent_id = self.agent_for(input);
        self.after_mutation_as(input, &agent_id)
    }

    /// [`after_mutation`](Self::after_mutation) for an already-resolved agent.
    pub fn after_mutation_as(&self, input: &HookInput, agent_id: &str) -> ReleaseOutcome {
        let Some(target) = self.guarded_target(input) else {
            return ReleaseOutcome::NotHeld;
        };
        let path = target.to_string_lossy().to_string();

        self.coordinator.journal().record(
            &ActivityEvent::new(ActivityAction::Operation, agent_id)
                .with_resource(path.as_str())
                .with_details(json!({
                    "tool": input.tool_name,
                    "operation": input.operation(),
                })),
        );

        match self.coordinator.release(&path, agent_id) {
            Ok(outcome) => {
                debug!(resource = %path, agent = agent_id, %outcome, "post-mutation release");
                outcome
            }
            Err(e) => {
                warn!(resource = %path, error = %e, "release after mutation failed");
                ReleaseOutcome::NotHeld
            }
        }
    }

    /// The resolved target path, unless the input names none or it is excluded.
    fn guarded_target(&self, input: &HookInput) -> Option<PathBuf> {
        let target = input.resolved_target(&self.fallback_cwd)?;
        let base = input
            .cwd
            .as_deref()
            .map(Path::new)
            .unwrap_or(&self.fallback_cwd);

        if self.policy.is_excluded(&target, Some(base)) {
            debug!(resource = %target.display(), "path excluded from locking");
            return None;
        }
        Some(target)
    }
}
