//! Apply declared state - the compare-then-mutate step

use crate::context::ApplyContext;
use crate::diff::ResourceDiff;
use crate::resource::{Resource, Store};
use crate::types::{ApplyResult, DesiredState};
#[cfg(test)]
use crate::types::ResourceState;
use anyhow::Result;
use log::{debug, info};

/// What [`apply_state`] decided and whether it was carried out
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    /// The change that was (or in check mode, would have been) made
    pub result: ApplyResult,
    /// Before/after state of the resource
    pub diff: ResourceDiff,
    /// False when check mode suppressed the mutation
    pub applied: bool,
}

impl ApplyOutcome {
    /// Whether the resource changed (or would change in check mode)
    pub fn changed(&self) -> bool {
        self.result.is_change()
    }
}

/// Converge one resource to its declared state
///
/// Looks up `desired` by id in `listing` (the resources that currently
/// exist), then:
///
/// | state   | existing        | action            |
/// |---------|-----------------|-------------------|
/// | present | none            | `store.create`    |
/// | present | differs         | `store.update`    |
/// | present | same            | nothing           |
/// | absent  | some            | `store.delete`    |
/// | absent  | none            | nothing           |
///
/// In check mode the store is never called; the outcome still reports
/// the change that would have been made.
pub fn apply_state<R, S>(
    desired: &R,
    listing: &[R],
    state: DesiredState,
    store: &mut S,
    ctx: &ApplyContext,
) -> Result<ApplyOutcome>
where
    R: Resource,
    S: Store<R> + ?Sized,
{
    let current = listing.iter().find(|r| r.id() == desired.id());
    let diff = ResourceDiff::between(desired, current, state);

    let result = match (state, current) {
        (DesiredState::Present, None) => ApplyResult::Created,
        (DesiredState::Present, Some(existing)) if desired.same_as(existing) => {
            ApplyResult::NoChange
        }
        (DesiredState::Present, Some(_)) => ApplyResult::Modified,
        (DesiredState::Absent, Some(_)) => ApplyResult::Removed,
        (DesiredState::Absent, None) => ApplyResult::NoChange,
    };

    if !result.is_change() {
        debug!("{} already {}", desired.description(), state);
        return Ok(ApplyOutcome {
            result,
            diff,
            applied: false,
        });
    }

    if ctx.verbose {
        debug!(
            "{} before:\n{}after:\n{}",
            desired.description(),
            diff.current.details(),
            diff.desired.details()
        );
    }

    if ctx.check_mode {
        info!("Check mode: {} would be {}", desired.description(), result.verb());
        return Ok(ApplyOutcome {
            result,
            diff,
            applied: false,
        });
    }

    match current {
        None => store.create(desired)?,
        Some(existing) if state == DesiredState::Absent => store.delete(existing)?,
        Some(existing) => store.update(desired, existing)?,
    }
    info!("{} {}", desired.description(), result.verb());

    Ok(ApplyOutcome {
        result,
        diff,
        applied: true,
    })
}
