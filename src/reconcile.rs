//! One module run: refresh, converge, commit.

use declarative::{ApplyContext, ResourceDiff, ResourceState, apply_state};
use log::{debug, info};
use panos::{ApplicationGroup, XmlApi};

use crate::Context;
use crate::config::ModuleArgs;
use crate::connection::{self, Connector, Parent};
use crate::module::{ModuleDiff, ModuleError, ModuleResult};
use crate::resource::{PanResource, XmlApiStore};

/// Connect, resolve the parent scope and reconcile the application group.
pub fn run<C: Connector>(
    connector: &C,
    args: &ModuleArgs,
    ctx: &Context,
) -> Result<ModuleResult, ModuleError> {
    let api = connector.connect(&args.provider).map_err(|e| {
        debug!("{}: {}", e.category(), e.category().advice());
        ModuleError::Connection(format!(
            "Failed to connect to {}: {e}",
            args.provider.ip_address
        ))
    })?;
    let parent = connection::get_parent(&api, args)?;
    reconcile(&api, &parent, args, ctx)
}

/// Bring the application group under `parent` to the declared state.
///
/// A refresh failure aborts before anything is written. A commit is only
/// issued when something changed, `commit` is set and this is not a check
/// run.
pub fn reconcile<A: XmlApi + ?Sized>(
    api: &A,
    parent: &Parent,
    args: &ModuleArgs,
    ctx: &Context,
) -> Result<ModuleResult, ModuleError> {
    let listing: Vec<PanResource<ApplicationGroup>> =
        panos::refreshall::<ApplicationGroup, _>(api, &parent.scope)
            .map_err(ModuleError::Refresh)?
            .into_iter()
            .map(PanResource)
            .collect();
    debug!(
        "{} application group(s) in {} on {} {}",
        listing.len(),
        parent.scope,
        parent.kind,
        parent.info.hostname
    );

    let desired = PanResource(ApplicationGroup::new(
        args.name.as_str(),
        args.applications.clone(),
    ));
    let mut store = XmlApiStore::new(api, &parent.scope);
    let apply_ctx = ApplyContext::new(ctx.check_mode, ctx.verbose > 0);

    let outcome = apply_state(&desired, &listing, args.state, &mut store, &apply_ctx)
        .map_err(ModuleError::Apply)?;
    let changed = outcome.changed();
    debug!(
        "application group '{}' {}",
        args.name,
        outcome.result.verb()
    );

    if changed && args.commit {
        if outcome.applied {
            connection::commit(api).map_err(ModuleError::Commit)?;
        } else {
            info!("Check mode: skipping commit");
        }
    }

    let diff = ctx.diff_mode.then(|| render_diff(&outcome.diff));
    Ok(ModuleResult::exit(changed, "done").with_diff(diff))
}

fn render_diff(diff: &ResourceDiff) -> ModuleDiff {
    ModuleDiff {
        before: render_state(&diff.current),
        after: render_state(&diff.desired),
    }
}

fn render_state(state: &ResourceState) -> String {
    state.details().to_string()
}
