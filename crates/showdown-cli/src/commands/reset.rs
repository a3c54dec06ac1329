use super::context::AppContext;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use showdown_core::StateStore;
use std::path::Path;

pub fn run_reset(config_path: Option<&Path>, output: &Output) -> Result<()> {
    let ctx = AppContext::load(config_path)?;
    let store = StateStore::new(ctx.state_file());

    let removed = store
        .reset()
        .map_err(|e| eyre!("Failed to reset rotation state at {}: {}", store.path().display(), e))?;

    if removed {
        output.success(format!("Cleared rotation state: {}", store.path().display()));
    } else {
        output.info("No rotation state found to clear");
    }
    Ok(())
}
