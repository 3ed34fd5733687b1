//! `sidenav clean` command implementation.

use super::{ContextArgs, language_label};
use crate::error::CliError;
use crate::output::Output;

/// Drop cached navigation of the selected languages, or of all.
pub(crate) fn execute(context: &ContextArgs) -> Result<(), CliError> {
    let output = Output::new();
    let (config, navigator) = context.navigator()?;

    let selected = context.selected_languages();
    if selected.is_empty() {
        navigator.invalidate(None)?;
        output.success("Cleared cached navigation of all languages");
    } else {
        for lang in selected {
            navigator.invalidate(Some(lang))?;
            output.success(&format!("Cleared cached navigation of {}", language_label(lang)));
        }
    }

    if !config.cache_resolved.enabled {
        output.warning("Snapshot cache is disabled; nothing was stored on disk");
    }
    Ok(())
}
