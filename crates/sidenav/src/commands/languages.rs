//! `sidenav languages` command implementation.

use super::{ContextArgs, language_label};
use crate::error::CliError;
use crate::output::Output;

pub(crate) fn execute(context: &ContextArgs) -> Result<(), CliError> {
    let output = Output::new();
    let config = context.load()?;

    output.info(&format!(
        "Languages in {}",
        config.docs_resolved.source_dir.display()
    ));
    for lang in &config.docs_resolved.languages {
        let dir = if lang.is_empty() {
            config.docs_resolved.source_dir.clone()
        } else {
            config.docs_resolved.source_dir.join(lang)
        };
        if dir.is_dir() {
            output.language(lang);
        } else {
            output.warning(&format!(
                "{} (missing {})",
                language_label(lang),
                dir.display()
            ));
        }
    }
    Ok(())
}
