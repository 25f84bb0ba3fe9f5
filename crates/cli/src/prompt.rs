//! Interactive overwrite confirmation.

use dialoguer::Confirm;
use dialoguer::theme::ColorfulTheme;
use migrant_codegen::OverwritePrompt;
use migrant_core::{GenError, GenResult};
use std::io::IsTerminal;
use std::path::Path;

/// Asks on the terminal before replacing an existing migration.
///
/// Without a terminal on stdin the answer is always "no".
pub struct DialoguerPrompt {
    theme: ColorfulTheme,
}

impl std::fmt::Debug for DialoguerPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialoguerPrompt")
            .field("theme", &"ColorfulTheme")
            .finish()
    }
}

impl DialoguerPrompt {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl OverwritePrompt for DialoguerPrompt {
    fn confirm_overwrite(&self, path: &Path) -> GenResult<bool> {
        if !std::io::stdin().is_terminal() {
            tracing::debug!(path = %path.display(), "stdin is not a terminal, keeping file");
            return Ok(false);
        }

        Confirm::with_theme(&self.theme)
            .with_prompt(format!("{} already exists. Overwrite it?", path.display()))
            .default(false)
            .interact_opt()
            .map_err(|e| GenError::Prompt(e.to_string()))?
            .ok_or(GenError::Cancelled)
    }
}
