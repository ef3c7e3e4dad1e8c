//! Built-in per-view templates compiled into the library

use std::path::{Path, PathBuf};
use tracing::info;

use crate::view::View;

/// Contents of the built-in template for `view`
pub fn builtin_template(view: View) -> &'static str {
    match view {
        View::Embedded => include_str!("../templates/embedded.ui"),
        View::Detailed => include_str!("../templates/detailed.ui"),
        View::Engineering => include_str!("../templates/engineering.ui"),
    }
}

/// Write the built-in templates into `dir` as `<view>.ui`
///
/// Existing files are left untouched. Returns the paths written.
pub fn install_builtin_templates(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for view in View::ALL {
        let path = dir.join(format!("{}.ui", view.label()));
        if path.exists() {
            continue;
        }
        std::fs::write(&path, builtin_template(view))?;
        info!(path = %path.display(), "Installed built-in template");
        written.push(path);
    }
    Ok(written)
}
