//! Asset path conventions.

use std::path::{Path, PathBuf};

/// Directory under the asset root that holds `.tetra` files.
pub const TETRA_DIR: &str = "Tetra";

/// `<asset_dir>/Tetra/<name>.tetra`
pub fn tetra_path(asset_dir: &Path, name: &str) -> PathBuf {
    asset_dir.join(TETRA_DIR).join(format!("{name}.tetra"))
}

/// `<asset_dir>/<name>.obj`
pub fn visual_path(asset_dir: &Path, name: &str) -> PathBuf {
    asset_dir.join(format!("{name}.obj"))
}
