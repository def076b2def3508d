use std::fs;
use std::path::Path;

use crate::error::Result;

/// Recursively copy `src` into `dest`, overwriting files that already exist.
/// Directories are merged rather than replaced.
pub fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    if src.is_dir() {
        if !dest.is_dir() {
            fs::create_dir_all(dest)?;
        }
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            copy_tree(&entry.path(), &dest.join(entry.file_name()))?;
        }
    } else {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(src, dest)?;
    }
    Ok(())
}
