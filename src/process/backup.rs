//! Generational backup files for in-place formatting.

use std::io;
use std::path::{Path, PathBuf};

/// Rotate numbered backups and write a fresh backup copy of `path`.
///
/// The previous backup `<file>.~` is shuffled through `<file>.1~` to
/// `<file>.4~` (oldest dropped), then the current contents are copied to
/// `<file>.~`. The original is later rewritten in place, which preserves its
/// inode and any hard links.
pub fn write_backup(path: &Path) -> io::Result<()> {
    let name = path.to_string_lossy();
    let backup = PathBuf::from(format!("{name}.~"));
    let numbered: Vec<PathBuf> = (1..=4)
        .map(|n| PathBuf::from(format!("{name}.{n}~")))
        .collect();

    if backup.is_file() {
        if numbered[0].is_file() {
            if numbered[1].is_file() {
                if numbered[2].is_file() {
                    std::fs::rename(&numbered[2], &numbered[3])?;
                }
                std::fs::rename(&numbered[1], &numbered[2])?;
            }
            std::fs::rename(&numbered[0], &numbered[1])?;
        }
        std::fs::rename(&backup, &numbered[0])?;
    }

    std::fs::copy(path, &backup)?;
    Ok(())
}
