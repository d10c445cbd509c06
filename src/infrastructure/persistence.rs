use crate::domain::errors::PricingResult;
use std::fs;
use std::path::Path;

/// Writes `bytes` to `path` via a temp file and rename, creating parent directories.
///
/// Readers never observe a half-written file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> PricingResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, bytes)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}
