use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Read an image file into memory whole; nothing here interprets its
/// contents — that's `AddressSpace::load_rom`/`load_program`'s job.
pub fn read_image(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read image at {}", path.display()))
}
