//! CLI command implementations for Bloom.

pub mod keys;
pub mod token;
pub mod wallet;

use std::fs;
use std::path::Path;

/// Read a token given either literally or as a path to a file holding it.
pub(crate) fn read_token(token: String) -> anyhow::Result<String> {
    let path = Path::new(&token);
    if path.exists() {
        Ok(fs::read_to_string(path)?.trim().to_string())
    } else {
        Ok(token.trim().to_string())
    }
}
