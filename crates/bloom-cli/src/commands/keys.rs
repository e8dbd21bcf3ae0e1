//! Secret management commands.
//!
//! `bloom keys generate` - Generate a new token signing secret.

use bloom_auth::TokenSecret;
use std::fs;
use std::path::PathBuf;

/// File name used when writing a secret to a directory.
pub const SECRET_FILE: &str = "jwt.secret";

/// Generate a new token signing secret.
pub fn generate(output: Option<PathBuf>) -> anyhow::Result<()> {
    let secret = TokenSecret::generate();

    if let Some(output_dir) = output {
        fs::create_dir_all(&output_dir)?;

        let secret_path = output_dir.join(SECRET_FILE);
        secret.save_to_file(&secret_path)?;

        println!("✔ Generated token secret: {}", secret_path.display());
        println!();
        println!("⚠️  Keep this secret private. Anyone holding it can mint envelopes.");
        println!();
        println!("Set as environment variable:");
        println!("  export JWT_SECRET=$(cat {})", secret_path.display());
        println!("or point auth.secret_file at it in your config.");
    } else {
        println!("{}", secret.expose());
        println!();
        println!("Use --output <dir> to save the secret to a file.");
    }

    Ok(())
}
