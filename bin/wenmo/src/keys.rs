use anyhow::{Context, Result};
use ed25519_dalek::SigningKey;
use std::fs;
use std::path::Path;
use tracing::info;
use wenmo_rpc::{generate_signing_key, signing_key_from_hex};

pub fn load_signing_key<P: AsRef<Path>>(path: P) -> Result<SigningKey> {
    let path = path.as_ref();
    let encoded = fs::read_to_string(path).with_context(|| format!("Failed to read key file {:?}", path))?;
    let key = signing_key_from_hex(&encoded).with_context(|| format!("Invalid key file {:?}", path))?;
    Ok(key)
}

pub fn load_or_generate_key<P: AsRef<Path>>(path: P) -> Result<SigningKey> {
    let path = path.as_ref();
    if path.exists() {
        info!("Loading key from {:?}", path);
        return load_signing_key(path);
    }

    info!("Generating new key");
    let key = generate_signing_key();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format!("0x{}\n", hex::encode(key.to_bytes())))
        .with_context(|| format!("Failed to write key file {:?}", path))?;
    restrict_permissions(path)?;
    Ok(key)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
