//! Wallet files for found keypairs

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use solvanity_core::{GeneratedKeypair, SearchSummary};

/// Everything a user needs to import the keypair, in one JSON document
#[derive(Debug, Serialize)]
pub struct WalletInfo<'a> {
    pub public_key: &'a str,
    pub private_key: String,
    pub keypair: &'a [u8],
    pub network: &'a str,
    pub prefix: &'a str,
    pub attempts: u64,
    pub time_secs: f64,
}

impl<'a> WalletInfo<'a> {
    pub fn new(keypair: &'a GeneratedKeypair, summary: &'a SearchSummary, network: &'a str) -> Self {
        Self {
            public_key: keypair.address(),
            private_key: keypair.secret_base58(),
            keypair: keypair.keypair_bytes(),
            network,
            prefix: &summary.prefix,
            attempts: summary.attempts,
            time_secs: summary.time_secs,
        }
    }
}

/// Write `<address>.json` (solana-keygen layout) and `<address>.wallet.json`
/// into `dir`. Both files hold secret material: they are created owner-only
/// on unix, and existing files are never overwritten.
pub fn write_wallet_files(dir: &Path, wallet: &WalletInfo<'_>, keypair: &GeneratedKeypair) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let keypair_path = dir.join(format!("{}.json", wallet.public_key));
    write_private(&keypair_path, keypair.keypair_bytes_json().as_bytes())?;

    let wallet_path = dir.join(format!("{}.wallet.json", wallet.public_key));
    let json = serde_json::to_string_pretty(wallet)?;
    write_private(&wallet_path, json.as_bytes())?;

    Ok((keypair_path, wallet_path))
}

fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}
