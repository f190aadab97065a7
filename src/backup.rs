use anyhow::{anyhow, Context};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const DATA_ENTRY: &str = "data/flagmaster.json";
pub const BUNDLE_FORMAT_V1: &str = "flagmaster-backup-v1";

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub bytes: usize,
    pub sha256: String,
}

pub fn backup_file_name(date: &str) -> String {
    format!("FlagMaster_Backup_{date}.json")
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    Ok(())
}

/// Writes the document text verbatim to `<out_dir>/FlagMaster_Backup_<date>.json`.
pub fn export_json_backup(document: &str, out_dir: &Path, date: &str) -> anyhow::Result<ExportSummary> {
    if document.trim().is_empty() {
        return Err(anyhow!("refusing to write an empty backup"));
    }
    let path = out_dir.join(backup_file_name(date));
    ensure_parent(&path)?;
    std::fs::write(&path, document.as_bytes())
        .with_context(|| format!("failed to write backup {}", path.to_string_lossy()))?;
    Ok(ExportSummary {
        path,
        bytes: document.len(),
        sha256: sha256_hex(document.as_bytes()),
    })
}

/// Zip bundle with a manifest that records the format and the data entry's checksum.
pub fn export_backup_bundle(document: &str, out_path: &Path) -> anyhow::Result<ExportSummary> {
    ensure_parent(out_path)?;
    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let exported_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let sha256 = sha256_hex(document.as_bytes());
    let manifest = json!({
        "format": BUNDLE_FORMAT_V1,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": exported_at,
        "dataEntry": DATA_ENTRY,
        "sha256": sha256,
        "bytes": document.len()
    });
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    zip.start_file(DATA_ENTRY, opts)
        .context("failed to start data entry")?;
    zip.write_all(document.as_bytes())
        .context("failed to write data entry")?;

    zip.finish().context("failed to finalize zip bundle")?;

    Ok(ExportSummary {
        path: out_path.to_path_buf(),
        bytes: document.len(),
        sha256,
    })
}
