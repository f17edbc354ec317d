//! Binary snapshots of compiled rule files.
//!
//! A snapshot is a magic header, a format version byte and the bincode
//! encoding of a [`CompiledSpeedRulesFile`]. Snapshots are written to a
//! temporary file, synced and renamed over the target, so a reader never
//! sees a partial file.

use crate::error::{Result, SpeedRegionsError};
use crate::files::CompiledSpeedRulesFile;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const SNAPSHOT_MAGIC: &[u8] = b"SPEEDREGIONS_SNAPSHOT";
const SNAPSHOT_VERSION: u8 = 1;

pub fn load<P: AsRef<Path>>(path: P) -> Result<CompiledSpeedRulesFile> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);

    let mut magic = vec![0u8; SNAPSHOT_MAGIC.len()];
    if reader.read_exact(&mut magic).is_err() || magic != SNAPSHOT_MAGIC {
        return Err(SpeedRegionsError::InvalidFormat);
    }

    let mut version = [0u8; 1];
    reader.read_exact(&mut version)?;
    if version[0] != SNAPSHOT_VERSION {
        return Err(SpeedRegionsError::InvalidFormat);
    }

    bincode::deserialize_from(reader).map_err(|e| {
        SpeedRegionsError::SerializationErrorWithContext(format!(
            "Failed to decode snapshot {}: {}",
            path.display(),
            e
        ))
    })
}

pub fn save<P: AsRef<Path>>(path: P, file: &CompiledSpeedRulesFile) -> Result<()> {
    let path = path.as_ref();
    let temp_path = temp_path(path);

    let out = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)?;
    let mut writer = BufWriter::new(out);

    writer.write_all(SNAPSHOT_MAGIC)?;
    writer.write_all(&[SNAPSHOT_VERSION])?;
    bincode::serialize_into(&mut writer, file).map_err(|e| {
        SpeedRegionsError::SerializationErrorWithContext(format!(
            "Failed to encode snapshot: {}",
            e
        ))
    })?;

    writer.flush()?;
    let out = writer.into_inner().map_err(|e| e.into_error())?;
    out.sync_all()?;
    drop(out);

    std::fs::rename(&temp_path, path)?;
    sync_parent_dir(path)?;

    log::debug!("Wrote speed regions snapshot to {}", path.display());
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut temp = path.to_path_buf();
    if let Some(name) = temp.file_name() {
        let mut new_name = name.to_string_lossy().into_owned();
        new_name.push_str(".tmp");
        temp.set_file_name(new_name);
    }
    temp
}

fn sync_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        let dir = File::open(parent)?;
        dir.sync_all()?;
    }
    Ok(())
}
