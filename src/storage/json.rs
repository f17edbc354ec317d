use crate::error::{Result, SpeedRegionsError};
use crate::files::{CompiledSpeedRulesFile, UncompiledSpeedRulesFile};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

fn read<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    serde_json::from_reader(reader).map_err(|e| {
        SpeedRegionsError::SerializationErrorWithContext(format!(
            "Failed to parse {}: {}",
            path.display(),
            e
        ))
    })
}

fn write<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| {
        SpeedRegionsError::SerializationErrorWithContext(format!(
            "Failed to write {}: {}",
            path.display(),
            e
        ))
    })?;
    writer.flush()?;
    Ok(())
}

pub fn load_uncompiled<P: AsRef<Path>>(path: P) -> Result<UncompiledSpeedRulesFile> {
    read(path.as_ref())
}

pub fn save_uncompiled<P: AsRef<Path>>(path: P, file: &UncompiledSpeedRulesFile) -> Result<()> {
    write(path.as_ref(), file)
}

pub fn load_compiled<P: AsRef<Path>>(path: P) -> Result<CompiledSpeedRulesFile> {
    read(path.as_ref())
}

pub fn save_compiled<P: AsRef<Path>>(path: P, file: &CompiledSpeedRulesFile) -> Result<()> {
    write(path.as_ref(), file)
}
