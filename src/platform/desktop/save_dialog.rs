use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rfd::FileDialog;
use tracing::info;

use crate::usecase::services::export_service::{ExportFile, ExportFormat};

fn format_of(filename: &str) -> ExportFormat {
    if filename.to_ascii_lowercase().ends_with(".xlsx") {
        ExportFormat::Xlsx
    } else {
        ExportFormat::Csv
    }
}

pub fn write_export(path: &Path, file: &ExportFile) -> Result<()> {
    fs::write(path, &file.bytes)
        .with_context(|| format!("failed to write export: {}", path.display()))?;
    info!(path = %path.display(), bytes = file.bytes.len(), "export saved");
    Ok(())
}

/// Asks where to save `file`. `Ok(None)` means the dialog was cancelled.
pub fn save_export(file: &ExportFile) -> Result<Option<PathBuf>> {
    let format = format_of(&file.filename);
    let Some(path) = FileDialog::new()
        .set_file_name(&file.filename)
        .add_filter(format.label(), &[format.extension()])
        .save_file()
    else {
        return Ok(None);
    };

    write_export(&path, file)?;
    Ok(Some(path))
}
