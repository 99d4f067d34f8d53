use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::ParseError;

// @module: File and directory utilities

/// Extensions accepted as episode scripts
pub const SCRIPT_EXTENSIONS: [&str; 2] = ["md", "markdown"];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path).with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Output path next to other episode artifacts
    // @params: input_file, output_dir, suffix (e.g. "_validation"), extension
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        suffix: &str,
        extension: &str,
    ) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push_str(suffix);
        output_filename.push('.');
        output_filename.push_str(extension);

        output_dir.as_ref().join(output_filename)
    }

    /// Find files with a specific extension in a directory, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let wanted = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(wanted) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        result.sort();
        Ok(result)
    }

    /// Check that a path is an existing markdown file
    pub fn validate_script_path<P: AsRef<Path>>(path: P) -> Result<(), ParseError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ParseError::NotFound(path.to_path_buf()));
        }
        if !path.is_file() {
            return Err(ParseError::NotAFile(path.to_path_buf()));
        }

        let is_script = path
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy();
                SCRIPT_EXTENSIONS.iter().any(|allowed| ext.eq_ignore_ascii_case(allowed))
            })
            .unwrap_or(false);
        if !is_script {
            return Err(ParseError::InvalidFormat(format!(
                "{} is not a markdown file (expected .md)",
                path.display()
            )));
        }
        Ok(())
    }

    /// Read an episode script, checking its path and encoding
    pub fn read_script<P: AsRef<Path>>(path: P) -> Result<String, ParseError> {
        let path = path.as_ref();
        Self::validate_script_path(path)?;

        let bytes = fs::read(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ParseError::NotFound(path.to_path_buf()),
            _ => ParseError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        String::from_utf8(bytes).map_err(|e| ParseError::BadEncoding {
            path: path.to_path_buf(),
            message: e.utf8_error().to_string(),
        })
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content).with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
