use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

// @module: File utilities for paragraph input and transcript output

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file, creating parent directories
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                Self::ensure_dir(parent)?;
            }
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))
    }

    // @returns: Blank-line separated paragraphs, trimmed, empties dropped
    pub fn split_paragraphs(content: &str) -> Vec<String> {
        let mut paragraphs = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in content.lines() {
            if line.trim().is_empty() {
                Self::flush_paragraph(&mut current, &mut paragraphs);
            } else {
                current.push(line.trim());
            }
        }
        Self::flush_paragraph(&mut current, &mut paragraphs);

        paragraphs
    }

    /// Read a file and split it into paragraphs
    pub fn read_paragraphs<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
        let content = Self::read_to_string(path)?;
        Ok(Self::split_paragraphs(&content))
    }

    fn flush_paragraph(current: &mut Vec<&str>, paragraphs: &mut Vec<String>) {
        if current.is_empty() {
            return;
        }
        // Lines of one paragraph are rejoined with single spaces
        paragraphs.push(current.join(" "));
        current.clear();
    }
}
