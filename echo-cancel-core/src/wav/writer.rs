use std::fs::{self, File};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::error::HarnessError;
use crate::wav::format;

/// Streaming WAV file writer.
///
/// `create` writes a 44-byte header with placeholder sizes; `close` seeks
/// back to patch the RIFF and data sizes and returns the SHA-256 checksum of
/// the finalized file. Dropping a writer that was never closed finalizes the
/// sizes best-effort so an early error exit still leaves a structurally
/// consistent file.
pub struct WavWriter {
    path: PathBuf,
    file: Option<File>,
    total_bytes_written: u64,
    pcm_scratch: Vec<u8>,
}

impl WavWriter {
    pub fn create(
        path: &Path,
        sample_rate: u32,
        bit_depth: u16,
        channels: u16,
    ) -> Result<Self, HarnessError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| HarnessError::Write {
                    path: path.display().to_string(),
                    reason: format!("failed to create directory: {}", e),
                })?;
            }
        }

        let file = File::create(path).map_err(|e| HarnessError::Write {
            path: path.display().to_string(),
            reason: format!("failed to create file: {}", e),
        })?;

        let mut writer = Self {
            path: path.to_path_buf(),
            file: Some(file),
            total_bytes_written: 0,
            pcm_scratch: Vec::new(),
        };

        // Data size placeholder, patched on close.
        let header = format::generate_wav_header(sample_rate, bit_depth, channels, 0);
        writer.write_raw(&header)?;
        Ok(writer)
    }

    /// Append little-endian 16-bit PCM samples.
    pub fn write_samples(&mut self, samples: &[i16]) -> Result<(), HarnessError> {
        self.pcm_scratch.clear();
        for &sample in samples {
            self.pcm_scratch.extend_from_slice(&sample.to_le_bytes());
        }
        let bytes = std::mem::take(&mut self.pcm_scratch);
        let result = self.write_raw(&bytes);
        self.pcm_scratch = bytes;
        result
    }

    /// Finalize the file: patch the header sizes, flush, close, and return
    /// the SHA-256 hex digest of the completed file.
    pub fn close(&mut self) -> Result<String, HarnessError> {
        let Some(mut file) = self.file.take() else {
            return Err(HarnessError::Storage(format!(
                "{} is not open",
                self.path.display()
            )));
        };

        finalize_sizes(&mut file, self.total_bytes_written).map_err(|e| HarnessError::Write {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        file.flush().map_err(|e| HarnessError::Write {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        drop(file);

        sha256_file(&self.path)
    }

    /// Total bytes written so far (including the WAV header).
    pub fn bytes_written(&self) -> u64 {
        self.total_bytes_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<(), HarnessError> {
        let file = self.file.as_mut().ok_or_else(|| {
            HarnessError::Storage(format!("{} is not open", self.path.display()))
        })?;
        file.write_all(data).map_err(|e| HarnessError::Write {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        self.total_bytes_written += data.len() as u64;
        Ok(())
    }
}

impl Drop for WavWriter {
    fn drop(&mut self) {
        if let Some(mut file) = self.file.take() {
            if let Err(e) = finalize_sizes(&mut file, self.total_bytes_written) {
                log::warn!("could not finalize {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Patch the RIFF chunk size at offset 4 and the data size at offset 40.
fn finalize_sizes(file: &mut File, total_bytes_written: u64) -> std::io::Result<()> {
    let file_size = (total_bytes_written - 8) as u32;
    file.seek(SeekFrom::Start(4))?;
    file.write_all(&file_size.to_le_bytes())?;

    let data_size = (total_bytes_written - format::WAV_HEADER_SIZE as u64) as u32;
    file.seek(SeekFrom::Start(40))?;
    file.write_all(&data_size.to_le_bytes())?;
    Ok(())
}

/// Compute SHA-256 hex digest of a file.
fn sha256_file(path: &Path) -> Result<String, HarnessError> {
    let data = fs::read(path).map_err(|e| {
        HarnessError::Storage(format!("failed to read file for checksum: {}", e))
    })?;
    let digest = Sha256::digest(&data);
    Ok(hex_encode(&digest))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
