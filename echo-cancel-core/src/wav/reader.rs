use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::models::error::HarnessError;
use crate::wav::format::{self, WavHeader};

/// Sequential WAV reader.
///
/// `open` scans the RIFF chunk list up to the `data` chunk (skipping unknown
/// chunks and their odd-length pad bytes), after which `read_samples`
/// delivers bounded reads that never cross the end of the data chunk.
#[derive(Debug)]
pub struct WavReader {
    path: PathBuf,
    file: File,
    header: WavHeader,
    /// Bytes left in the data chunk.
    remaining: u64,
    byte_buf: Vec<u8>,
}

impl WavReader {
    pub fn open(path: &Path) -> Result<Self, HarnessError> {
        let mut file = File::open(path).map_err(|e| HarnessError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let header_error = |reason: String| HarnessError::Header {
            path: path.display().to_string(),
            reason,
        };

        let mut descriptor = [0u8; 12];
        file.read_exact(&mut descriptor)
            .map_err(|e| header_error(e.to_string()))?;
        format::check_riff_descriptor(&descriptor).map_err(header_error)?;

        let mut fmt: Option<(u16, u16, u32, u16)> = None;
        loop {
            let mut chunk_header = [0u8; 8];
            if let Err(e) = file.read_exact(&mut chunk_header) {
                return Err(header_error(format!("no data chunk found: {}", e)));
            }
            let chunk_id: [u8; 4] = chunk_header[0..4].try_into().unwrap();
            let chunk_size = u32::from_le_bytes(chunk_header[4..8].try_into().unwrap());

            match &chunk_id {
                b"fmt " => {
                    let body_len = (chunk_size as usize).min(16);
                    let mut body = [0u8; 16];
                    file.read_exact(&mut body[..body_len])
                        .map_err(|e| header_error(e.to_string()))?;
                    fmt = Some(format::parse_fmt_chunk(&body[..body_len]).map_err(header_error)?);
                    skip(&mut file, padded(chunk_size) as u64 - body_len as u64)
                        .map_err(|e| header_error(e.to_string()))?;
                }
                b"data" => {
                    let (audio_format, channels, sample_rate, bits_per_sample) =
                        fmt.ok_or_else(|| header_error("data chunk before fmt chunk".into()))?;
                    let header = WavHeader {
                        audio_format,
                        channels,
                        sample_rate,
                        bits_per_sample,
                        data_len: chunk_size,
                    };
                    return Ok(Self {
                        path: path.to_path_buf(),
                        file,
                        header,
                        remaining: chunk_size as u64,
                        byte_buf: Vec::new(),
                    });
                }
                _ => {
                    skip(&mut file, padded(chunk_size) as u64)
                        .map_err(|e| header_error(e.to_string()))?;
                }
            }
        }
    }

    pub fn header(&self) -> &WavHeader {
        &self.header
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read up to `buf.len()` little-endian 16-bit samples.
    ///
    /// Returns the number of samples actually read; the tail of `buf` is
    /// zero-filled on a short read. Never reads past the data chunk.
    pub fn read_samples(&mut self, buf: &mut [i16]) -> Result<usize, HarnessError> {
        let want = (buf.len() * 2).min(self.remaining as usize);
        self.byte_buf.resize(want, 0);

        let mut filled = 0;
        while filled < want {
            let n = self
                .file
                .read(&mut self.byte_buf[filled..want])
                .map_err(|e| HarnessError::Read {
                    path: self.path.display().to_string(),
                    reason: e.to_string(),
                })?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        self.remaining -= filled as u64;

        let samples = filled / 2;
        for (i, sample) in buf.iter_mut().take(samples).enumerate() {
            *sample = i16::from_le_bytes([self.byte_buf[2 * i], self.byte_buf[2 * i + 1]]);
        }
        for sample in buf.iter_mut().skip(samples) {
            *sample = 0;
        }
        Ok(samples)
    }
}

/// RIFF chunks are word-aligned; odd sizes carry one pad byte.
fn padded(chunk_size: u32) -> u32 {
    chunk_size + (chunk_size & 1)
}

fn skip(file: &mut File, bytes: u64) -> std::io::Result<()> {
    if bytes > 0 {
        file.seek(SeekFrom::Current(bytes as i64))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wav::format::{generate_wav_header, FORMAT_PCM};
    use crate::wav::writer::WavWriter;
    use std::fs;
    use std::path::PathBuf;

    fn temp_file_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("echo_cancel_reader_test_{}", name))
    }

    fn write_wav(path: &Path, sample_rate: u32, channels: u16, samples: &[i16]) {
        let mut writer = WavWriter::create(path, sample_rate, 16, channels).unwrap();
        writer.write_samples(samples).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn open_parses_header() {
        let path = temp_file_path("header.wav");
        write_wav(&path, 16000, 1, &[1, -2, 3, -4]);

        let reader = WavReader::open(&path).unwrap();
        let header = reader.header();
        assert_eq!(header.audio_format, FORMAT_PCM);
        assert_eq!(header.channels, 1);
        assert_eq!(header.sample_rate, 16000);
        assert_eq!(header.bits_per_sample, 16);
        assert_eq!(header.data_len, 8);
        assert_eq!(header.sample_count(), 4);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn read_samples_round_trip_and_eof() {
        let path = temp_file_path("roundtrip.wav");
        write_wav(&path, 16000, 1, &[100, -200, 300, -400, 500]);

        let mut reader = WavReader::open(&path).unwrap();

        let mut buf = [0i16; 3];
        assert_eq!(reader.read_samples(&mut buf).unwrap(), 3);
        assert_eq!(buf, [100, -200, 300]);

        // Short read at end of data: tail is zero-filled.
        assert_eq!(reader.read_samples(&mut buf).unwrap(), 2);
        assert_eq!(buf, [-400, 500, 0]);

        assert_eq!(reader.read_samples(&mut buf).unwrap(), 0);
        assert_eq!(buf, [0, 0, 0]);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn open_missing_file_is_open_error() {
        let err = WavReader::open(Path::new("/nonexistent/echo_cancel.wav")).unwrap_err();
        assert!(matches!(err, HarnessError::Open { .. }));
    }

    #[test]
    fn truncated_header_is_header_error() {
        let path = temp_file_path("truncated.wav");
        fs::write(&path, b"RIFF\x00\x00\x00\x00WA").unwrap();

        let err = WavReader::open(&path).unwrap_err();
        assert!(matches!(err, HarnessError::Header { .. }));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn bad_magic_is_header_error() {
        let path = temp_file_path("magic.wav");
        fs::write(&path, vec![0u8; 64]).unwrap();

        let err = WavReader::open(&path).unwrap_err();
        assert!(matches!(err, HarnessError::Header { .. }));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn unknown_chunks_before_data_are_skipped() {
        let path = temp_file_path("chunks.wav");

        // RIFF descriptor + fmt, then a 3-byte LIST chunk (odd size, padded)
        // between fmt and data.
        let reference = generate_wav_header(16000, 16, 1, 4);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&reference[0..12]); // RIFF....WAVE
        bytes.extend_from_slice(&reference[12..36]); // fmt chunk
        bytes.extend_from_slice(b"LIST");
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(b"abc\x00"); // body + pad byte
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes.extend_from_slice(&7i16.to_le_bytes());
        bytes.extend_from_slice(&(-7i16).to_le_bytes());
        fs::write(&path, &bytes).unwrap();

        let mut reader = WavReader::open(&path).unwrap();
        assert_eq!(reader.header().data_len, 4);

        let mut buf = [0i16; 2];
        assert_eq!(reader.read_samples(&mut buf).unwrap(), 2);
        assert_eq!(buf, [7, -7]);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_data_chunk_is_header_error() {
        let path = temp_file_path("nodata.wav");

        let reference = generate_wav_header(16000, 16, 1, 0);
        fs::write(&path, &reference[0..36]).unwrap(); // RIFF + fmt, no data

        let err = WavReader::open(&path).unwrap_err();
        assert!(matches!(err, HarnessError::Header { .. }));

        fs::remove_file(&path).ok();
    }
}
