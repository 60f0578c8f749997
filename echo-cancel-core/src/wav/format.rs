/// WAV container format utilities.
///
/// Generates and parses standard 44-byte RIFF WAV headers and provides
/// helpers for updating header fields after a stream finishes.
/// Size of the standard WAV RIFF header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

/// PCM format tag in the `fmt ` chunk.
pub const FORMAT_PCM: u16 = 1;

/// Parsed stream header of one WAV input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    /// Format tag from the `fmt ` chunk (1 = PCM).
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    /// Length of the `data` chunk in bytes.
    pub data_len: u32,
}

impl WavHeader {
    /// Total samples in the data chunk, derived from its byte length.
    pub fn sample_count(&self) -> u64 {
        self.data_len as u64 * 8 / self.bits_per_sample as u64
    }

    /// First field on which the two headers differ, if any.
    ///
    /// Data length is deliberately not compared: streams of different
    /// duration are fine, the frame loop is bounded by the shorter one.
    pub fn mismatch(&self, other: &WavHeader) -> Option<String> {
        if self.audio_format != other.audio_format {
            return Some(format!(
                "format tag {} vs {}",
                self.audio_format, other.audio_format
            ));
        }
        if self.channels != other.channels {
            return Some(format!("channel count {} vs {}", self.channels, other.channels));
        }
        if self.sample_rate != other.sample_rate {
            return Some(format!(
                "sample rate {} Hz vs {} Hz",
                self.sample_rate, other.sample_rate
            ));
        }
        if self.bits_per_sample != other.bits_per_sample {
            return Some(format!(
                "bits per sample {} vs {}",
                self.bits_per_sample, other.bits_per_sample
            ));
        }
        None
    }
}

/// Generate a 44-byte WAV RIFF header.
///
/// Format: PCM (format code 1), little-endian.
///
/// Layout:
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    file size - 8 (placeholder: 36 + data_size)
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16 (PCM format chunk size)
/// [20-21]  1 (PCM format code)
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate = sample_rate * channels * bit_depth / 8
/// [32-33]  block_align = channels * bit_depth / 8
/// [34-35]  bit_depth
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
pub fn generate_wav_header(
    sample_rate: u32,
    bit_depth: u16,
    channels: u16,
    data_size: u32,
) -> [u8; WAV_HEADER_SIZE] {
    let byte_rate = sample_rate * channels as u32 * bit_depth as u32 / 8;
    let block_align = channels * bit_depth / 8;
    let chunk_size = 36 + data_size;

    let mut header = [0u8; WAV_HEADER_SIZE];

    // RIFF chunk descriptor
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&chunk_size.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    // fmt sub-chunk
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes()); // PCM format size
    header[20..22].copy_from_slice(&FORMAT_PCM.to_le_bytes());
    header[22..24].copy_from_slice(&channels.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&bit_depth.to_le_bytes());

    // data sub-chunk
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    header
}

/// Check the 12-byte RIFF chunk descriptor at the start of a stream.
pub fn check_riff_descriptor(bytes: &[u8; 12]) -> Result<(), String> {
    if &bytes[0..4] != b"RIFF" {
        return Err("missing RIFF magic".into());
    }
    if &bytes[8..12] != b"WAVE" {
        return Err("missing WAVE form type".into());
    }
    Ok(())
}

/// Parse the first 16 bytes of a `fmt ` chunk body.
///
/// Returns (format tag, channels, sample rate, bits per sample).
pub fn parse_fmt_chunk(body: &[u8]) -> Result<(u16, u16, u32, u16), String> {
    if body.len() < 16 {
        return Err(format!("fmt chunk too short: {} bytes", body.len()));
    }
    let audio_format = u16::from_le_bytes([body[0], body[1]]);
    let channels = u16::from_le_bytes([body[2], body[3]]);
    let sample_rate = u32::from_le_bytes([body[4], body[5], body[6], body[7]]);
    let bits_per_sample = u16::from_le_bytes([body[14], body[15]]);

    if channels == 0 {
        return Err("fmt chunk declares zero channels".into());
    }
    if sample_rate == 0 {
        return Err("fmt chunk declares zero sample rate".into());
    }
    if bits_per_sample == 0 {
        return Err("fmt chunk declares zero bits per sample".into());
    }
    Ok((audio_format, channels, sample_rate, bits_per_sample))
}

/// Patch the file-size field at offset 4 (RIFF chunk size = file_size - 8).
pub fn patch_file_size(header: &mut [u8], total_file_size: u64) {
    let chunk_size = (total_file_size - 8) as u32;
    header[4..8].copy_from_slice(&chunk_size.to_le_bytes());
}

/// Patch the data-size field at offset 40.
pub fn patch_data_size(header: &mut [u8], data_size: u64) {
    let data_size_u32 = data_size as u32;
    header[40..44].copy_from_slice(&data_size_u32.to_le_bytes());
}
