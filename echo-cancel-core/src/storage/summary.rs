use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::error::HarnessError;
use crate::models::report::RunReport;

/// Serializable summary of one pipeline run.
///
/// Written as a JSON sidecar next to the primary output on request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub id: String,
    pub created_at: String,
    pub sample_rate: u32,
    pub num_channels: u16,
    pub total_frames: u64,
    pub frames_processed: u64,
    pub output_path: String,
    pub linear_path: String,
    pub output_checksum: String,
    pub linear_checksum: String,
    /// Present when the frame loop stopped early on an engine fault.
    pub fault: Option<String>,
}

impl RunSummary {
    pub fn from_report(report: &RunReport) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            sample_rate: report.config.sample_rate,
            num_channels: report.config.num_channels,
            total_frames: report.total_frames,
            frames_processed: report.frames_processed,
            output_path: report.output_path.display().to_string(),
            linear_path: report.linear_path.display().to_string(),
            output_checksum: report.output_checksum.clone(),
            linear_checksum: report.linear_checksum.clone(),
            fault: report
                .fault
                .as_ref()
                .map(|f| format!("frame {}: {}", f.frame, f.fault)),
        }
    }
}

/// Write the run summary as `{output}.summary.json` and return its path.
pub fn write_summary(report: &RunReport) -> Result<PathBuf, HarnessError> {
    let summary = RunSummary::from_report(report);
    let path = summary_path(&report.output_path);
    let json = serde_json::to_string_pretty(&summary)
        .map_err(|e| HarnessError::Storage(format!("failed to serialize summary: {}", e)))?;
    fs::write(&path, json)
        .map_err(|e| HarnessError::Storage(format!("failed to write summary: {}", e)))?;
    Ok(path)
}

/// Read a run summary sidecar written by [`write_summary`].
pub fn read_summary(output_path: &Path) -> Result<RunSummary, HarnessError> {
    let path = summary_path(output_path);
    let json = fs::read_to_string(&path)
        .map_err(|e| HarnessError::Storage(format!("failed to read summary: {}", e)))?;
    serde_json::from_str(&json)
        .map_err(|e| HarnessError::Storage(format!("failed to parse summary: {}", e)))
}

fn summary_path(output_path: &Path) -> PathBuf {
    output_path.with_extension("summary.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::EngineConfig;
    use crate::models::error::EngineFault;
    use crate::models::report::FrameFault;

    fn report(output_path: PathBuf) -> RunReport {
        RunReport {
            config: EngineConfig {
                sample_rate: 16000,
                num_channels: 1,
                export_linear: true,
            },
            total_frames: 80,
            frames_processed: 5,
            linear_path: output_path.with_file_name("linear.wav"),
            output_path,
            output_checksum: "aa".repeat(32),
            linear_checksum: "bb".repeat(32),
            fault: Some(FrameFault {
                frame: 6,
                fault: EngineFault::Internal("scripted fault".into()),
            }),
        }
    }

    #[test]
    fn summary_round_trip() {
        let dir = std::env::temp_dir().join("echo_cancel_summary_test");
        fs::create_dir_all(&dir).unwrap();
        let output_path = dir.join("out.wav");

        let report = report(output_path.clone());
        let written_to = write_summary(&report).unwrap();
        assert_eq!(written_to, dir.join("out.summary.json"));

        let summary = read_summary(&output_path).unwrap();
        assert_eq!(summary.total_frames, 80);
        assert_eq!(summary.frames_processed, 5);
        assert_eq!(summary.sample_rate, 16000);
        assert_eq!(summary.fault.as_deref(), Some("frame 6: scripted fault"));

        fs::remove_dir_all(&dir).ok();
    }
}
