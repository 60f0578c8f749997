use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use echo_cancel_core::{
    write_summary, FramePipeline, NlmsFactory, PipelineObserver, PipelineState, WavHeader,
};

const PROGRESS_BAR_WIDTH: u64 = 50;

#[derive(Parser)]
#[command(
    name = "echo-cancel",
    version,
    about = "Run an echo-cancellation engine over a reference/recording WAV pair"
)]
struct Args {
    /// Loudspeaker reference signal
    reference: PathBuf,

    /// Microphone recording containing echo of the reference
    recording: PathBuf,

    /// Destination for the cancelled output; linear.wav lands next to it
    output: PathBuf,

    /// Known offset in samples between reference and recording
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    delay: i32,

    /// Write a JSON run summary next to the output file
    #[arg(long)]
    summary: bool,
}

/// Renders the per-file info block and the overwritten progress line.
struct ConsoleObserver;

impl PipelineObserver for ConsoleObserver {
    fn on_stream_info(&self, path: &Path, header: &WavHeader) {
        println!("=====================================");
        println!("{} information:", path.display());
        println!("format: {}", header.audio_format);
        println!("channels: {}", header.channels);
        println!("sample_rate: {}", header.sample_rate);
        println!("bits_per_sample: {}", header.bits_per_sample);
        println!("length: {}", header.data_len);
        println!("total_samples: {}", header.sample_count());
        println!("======================================");
    }

    fn on_state_changed(&self, state: &PipelineState) {
        log::debug!("pipeline state: {:?}", state);
        if state.is_streaming() {
            println!("processing audio frames ...");
        }
    }

    fn on_progress(&self, current: u64, total: u64) {
        let percentage = current * 100 / total.max(1);
        let progress = percentage * PROGRESS_BAR_WIDTH / 100;

        print!("        {}/{}    {}%|", current, total, percentage);
        for _ in 0..progress {
            print!("=");
        }
        print!(">");
        for _ in progress..PROGRESS_BAR_WIDTH {
            print!(" ");
        }
        print!("|\r");
        let _ = std::io::stdout().flush();
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    println!("======================================");
    println!("ref file is: {}", args.reference.display());
    println!("rec file is: {}", args.recording.display());
    println!("out file is: {}", args.output.display());
    println!("======================================");

    let mut pipeline = FramePipeline::new(Box::new(NlmsFactory));
    pipeline.set_observer(Box::new(ConsoleObserver));
    pipeline.set_buffer_delay(args.delay);

    let report = match pipeline.run(&args.reference, &args.recording, &args.output) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    println!();
    match &report.fault {
        Some(fault) => {
            // An engine fault stops the loop but is not a failed run:
            // earlier frames' output is retained and the process exits 0.
            eprintln!(
                "echo canceller failed on frame {}: {}",
                fault.frame, fault.fault
            );
            println!(
                "stopped early: {} of {} frames written",
                report.frames_processed, report.total_frames
            );
        }
        None => println!("processed {} frames", report.frames_processed),
    }
    println!(
        "out:    {} (sha256 {})",
        report.output_path.display(),
        report.output_checksum
    );
    println!(
        "linear: {} (sha256 {})",
        report.linear_path.display(),
        report.linear_checksum
    );

    if args.summary {
        match write_summary(&report) {
            Ok(path) => println!("summary: {}", path.display()),
            Err(e) => {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        }
    }
}
