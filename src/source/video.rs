//! Video frame extraction through an external ffmpeg process.
//!
//! ffmpeg is the one external collaborator the pipeline shells out to: once
//! to probe the duration, then once per sampled frame, each frame coming
//! back as a PNG over a pipe.

use std::path::Path;

use log::debug;
use regex::Regex;
use tokio::process::Command;

use crate::core::error::{Error, Result};

/// Probe the video duration in seconds by parsing ffmpeg's banner output.
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let output = Command::new("ffmpeg")
        .arg("-i")
        .arg(path)
        .output()
        .await
        .map_err(|e| Error::Video(format!("failed to spawn ffmpeg: {e}")))?;

    // ffmpeg prints the banner on stderr and exits non-zero without an
    // output file; only the Duration line matters.
    let banner = String::from_utf8_lossy(&output.stderr);
    let pattern = Regex::new(r"Duration: (\d{2}):(\d{2}):(\d{2})")?;
    let captures = pattern
        .captures(&banner)
        .ok_or_else(|| Error::Video(format!("no duration in ffmpeg output for {}", path.display())))?;

    let field = |i: usize| -> f64 {
        captures
            .get(i)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0)
    };
    // Trailing partial second is dropped, matching the frame walk below.
    Ok((field(1) * 3600.0 + field(2) * 60.0 + field(3) - 1.0).max(0.0))
}

/// Extract one frame at `timestamp` seconds, rescaled per the configured
/// ffmpeg scale argument, decoded from the PNG ffmpeg pipes back.
pub async fn extract_frame(
    path: &Path,
    timestamp: f64,
    scale: &str,
) -> Result<image::DynamicImage> {
    debug!("extracting frame at {timestamp:.3}s from {}", path.display());
    let output = Command::new("ffmpeg")
        .arg("-i")
        .arg(path)
        .args(["-ss", &format!("{timestamp:.3}")])
        .args(["-frames:v", "1"])
        .args(["-vf", &format!("scale={scale}")])
        .args(["-f", "image2pipe", "-vcodec", "png", "pipe:1"])
        .output()
        .await
        .map_err(|e| Error::Video(format!("failed to spawn ffmpeg: {e}")))?;

    if output.stdout.is_empty() {
        return Err(Error::Video(format!(
            "ffmpeg produced no frame at {timestamp:.3}s: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }
    Ok(image::load_from_memory(&output.stdout)?)
}
