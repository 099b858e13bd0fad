use std::{path::Path, process::Command};

use crate::foundation::{
    error::{SlidecastError, SlidecastResult},
    process::run_tool,
};

/// Duration of a media file in seconds, as reported by `ffprobe`'s container metadata.
#[tracing::instrument(skip(ffprobe))]
pub fn probe_duration(ffprobe: &Path, path: &Path) -> SlidecastResult<f64> {
    let mut cmd = Command::new(ffprobe);
    cmd.args([
        "-v",
        "error",
        "-show_entries",
        "format=duration",
        "-of",
        "default=noprint_wrappers=1:nokey=1",
    ])
    .arg(path);

    let out = run_tool(cmd, SlidecastError::probe)?;
    let duration = parse_duration(&String::from_utf8_lossy(&out.stdout))
        .map_err(|e| SlidecastError::probe(format!("'{}': {e}", path.display())))?;
    tracing::debug!(duration_sec = duration, "probed duration");
    Ok(duration)
}

fn parse_duration(stdout: &str) -> Result<f64, String> {
    let raw = stdout.trim();
    let value = raw
        .parse::<f64>()
        .map_err(|_| format!("ffprobe output '{raw}' is not a number"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("ffprobe reported an invalid duration '{raw}'"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trimmed_float() {
        assert_eq!(parse_duration("12.345000\n").unwrap(), 12.345);
        assert_eq!(parse_duration("  3\n").unwrap(), 3.0);
    }

    #[test]
    fn rejects_non_numeric_output() {
        assert!(parse_duration("N/A\n").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn rejects_nonsense_values() {
        assert!(parse_duration("inf").is_err());
        assert!(parse_duration("NaN").is_err());
        assert!(parse_duration("-1.0").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn unparsable_tool_output_is_a_probe_error() {
        // `echo` stands in for ffprobe and prints its arguments back, which is not a number.
        let err = probe_duration(Path::new("echo"), Path::new("audio.mp3")).unwrap_err();
        assert!(matches!(err, SlidecastError::Probe(_)));
        let msg = err.to_string();
        assert!(msg.contains("is not a number"), "{msg}");
        assert!(msg.contains("audio.mp3"), "{msg}");
    }

    #[test]
    fn missing_ffprobe_is_a_probe_error() {
        let err = probe_duration(Path::new("slidecast-no-such-ffprobe"), Path::new("a.mp3"))
            .unwrap_err();
        assert!(matches!(err, SlidecastError::Probe(_)));
    }
}
