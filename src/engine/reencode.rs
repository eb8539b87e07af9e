//! Re-encode argument construction for frame-accurate trimming

use std::path::Path;

use crate::domain::model::FrameRate;
use crate::planner::TrimPlan;
use crate::utils::path::PathUtils;
use crate::utils::time::format_tool_seconds;

const FASTSTART_CONTAINERS: [&str; 3] = ["mp4", "mov", "m4v"];

/// Build the ffmpeg argument list for a re-encoding trim.
///
/// Video and audio presentation timestamps are both reset to zero at the cut
/// and the output frame rate is pinned to the source rate, which keeps the
/// two streams aligned.
pub fn build_args(
    plan: &TrimPlan,
    frame_rate: FrameRate,
    input: &Path,
    output: &Path,
) -> Vec<String> {
    let encoder = &plan.encoder;
    let mut args = vec![
        "-y".to_string(),
        "-ss".to_string(),
        format_tool_seconds(plan.start),
        "-i".to_string(),
        input.to_string_lossy().to_string(),
        "-t".to_string(),
        format_tool_seconds(plan.duration),
        "-vf".to_string(),
        "setpts=PTS-STARTPTS".to_string(),
        "-af".to_string(),
        "asetpts=PTS-STARTPTS".to_string(),
        "-r".to_string(),
        frame_rate.to_string(),
        "-c:v".to_string(),
        encoder.video_codec.clone(),
        "-preset".to_string(),
        encoder.preset.clone(),
        "-crf".to_string(),
        encoder.crf.min(51).to_string(),
        "-c:a".to_string(),
        encoder.audio_codec.clone(),
    ];

    if encoder.faststart && supports_faststart(output) {
        args.push("-movflags".to_string());
        args.push("+faststart".to_string());
    }

    args.push(output.to_string_lossy().to_string());
    args
}

fn supports_faststart(output: &Path) -> bool {
    PathUtils::extension_of(&output.to_string_lossy())
        .map_or(false, |ext| FASTSTART_CONTAINERS.contains(&ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::EncoderSettings;
    use crate::planner::TrimStrategy;

    fn plan(encoder: EncoderSettings, frame_rate: FrameRate) -> TrimPlan {
        TrimPlan {
            start: 5.0,
            end: 15.0,
            duration: 10.0,
            strategy: TrimStrategy::ReEncode { frame_rate },
            encoder,
        }
    }

    #[test]
    fn test_reencode_args_default_encoder() {
        let rate = FrameRate::DEFAULT;
        let plan = plan(EncoderSettings::default(), rate);
        let args = build_args(&plan, rate, Path::new("in.mp4"), Path::new("out.mp4"));

        assert_eq!(
            args,
            vec![
                "-y", "-ss", "5", "-i", "in.mp4", "-t", "10",
                "-vf", "setpts=PTS-STARTPTS", "-af", "asetpts=PTS-STARTPTS",
                "-r", "30", "-c:v", "libx264", "-preset", "veryfast", "-crf", "23",
                "-c:a", "aac", "-movflags", "+faststart", "out.mp4",
            ]
        );
    }

    #[test]
    fn test_reencode_args_fractional_rate_without_faststart() {
        let rate = FrameRate::new(30000, 1001).unwrap();
        let encoder = EncoderSettings {
            faststart: false,
            ..EncoderSettings::default()
        };
        let args = build_args(&plan(encoder, rate), rate, Path::new("in.mp4"), Path::new("out.mp4"));

        let r = args.iter().position(|a| a == "-r").unwrap();
        assert_eq!(args[r + 1], "30000/1001");
        assert!(!args.iter().any(|a| a == "-movflags"));
        assert_eq!(args.last().unwrap(), "out.mp4");
    }

    #[test]
    fn test_faststart_only_for_mp4_family() {
        let rate = FrameRate::new(25, 1).unwrap();
        let plan = plan(EncoderSettings::default(), rate);

        let mkv = build_args(&plan, rate, Path::new("in.mp4"), Path::new("out.mkv"));
        assert!(!mkv.iter().any(|a| a == "-movflags"));
        assert_eq!(mkv.last().unwrap(), "out.mkv");

        let mov = build_args(&plan, rate, Path::new("in.mp4"), Path::new("out.mov"));
        assert!(mov.iter().any(|a| a == "+faststart"));
    }
}
