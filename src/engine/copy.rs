//! Stream copy argument construction

use std::path::Path;

use crate::planner::TrimPlan;
use crate::utils::time::format_tool_seconds;

/// Build the ffmpeg argument list for a lossless stream copy.
///
/// Input-side seeking is fast but may snap to the preceding keyframe, so
/// timestamps are regenerated and shifted to start at zero.
pub fn build_args(plan: &TrimPlan, input: &Path, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-ss".to_string(),
        format_tool_seconds(plan.start),
        "-i".to_string(),
        input.to_string_lossy().to_string(),
        "-t".to_string(),
        format_tool_seconds(plan.duration),
        "-c".to_string(),
        "copy".to_string(),
        "-avoid_negative_ts".to_string(),
        "make_zero".to_string(),
        "-fflags".to_string(),
        "+genpts".to_string(),
        output.to_string_lossy().to_string(),
    ]
}
