// Frame timing and assembly planning

use tracing::warn;

/// Minimum displayable frame delay in the WebP container.
pub const MIN_DELAY_MS: u32 = 10;

/// Fallback delay for a frame whose duration cannot be derived at all
/// (single-frame input with no duration hint).
pub const FALLBACK_DELAY_MS: u32 = 100;

/// One decoded frame's timing as reported by the prober, in decode order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTimestamp {
    /// Presentation time relative to animation start, in seconds.
    pub presentation_s: f64,
    /// Decoder-reported display duration in seconds, when available.
    pub duration_hint_s: Option<f64>,
}

/// Per-frame muxing instructions for one output frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePlanEntry {
    pub delay_ms: u32,
    pub x_offset: u32,
    pub y_offset: u32,
    pub blend: bool,
    pub dispose: bool,
}

/// Ordered muxing plan for the whole animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationPlan {
    pub frames: Vec<FramePlanEntry>,
    /// 0 means loop forever.
    pub loop_count: u32,
}

/// Derive a millisecond delay for every probed frame.
///
/// Each frame's duration is, in order of preference: the decoder's duration
/// hint (when nonzero), the gap to the next frame's presentation time, or a
/// repeat of the previous frame's resolved delay. Results are rounded to the
/// nearest millisecond and clamped to [`MIN_DELAY_MS`].
pub fn compute_delays(timestamps: &[FrameTimestamp]) -> Vec<u32> {
    let mut delays: Vec<u32> = Vec::with_capacity(timestamps.len());

    for (i, ts) in timestamps.iter().enumerate() {
        let duration_s = match ts.duration_hint_s {
            Some(hint) if hint != 0.0 => hint,
            _ => match timestamps.get(i + 1) {
                Some(next) => next.presentation_s - ts.presentation_s,
                None => match delays.last() {
                    Some(&prev_ms) => f64::from(prev_ms) / 1000.0,
                    None => {
                        warn!(
                            "single frame with no duration hint, falling back to {} ms",
                            FALLBACK_DELAY_MS
                        );
                        f64::from(FALLBACK_DELAY_MS) / 1000.0
                    }
                },
            },
        };

        let ms = (duration_s * 1000.0).round() as i64;
        delays.push(ms.max(i64::from(MIN_DELAY_MS)) as u32);
    }

    delays
}

/// Force the delay list to match the number of extracted frames.
///
/// Extra delays are dropped from the tail; missing delays are filled by
/// repeating the last value. Either adjustment logs a warning. The result
/// always has exactly `frame_count` entries.
pub fn reconcile(mut delays: Vec<u32>, frame_count: usize) -> Vec<u32> {
    if delays.len() > frame_count {
        warn!(
            "computed {} delays for {} frames, dropping the last {}",
            delays.len(),
            frame_count,
            delays.len() - frame_count
        );
        delays.truncate(frame_count);
    } else if delays.len() < frame_count {
        warn!(
            "computed {} delays for {} frames, repeating the last delay",
            delays.len(),
            frame_count
        );
        let fill = delays.last().copied().unwrap_or(FALLBACK_DELAY_MS);
        delays.resize(frame_count, fill);
    }
    delays
}

/// Map delays to a full muxing plan.
///
/// Every frame is a full-canvas replacement: zero offsets, blend on,
/// dispose-to-background on. No differential encoding is attempted.
pub fn build_plan(delays: &[u32], loop_count: u32) -> AnimationPlan {
    let frames = delays
        .iter()
        .map(|&delay_ms| FramePlanEntry {
            delay_ms,
            x_offset: 0,
            y_offset: 0,
            blend: true,
            dispose: true,
        })
        .collect();

    AnimationPlan { frames, loop_count }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(presentation_s: f64) -> FrameTimestamp {
        FrameTimestamp {
            presentation_s,
            duration_hint_s: None,
        }
    }

    fn ts_hint(presentation_s: f64, hint: f64) -> FrameTimestamp {
        FrameTimestamp {
            presentation_s,
            duration_hint_s: Some(hint),
        }
    }

    #[test]
    fn test_delays_from_presentation_gaps() {
        // Last frame repeats the previous delay
        let delays = compute_delays(&[ts(0.0), ts(0.1), ts(0.2)]);
        assert_eq!(delays, vec![100, 100, 100]);
    }

    #[test]
    fn test_delays_from_hints_with_floor_clamp() {
        // 3 ms hint gets clamped up to the 10 ms floor
        let delays = compute_delays(&[ts_hint(0.0, 0.05), ts_hint(0.05, 0.003)]);
        assert_eq!(delays, vec![50, 10]);
    }

    #[test]
    fn test_zero_hint_falls_back_to_gap() {
        let delays = compute_delays(&[ts_hint(0.0, 0.0), ts(0.25)]);
        assert_eq!(delays, vec![250, 100]);
    }

    #[test]
    fn test_hint_wins_over_gap() {
        let delays = compute_delays(&[ts_hint(0.0, 0.04), ts(0.5)]);
        assert_eq!(delays[0], 40);
    }

    #[test]
    fn test_single_frame_no_hint_uses_fallback() {
        let delays = compute_delays(&[ts(0.0)]);
        assert_eq!(delays, vec![FALLBACK_DELAY_MS]);
    }

    #[test]
    fn test_single_frame_with_hint() {
        let delays = compute_delays(&[ts_hint(0.0, 0.5)]);
        assert_eq!(delays, vec![500]);
    }

    #[test]
    fn test_rounding_to_nearest_ms() {
        let delays = compute_delays(&[ts_hint(0.0, 0.0166), ts_hint(0.0166, 0.0164)]);
        assert_eq!(delays, vec![17, 16]);
    }

    #[test]
    fn test_empty_timestamps() {
        assert!(compute_delays(&[]).is_empty());
    }

    #[test]
    fn test_reconcile_truncates_from_tail() {
        let out = reconcile(vec![10, 20, 30, 40, 50], 3);
        assert_eq!(out, vec![10, 20, 30]);
    }

    #[test]
    fn test_reconcile_pads_with_last() {
        let out = reconcile(vec![10, 20, 30], 5);
        assert_eq!(out, vec![10, 20, 30, 30, 30]);
    }

    #[test]
    fn test_reconcile_passthrough() {
        let out = reconcile(vec![10, 20], 2);
        assert_eq!(out, vec![10, 20]);
    }

    #[test]
    fn test_reconcile_empty_delays() {
        let out = reconcile(vec![], 2);
        assert_eq!(out, vec![FALLBACK_DELAY_MS, FALLBACK_DELAY_MS]);
    }

    #[test]
    fn test_build_plan_full_frame_replacement() {
        let plan = build_plan(&[100, 40], 3);
        assert_eq!(plan.loop_count, 3);
        assert_eq!(plan.frames.len(), 2);
        for entry in &plan.frames {
            assert_eq!(entry.x_offset, 0);
            assert_eq!(entry.y_offset, 0);
            assert!(entry.blend);
            assert!(entry.dispose);
        }
        assert_eq!(plan.frames[0].delay_ms, 100);
        assert_eq!(plan.frames[1].delay_ms, 40);
    }
}
