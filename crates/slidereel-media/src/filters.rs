//! FFmpeg filter definitions.

use crate::command::format_seconds;

/// Scale into a `width`x`height` box keeping aspect ratio, then pad to fill it.
///
/// `eval=frame` re-evaluates per frame so sources with changing dimensions
/// still land on the fixed canvas.
pub fn scale_pad_filter(width: u32, height: u32) -> String {
    format!(
        "scale={w}:{h}:force_original_aspect_ratio=decrease:eval=frame,pad={w}:{h}:-1:-1:eval=frame",
        w = width,
        h = height
    )
}

/// Linear fade to silence starting at `start` seconds, lasting `length` seconds.
pub fn fade_out_filter(start: f64, length: f64) -> String {
    format!(
        "afade=t=out:st={}:d={}",
        format_seconds(start),
        format_seconds(length)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_pad_filter() {
        assert_eq!(
            scale_pad_filter(7680, 4320),
            "scale=7680:4320:force_original_aspect_ratio=decrease:eval=frame,pad=7680:4320:-1:-1:eval=frame"
        );
    }

    #[test]
    fn test_fade_out_filter() {
        assert_eq!(fade_out_filter(60.0, 5.0), "afade=t=out:st=60:d=5");
        assert_eq!(fade_out_filter(12.48, 5.0), "afade=t=out:st=12.480:d=5");
    }
}
