/// Renders a stream timestamp for keys: cache file names, output clip
/// names, and result ids.
///
/// Whole seconds keep a trailing `.0` so downstream consumers that key on
/// the rendered form see the same id for `2.0` whether it arrived as an
/// integer or a float.
pub fn format_frame_time(frame_time: f64) -> String {
    if frame_time.is_finite() && frame_time.fract() == 0.0 {
        format!("{frame_time:.1}")
    } else {
        format!("{frame_time}")
    }
}
