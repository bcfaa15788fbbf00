use std::time::Duration;

/// Per-stage elapsed times for one pipeline run. Presentation-only;
/// recomputed from scratch every run.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageTimings {
    /// Wall clock from capture start to the fabricated transcript.
    pub stt: Duration,
    /// Response stage alone.
    pub api: Duration,
    /// Synthesis stage alone.
    pub tts: Duration,
    /// Capture start through end of synthesis.
    pub total: Duration,
}

/// Format a duration for the metrics panel: milliseconds below one
/// second, one-decimal seconds above.
pub fn format_time(d: Duration) -> String {
    let ms = d.as_millis();
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_second_formats_as_millis() {
        assert_eq!(format_time(Duration::from_millis(0)), "0ms");
        assert_eq!(format_time(Duration::from_millis(812)), "812ms");
        assert_eq!(format_time(Duration::from_millis(999)), "999ms");
    }

    #[test]
    fn seconds_format_with_one_decimal() {
        assert_eq!(format_time(Duration::from_millis(1000)), "1.0s");
        assert_eq!(format_time(Duration::from_millis(2340)), "2.3s");
    }
}
