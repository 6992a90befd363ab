use indicatif::{ProgressBar, ProgressState, ProgressStyle};

pub fn get_tqdm_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{percent:>3}% |{wide_bar}| {pos}/{len} [{elapsed_precise}<{eta_precise}, {custom_per_sec}] {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .with_key(
        "custom_per_sec",
        Box::new(|s: &ProgressState, w: &mut dyn std::fmt::Write| {
            let _ = write!(w, "{:.2} runs/s", s.per_sec());
        }),
    )
    .progress_chars("██ ")
}

/// Progress bar over `len` runs, drawn on stderr
pub fn run_progress_bar(len: usize) -> ProgressBar {
    let pbar = ProgressBar::new(len as u64);
    pbar.set_style(get_tqdm_style());
    pbar
}

/// Format an optional metric for terminal output
pub fn format_metric(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(value) => format!("{value:.precision$}"),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::format_metric;

    #[test]
    fn test_format_metric() {
        assert_eq!(format_metric(Some(1.23456), 2), "1.23");
        assert_eq!(format_metric(Some(20.0), 4), "20.0000");
        assert_eq!(format_metric(None, 2), "-");
    }
}
