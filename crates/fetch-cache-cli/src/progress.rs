use fetch_cache::Progress;
use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{prefix}: [{bar:40}] {elapsed_precise} {bytes_per_sec} {total_bytes}";

const SPINNER_TEMPLATE: &str = "{prefix}: {spinner} {elapsed_precise} {bytes_per_sec} {bytes}";

/// Terminal download bar drawn on stderr.
#[derive(Default)]
pub struct BarProgress {
    bar: Option<ProgressBar>,
}

impl BarProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

fn style_for(total: Option<u64>) -> Option<ProgressStyle> {
    match total {
        Some(_) => ProgressStyle::with_template(BAR_TEMPLATE)
            .ok()
            .map(|s| s.progress_chars(">> ")),
        None => ProgressStyle::with_template(SPINNER_TEMPLATE).ok(),
    }
}

impl Progress for BarProgress {
    fn start(&mut self, label: &str, total: Option<u64>) {
        let bar = match total {
            Some(len) => ProgressBar::new(len),
            None => ProgressBar::new_spinner(),
        };
        let bar = match style_for(total) {
            Some(style) => bar.with_style(style),
            None => bar,
        };
        bar.set_prefix(label.to_owned());
        self.bar = Some(bar);
    }

    fn update(&mut self, bytes_so_far: u64) {
        if let Some(bar) = &self.bar {
            bar.set_position(bytes_so_far);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
    }
}
