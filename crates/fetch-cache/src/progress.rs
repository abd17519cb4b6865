/// Receives download progress from a fetch.
///
/// On a changed response the fetcher calls [`start`](Progress::start) once,
/// [`update`](Progress::update) after every chunk written, then
/// [`finish`](Progress::finish). Nothing is reported for a not-modified
/// response or a failed one.
pub trait Progress: Send {
    /// `total` is the advertised body length, if the server sent one.
    fn start(&mut self, label: &str, total: Option<u64>);

    /// `bytes_so_far` is cumulative, not a delta.
    fn update(&mut self, bytes_so_far: u64);

    fn finish(&mut self);
}

/// Discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn start(&mut self, _label: &str, _total: Option<u64>) {}

    fn update(&mut self, _bytes_so_far: u64) {}

    fn finish(&mut self) {}
}

impl<P: Progress + ?Sized> Progress for &mut P {
    fn start(&mut self, label: &str, total: Option<u64>) {
        (**self).start(label, total)
    }

    fn update(&mut self, bytes_so_far: u64) {
        (**self).update(bytes_so_far)
    }

    fn finish(&mut self) {
        (**self).finish()
    }
}

impl<P: Progress + ?Sized> Progress for Box<P> {
    fn start(&mut self, label: &str, total: Option<u64>) {
        (**self).start(label, total)
    }

    fn update(&mut self, bytes_so_far: u64) {
        (**self).update(bytes_so_far)
    }

    fn finish(&mut self) {
        (**self).finish()
    }
}
