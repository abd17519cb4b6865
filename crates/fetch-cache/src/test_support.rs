use crate::Progress;

/// A single call observed by [`RecordingProgress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Start { label: String, total: Option<u64> },
    Update(u64),
    Finish,
}

/// Progress sink that records every call, for asserting call order in tests.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub events: Vec<ProgressEvent>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cumulative byte counts passed to `update`, in order.
    pub fn updates(&self) -> Vec<u64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Update(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    pub fn started(&self) -> bool {
        matches!(self.events.first(), Some(ProgressEvent::Start { .. }))
    }

    pub fn finished(&self) -> bool {
        matches!(self.events.last(), Some(ProgressEvent::Finish))
    }
}

impl Progress for RecordingProgress {
    fn start(&mut self, label: &str, total: Option<u64>) {
        self.events.push(ProgressEvent::Start {
            label: label.to_owned(),
            total,
        });
    }

    fn update(&mut self, bytes_so_far: u64) {
        self.events.push(ProgressEvent::Update(bytes_so_far));
    }

    fn finish(&mut self) {
        self.events.push(ProgressEvent::Finish);
    }
}
