#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub total: Option<u64>,
    pub done: u64,
}

impl Progress {
    /// Percentage complete, `None` when the server did not announce a length.
    pub fn percent(&self) -> Option<u64> {
        match self.total {
            Some(0) => Some(100),
            Some(t) => Some((self.done.min(t) * 100) / t),
            None => None,
        }
    }
}

/// Counters collected over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub downloaded: u64,
    pub exported: u64,
    pub already_downloaded: u64,
    pub unknown_attachments: u64,
    pub missing_attachments: u64,
}

impl Summary {
    pub fn add(&mut self, other: Summary) {
        self.downloaded += other.downloaded;
        self.exported += other.exported;
        self.already_downloaded += other.already_downloaded;
        self.unknown_attachments += other.unknown_attachments;
        self.missing_attachments += other.missing_attachments;
    }
}
