use serde::Serialize;

/// One (ticker, form type) pair that could not be downloaded.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FilingFailure {
    pub ticker: String,
    pub form_type: String,
    pub error: String,
}

/// Summary of a filing download run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FilingReport {
    /// Downloader invocations, one per (ticker, form type) pair.
    pub attempted: usize,
    /// Documents written across all successful pairs.
    pub documents: usize,
    pub failures: Vec<FilingFailure>,
}

impl FilingReport {
    pub fn succeeded(&self) -> usize {
        self.attempted - self.failures.len()
    }
}
