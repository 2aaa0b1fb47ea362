//! Fetched page data.

/// A successfully fetched HTML page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// URL that was requested
    pub url: String,

    /// URL after redirects
    pub final_url: String,

    pub html: String,
}

/// Raw outcome of a single probe request. Non-2xx statuses are not errors here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub body: String,
}

impl ProbeResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}
