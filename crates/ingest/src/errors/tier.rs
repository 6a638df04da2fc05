/// Classification of an [`IngestError`](super::IngestError) by who has to act on it.
///
/// # Behavior Summary
///
/// | Tier | Abort the operation? | Recorded against the entity? |
/// |------|----------------------|------------------------------|
/// | `Configuration` | Yes | No |
/// | `Entity` | No | Yes (`Failed` outcome or `error` field) |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorTier {
    /// Caller or setup mistake: missing credential, unsupported selector,
    /// malformed setting. Returned immediately and never retried.
    Configuration,

    /// Failure scoped to one entity (network, HTTP status, unparseable body,
    /// downloader error). Caught at the batch boundary; the batch continues.
    Entity,
}
