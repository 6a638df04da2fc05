use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;

/// What a response validator decided about a parsed payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Validated {
    /// Usable data, passed through unchanged.
    Payload(Value),
    /// The vendor answered but signalled "no data" or an application error.
    NoData { reason: String },
}

impl Validated {
    pub fn no_data(reason: impl Into<String>) -> Self {
        Self::NoData {
            reason: reason.into(),
        }
    }

    pub fn is_payload(&self) -> bool {
        matches!(self, Self::Payload(_))
    }

    pub fn into_payload(self) -> Option<Value> {
        match self {
            Self::Payload(value) => Some(value),
            Self::NoData { .. } => None,
        }
    }
}

/// Result recorded for one entity of a batch.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// Validated payload.
    Data { payload: Value },
    /// Soft failure: the vendor had nothing usable for this entity.
    Empty { reason: String },
    /// Hard failure scoped to this entity (network, HTTP, parse).
    Failed { error: String },
}

impl FetchOutcome {
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Data { payload } => Some(payload),
            _ => None,
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data { .. })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl From<Validated> for FetchOutcome {
    fn from(validated: Validated) -> Self {
        match validated {
            Validated::Payload(payload) => Self::Data { payload },
            Validated::NoData { reason } => Self::Empty { reason },
        }
    }
}

/// Ordered mapping from entity identifier to its outcome.
///
/// Every input entity has exactly one entry, in input order. Duplicate
/// identifiers in the input produce duplicate entries; [`get`](Self::get)
/// returns the first.
///
/// Serialises as a JSON object keyed by entity in first-seen order. An entity
/// that appears more than once maps to an array of its outcomes, in input
/// order, so no entry is lost.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchResult {
    entries: Vec<(String, FetchOutcome)>,
    throttle_pauses: usize,
}

impl BatchResult {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            throttle_pauses: 0,
        }
    }

    pub(crate) fn push(&mut self, entity: impl Into<String>, outcome: FetchOutcome) {
        self.entries.push((entity.into(), outcome));
    }

    pub(crate) fn record_pause(&mut self) {
        self.throttle_pauses += 1;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, entity: &str) -> Option<&FetchOutcome> {
        self.entries
            .iter()
            .find(|(key, _)| key == entity)
            .map(|(_, outcome)| outcome)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FetchOutcome)> {
        self.entries.iter().map(|(key, outcome)| (key.as_str(), outcome))
    }

    /// Number of rate-limit pauses taken while producing this result.
    pub fn throttle_pauses(&self) -> usize {
        self.throttle_pauses
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.is_data()).count()
    }

    pub fn empty(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.is_empty()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.is_failed()).count()
    }

    pub fn into_entries(self) -> Vec<(String, FetchOutcome)> {
        self.entries
    }
}

impl Serialize for BatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut grouped: Vec<(&str, Vec<&FetchOutcome>)> = Vec::with_capacity(self.entries.len());
        for (entity, outcome) in &self.entries {
            match grouped.iter_mut().find(|(key, _)| *key == entity.as_str()) {
                Some((_, outcomes)) => outcomes.push(outcome),
                None => grouped.push((entity.as_str(), vec![outcome])),
            }
        }

        let mut map = serializer.serialize_map(Some(grouped.len()))?;
        for (entity, outcomes) in &grouped {
            match outcomes.as_slice() {
                [single] => map.serialize_entry(entity, single)?,
                many => map.serialize_entry(entity, many)?,
            }
        }
        map.end()
    }
}
