//! Shareable location (URL query string) port.

use std::sync::Mutex;

use crate::codec::QueryParams;

/// The addressable, shareable query-string state of a view.
///
/// Writes replace the current state without adding a history entry.
pub trait LocationStore: Send + Sync {
    /// Read the current query parameters.
    fn read_query_params(&self) -> QueryParams;

    /// Replace the current query parameters.
    fn write_query_params(&self, params: &QueryParams);
}

/// In-memory location, used for tests and non-browser front ends.
#[derive(Debug, Default)]
pub struct MemoryLocation {
    state: Mutex<LocationState>,
}

#[derive(Debug, Default)]
struct LocationState {
    current: QueryParams,
    writes: usize,
}

impl MemoryLocation {
    /// Create an empty location.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a location from a query string such as `?breed=Zebu&page=2`.
    pub fn from_query_string(query_string: &str) -> Self {
        Self::with_params(QueryParams::parse(query_string))
    }

    /// Create a location holding the given parameters.
    pub fn with_params(params: QueryParams) -> Self {
        Self {
            state: Mutex::new(LocationState {
                current: params,
                writes: 0,
            }),
        }
    }

    /// The current query string, with a leading `?` when non-empty.
    pub fn query_string(&self) -> String {
        self.read_query_params().to_string()
    }

    /// Number of replacements performed so far.
    pub fn write_count(&self) -> usize {
        match self.state.lock() {
            Ok(state) => state.writes,
            Err(poisoned) => poisoned.into_inner().writes,
        }
    }
}

impl LocationStore for MemoryLocation {
    fn read_query_params(&self) -> QueryParams {
        match self.state.lock() {
            Ok(state) => state.current.clone(),
            Err(poisoned) => poisoned.into_inner().current.clone(),
        }
    }

    fn write_query_params(&self, params: &QueryParams) {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.current = params.clone();
        state.writes += 1;
    }
}
