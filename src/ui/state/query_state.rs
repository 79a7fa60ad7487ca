use std::collections::{HashMap, HashSet, VecDeque};

use crate::domain::entities::records::{Page, SalesPerformance};
use crate::usecase::ports::api::{ApiError, QueryKey};

const MAX_CACHED_RESPONSES: usize = 32;

pub trait RowCount {
    fn row_count(&self) -> usize;
}

impl<T> RowCount for Page<T> {
    fn row_count(&self) -> usize {
        self.rows.len()
    }
}

impl RowCount for SalesPerformance {
    fn row_count(&self) -> usize {
        self.team_performance.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewStatus {
    Loading,
    Error(ApiError),
    Empty,
    Loaded,
}

impl ViewStatus {
    /// Data wins over a stale error; with neither, the view is still
    /// waiting on its first response.
    pub fn classify<T: RowCount>(
        is_loading: bool,
        error: Option<&ApiError>,
        data: Option<&T>,
    ) -> ViewStatus {
        match (is_loading, error, data) {
            (_, _, Some(data)) if data.row_count() > 0 => ViewStatus::Loaded,
            (_, _, Some(_)) => ViewStatus::Empty,
            (_, Some(error), None) => ViewStatus::Error(error.clone()),
            (_, None, None) => ViewStatus::Loading,
        }
    }
}

/// Responses for one view, keyed by request parameters. Only the response
/// for the current key is ever shown, so a slow answer to an older request
/// cannot replace newer data.
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    current: Option<QueryKey>,
    cache: HashMap<QueryKey, T>,
    order: VecDeque<QueryKey>,
    errors: HashMap<QueryKey, ApiError>,
    in_flight: HashSet<QueryKey>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            current: None,
            cache: HashMap::new(),
            order: VecDeque::new(),
            errors: HashMap::new(),
            in_flight: HashSet::new(),
        }
    }
}

impl<T: RowCount> QueryState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `key` current. Returns true when the caller should fetch it.
    ///
    /// A key that is already current and failed keeps its error until
    /// [`QueryState::retry`]; errors for any other key are dropped.
    pub fn request(&mut self, key: QueryKey) -> bool {
        let same_key = self.current.as_ref() == Some(&key);
        self.current = Some(key.clone());
        self.errors.retain(|k, _| k == &key);
        if self.cache.contains_key(&key) || self.in_flight.contains(&key) {
            return false;
        }
        if same_key && self.errors.contains_key(&key) {
            return false;
        }
        self.errors.remove(&key);
        self.in_flight.insert(key);
        true
    }

    /// Stores a response. Returns true if it belongs to the current key.
    pub fn resolve(&mut self, key: QueryKey, result: Result<T, ApiError>) -> bool {
        self.in_flight.remove(&key);
        match result {
            Ok(data) => {
                self.errors.remove(&key);
                self.remember(key.clone(), data);
            }
            Err(error) if self.current.as_ref() == Some(&key) => {
                self.errors.insert(key.clone(), error);
            }
            Err(_) => {}
        }
        self.current.as_ref() == Some(&key)
    }

    fn remember(&mut self, key: QueryKey, data: T) {
        if self.cache.insert(key.clone(), data).is_none() {
            self.order.push_back(key);
        }
        while self.order.len() > MAX_CACHED_RESPONSES {
            if let Some(oldest) = self.order.pop_front() {
                self.cache.remove(&oldest);
            }
        }
    }

    /// Forgets whatever is stored for the current key so the next
    /// `request` with the same parameters fetches again.
    pub fn retry(&mut self) -> Option<QueryKey> {
        let key = self.current.clone()?;
        self.cache.remove(&key);
        self.order.retain(|k| k != &key);
        self.errors.remove(&key);
        Some(key)
    }

    pub fn is_loading(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|key| self.in_flight.contains(key) && !self.cache.contains_key(key))
    }

    /// Every cached response, oldest first.
    pub fn cached(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|key| self.cache.get(key))
    }

    pub fn data(&self) -> Option<&T> {
        self.current.as_ref().and_then(|key| self.cache.get(key))
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.current.as_ref().and_then(|key| self.errors.get(key))
    }

    pub fn status(&self) -> ViewStatus {
        ViewStatus::classify(self.is_loading(), self.error(), self.data())
    }
}
