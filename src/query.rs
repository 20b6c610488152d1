use crate::models::{QueryState, Route, SortField, SortOrder, ALL_LOCATIONS};
use std::borrow::Cow;

const KEY_SEARCH: &str = "search";
const KEY_LOCATION: &str = "location";
const KEY_SORT: &str = "sort";
const KEY_ORDER: &str = "order";

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

fn query_pairs(query: &str) -> impl Iterator<Item = (String, String)> + '_ {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (decode_component(key), decode_component(value)),
            None => (decode_component(pair), String::new()),
        })
}

impl QueryState {
    /// Rebuilds the state from its address form. Absent or unrecognized
    /// values fall back to the defaults; the first occurrence of a key wins.
    pub fn from_query(query: &str) -> Self {
        let mut state = Self::default();
        let mut seen = [false; 4];
        for (key, value) in query_pairs(query) {
            match key.as_str() {
                KEY_SEARCH if !seen[0] => {
                    seen[0] = true;
                    state.search = value;
                }
                KEY_LOCATION if !seen[1] => {
                    seen[1] = true;
                    if !value.is_empty() {
                        state.location_filter = value;
                    }
                }
                KEY_SORT if !seen[2] => {
                    seen[2] = true;
                    match SortField::from_param(&value) {
                        Some(field) => state.sort_field = field,
                        None => tracing::debug!(value = %value, "unknown sort field; using default"),
                    }
                }
                KEY_ORDER if !seen[3] => {
                    seen[3] = true;
                    if let Some(order) = SortOrder::from_param(&value) {
                        state.sort_order = order;
                    }
                }
                _ => {}
            }
        }
        state
    }

    pub fn to_query(&self) -> String {
        let mut pairs: Vec<(&str, Cow<'_, str>)> = Vec::new();
        if !self.search.is_empty() {
            pairs.push((KEY_SEARCH, urlencoding::encode(&self.search)));
        }
        if !self.location_filter.is_empty() && self.location_filter != ALL_LOCATIONS {
            pairs.push((KEY_LOCATION, urlencoding::encode(&self.location_filter)));
        }
        if self.sort_field != SortField::default() || self.sort_order != SortOrder::default() {
            pairs.push((KEY_SORT, Cow::Borrowed(self.sort_field.as_param())));
            pairs.push((KEY_ORDER, Cow::Borrowed(self.sort_order.as_param())));
        }
        pairs
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn is_location_filtered(&self) -> bool {
        !self.location_filter.is_empty() && self.location_filter != ALL_LOCATIONS
    }

    /// Returns the patched state; the receiver is untouched so a reader never
    /// observes a half-applied change.
    pub fn apply(&self, patch: &QueryPatch) -> Self {
        let mut next = self.clone();
        if let Some(search) = &patch.search {
            next.search = search.clone();
        }
        if let Some(location) = &patch.location_filter {
            next.location_filter = if location.is_empty() {
                ALL_LOCATIONS.to_string()
            } else {
                location.clone()
            };
        }
        if let Some(field) = patch.sort_field {
            next.sort_field = field;
        }
        if let Some(order) = patch.sort_order {
            next.sort_order = order;
        }
        next
    }
}

/// One user action against the directory query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPatch {
    pub search: Option<String>,
    pub location_filter: Option<String>,
    pub sort_field: Option<SortField>,
    pub sort_order: Option<SortOrder>,
}

impl QueryPatch {
    pub fn search(value: impl Into<String>) -> Self {
        Self {
            search: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn location(value: impl Into<String>) -> Self {
        Self {
            location_filter: Some(value.into()),
            ..Self::default()
        }
    }

    /// Clicking a column header: ascending first, descending when the column
    /// is already sorted ascending.
    pub fn toggle_sort(current: &QueryState, field: SortField) -> Self {
        let ascending = current.sort_field == field && current.sort_order == SortOrder::Asc;
        Self {
            sort_field: Some(field),
            sort_order: Some(if ascending { SortOrder::Desc } else { SortOrder::Asc }),
            ..Self::default()
        }
    }
}

impl Route {
    /// Parses an address such as `#/users?location=Iraq` or `/user/alice`.
    /// Anything unrecognized redirects to the map.
    pub fn parse(address: &str) -> Self {
        let address = address.trim().trim_start_matches('#');
        let (path, query) = match address.split_once('?') {
            Some((path, query)) => (path, query),
            None => (address, ""),
        };
        let segments = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>();

        match segments.as_slice() {
            [] => Self::Map,
            ["users"] => Self::Directory {
                query: QueryState::from_query(query),
            },
            ["insights"] => Self::Insights,
            ["timeline"] => Self::Timeline,
            ["user", handle] => {
                let handle = decode_component(handle);
                if handle.trim().is_empty() {
                    Self::Map
                } else {
                    Self::Account { handle }
                }
            }
            _ => Self::Map,
        }
    }

    pub fn href(&self) -> String {
        match self {
            Self::Map => "/".to_string(),
            Self::Directory { query } => {
                let query = query.to_query();
                if query.is_empty() {
                    "/users".to_string()
                } else {
                    format!("/users?{}", query)
                }
            }
            Self::Insights => "/insights".to_string(),
            Self::Timeline => "/timeline".to_string(),
            Self::Account { handle } => format!("/user/{}", urlencoding::encode(handle)),
        }
    }

    pub fn account(handle: &str) -> Self {
        Self::Account {
            handle: handle.to_string(),
        }
    }

    /// Directory filtered to one region, as reached from a map cluster.
    pub fn region_directory(region: &str) -> Self {
        Self::Directory {
            query: QueryState::default().apply(&QueryPatch::location(region)),
        }
    }

    pub fn directory_query(&self) -> Option<&QueryState> {
        match self {
            Self::Directory { query } => Some(query),
            _ => None,
        }
    }
}

/// Back/forward stack of visited routes. Navigation pushes; query edits
/// replace the current entry.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Route>,
    cursor: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Route::Map)
    }
}

impl History {
    pub fn new(initial: Route) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
        }
    }

    pub fn current(&self) -> &Route {
        &self.entries[self.cursor]
    }

    pub fn push(&mut self, route: Route) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(route);
        self.cursor = self.entries.len() - 1;
    }

    pub fn replace(&mut self, route: Route) {
        self.entries[self.cursor] = route;
    }

    pub fn back(&mut self) -> Option<&Route> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    pub fn forward(&mut self) -> Option<&Route> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
