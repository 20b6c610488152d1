use crate::aggregator::aggregate;
use crate::analytics::summarize;
use crate::detail::detail_view;
use crate::directory::{derive_indices, location_options};
use crate::errors::AppResult;
use crate::format::compact_or_dash;
use crate::hover::HoverController;
use crate::memo::Memo;
use crate::models::{
    AnalyticsSummary, AppSettings, DetailView, DirectoryPage, DirectoryRow, MapCluster, QueryState, Route,
    SortField, TimelinePoint, TimelineTooltip, TimelineView, ViewWindow, ALL_LOCATIONS, UNKNOWN_REGION,
};
use crate::query::{History, QueryPatch};
use crate::region::RegionResolver;
use crate::store::RecordStore;
use crate::timeline::{joined_label, layout_subset, point_style, tooltip_placement, TimeAxis};
use crate::timing::runtime_handle;
use crate::weight;
use crate::window::{window, ScrollScheduler};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::time::Duration;

type DirectoryKey = (u64, QueryState);
type TimelineKey = (u64, String);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the loaded dataset and every piece of view state derived from it.
/// All view operations go through here.
pub struct DashboardCore {
    store: RecordStore,
    settings: AppSettings,
    resolver: RegionResolver,
    session_seed: u64,
    axis: TimeAxis,
    history: Mutex<History>,
    directory_cache: Mutex<Memo<DirectoryKey, Arc<[usize]>>>,
    timeline_cache: Mutex<Memo<TimelineKey, Arc<[TimelinePoint]>>>,
    hover: HoverController,
    scroll: ScrollScheduler,
}

impl DashboardCore {
    /// Builds the core on the caller's tokio runtime when there is one, so
    /// the hover and scroll timers run there; otherwise on the shared timer
    /// runtime.
    pub fn new(store: RecordStore, settings: AppSettings) -> AppResult<Arc<Self>> {
        let settings = settings.sanitized();
        let session_seed = settings.jitter_seed.unwrap_or_else(rand::random);
        let axis = TimeAxis::from_dates(settings.timeline_start, settings.timeline_end);
        let runtime = runtime_handle()?;
        let hover = HoverController::new(Duration::from_millis(settings.hover_grace_ms), runtime.clone());
        let scroll = ScrollScheduler::new(
            settings.row_height,
            settings.overscan,
            Duration::from_millis(settings.scroll_debounce_ms),
            runtime,
        );

        tracing::info!(
            records = store.len(),
            generation = store.generation(),
            axis_start = %axis.start,
            axis_end = %axis.end,
            "dashboard core ready"
        );

        Ok(Arc::new(Self {
            store,
            settings,
            resolver: RegionResolver::new(),
            session_seed,
            axis,
            history: Mutex::new(History::default()),
            directory_cache: Mutex::new(Memo::new()),
            timeline_cache: Mutex::new(Memo::new()),
            hover,
            scroll,
        }))
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn session_seed(&self) -> u64 {
        self.session_seed
    }

    pub fn time_axis(&self) -> TimeAxis {
        self.axis
    }

    pub fn map_clusters(&self) -> Vec<MapCluster> {
        aggregate(self.store.records(), &self.resolver)
            .into_iter()
            .map(|group| {
                let count = group.count();
                MapCluster {
                    href: Route::region_directory(&group.name).href(),
                    weight: weight::resolve(count),
                    name: group.name,
                    coordinate: group.coordinate,
                    count,
                }
            })
            .collect()
    }

    /// Query of the directory entry the history currently points at, or the
    /// defaults when another view is showing.
    pub fn current_query(&self) -> QueryState {
        lock(&self.history)
            .current()
            .directory_query()
            .cloned()
            .unwrap_or_default()
    }

    pub fn directory_indices(&self, query: &QueryState) -> Arc<[usize]> {
        let key = (self.store.generation(), query.clone());
        lock(&self.directory_cache).get_or_compute(key, |(_, query)| {
            derive_indices(self.store.records(), query, &self.resolver).into()
        })
    }

    /// How often the filtered view was actually derived.
    pub fn directory_computations(&self) -> u64 {
        lock(&self.directory_cache).computations()
    }

    pub fn directory_page(&self, viewport_height: f64, scroll_offset: f64) -> DirectoryPage {
        let query = self.current_query();
        let indices = self.directory_indices(&query);
        let computed = window(
            indices.len(),
            viewport_height,
            scroll_offset,
            self.settings.row_height,
            self.settings.overscan,
        );
        let rows = computed
            .rows
            .iter()
            .filter_map(|row| {
                let store_index = *indices.get(row.index)?;
                let record = self.store.get(store_index)?;
                Some(DirectoryRow {
                    index: store_index,
                    offset_pixels: row.offset_pixels,
                    handle: record.handle.clone(),
                    name: record.name.clone(),
                    initial: record.initial(),
                    avatar_url: record.avatar_url.clone(),
                    location: record
                        .location_label
                        .clone()
                        .filter(|label| !label.trim().is_empty())
                        .unwrap_or_else(|| UNKNOWN_REGION.to_string()),
                    followers: compact_or_dash(record.follower_count),
                    tweets: compact_or_dash(record.tweet_count),
                    href: Route::account(&record.handle).href(),
                })
            })
            .collect();

        DirectoryPage {
            query,
            total: indices.len(),
            window: computed,
            rows,
            location_options: location_options(self.store.records(), &self.resolver),
        }
    }

    /// Debounced window recomputation for the current directory view.
    pub fn on_scroll(&self, viewport_height: f64, scroll_offset: f64) {
        let total = self.directory_indices(&self.current_query()).len();
        self.scroll.on_scroll(total, viewport_height, scroll_offset);
    }

    pub fn scroll_window(&self) -> ViewWindow {
        self.scroll.current()
    }

    pub fn subscribe_scroll(&self) -> watch::Receiver<ViewWindow> {
        self.scroll.subscribe()
    }

    /// Applies a directory query edit as one swap of the current history
    /// entry. From another view it navigates to the directory instead.
    pub fn apply_query_patch(&self, patch: &QueryPatch) -> QueryState {
        let mut history = lock(&self.history);
        let (next, in_directory) = match history.current().directory_query() {
            Some(current) => (current.apply(patch), true),
            None => (QueryState::default().apply(patch), false),
        };
        let route = Route::Directory { query: next.clone() };
        if in_directory {
            history.replace(route);
        } else {
            history.push(route);
        }
        tracing::debug!(query = %next.to_query(), "directory query updated");
        next
    }

    pub fn set_search(&self, search: &str) -> QueryState {
        self.apply_query_patch(&QueryPatch::search(search))
    }

    pub fn set_location(&self, location: &str) -> QueryState {
        self.apply_query_patch(&QueryPatch::location(location))
    }

    pub fn toggle_sort(&self, field: SortField) -> QueryState {
        let current = self.current_query();
        self.apply_query_patch(&QueryPatch::toggle_sort(&current, field))
    }

    pub fn navigate(&self, address: &str) -> Route {
        let route = Route::parse(address);
        lock(&self.history).push(route.clone());
        route
    }

    /// Map cluster click: the directory filtered to that region.
    pub fn select_region(&self, region: &str) -> Route {
        let canonical = self.resolver.canonical_name(Some(region));
        let route = Route::region_directory(&canonical);
        lock(&self.history).push(route.clone());
        route
    }

    pub fn select_account(&self, handle: &str) -> Route {
        let route = Route::account(handle);
        lock(&self.history).push(route.clone());
        route
    }

    pub fn back(&self) -> Option<Route> {
        lock(&self.history).back().cloned()
    }

    pub fn forward(&self) -> Option<Route> {
        lock(&self.history).forward().cloned()
    }

    pub fn current_route(&self) -> Route {
        lock(&self.history).current().clone()
    }

    /// Timeline points for a location filter; "All" (or empty) keeps every
    /// record. Computed once per dataset load and filter.
    pub fn timeline_points(&self, location: &str) -> Arc<[TimelinePoint]> {
        let location = location.trim();
        let location = if location.is_empty() { ALL_LOCATIONS } else { location };
        let key = (self.store.generation(), location.to_string());
        lock(&self.timeline_cache).get_or_compute(key, |(_, location)| {
            let records = self.store.records();
            let indices = if location == ALL_LOCATIONS {
                (0..records.len()).collect::<Vec<_>>()
            } else {
                let wanted = self.resolver.canonical_name(Some(location.as_str()));
                records
                    .iter()
                    .enumerate()
                    .filter(|(_, record)| self.resolver.canonical_name(record.location_label.as_deref()) == wanted)
                    .map(|(index, _)| index)
                    .collect()
            };
            layout_subset(records, &indices, &self.axis, self.session_seed).into()
        })
    }

    pub fn timeline_view(&self, location: &str) -> TimelineView {
        let hovered = self.hover.hovered();
        let mut points = self.timeline_points(location).to_vec();
        for point in &mut points {
            point.is_hovered = Some(point.record_index) == hovered;
            point.style = point_style(point.is_hovered);
        }

        let tooltip = points.iter().find(|point| point.is_hovered).and_then(|point| {
            let record = self.store.get(point.record_index)?;
            Some(TimelineTooltip {
                handle: record.handle.clone(),
                name: record.name.clone(),
                avatar_url: record.avatar_url.clone(),
                joined: joined_label(point.timestamp),
                href: Route::account(&record.handle).href(),
                placement: tooltip_placement(point.x_percent, point.y_percent),
            })
        });

        TimelineView {
            points,
            ticks: self.axis.year_ticks(),
            tooltip,
            location_options: location_options(self.store.records(), &self.resolver),
        }
    }

    pub fn hover_point(&self, record_index: usize) {
        self.hover.enter_point(record_index);
    }

    pub fn leave_point(&self) {
        self.hover.leave_point();
    }

    pub fn enter_tooltip(&self) {
        self.hover.enter_tooltip();
    }

    pub fn leave_tooltip(&self) {
        self.hover.leave_tooltip();
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hover.hovered()
    }

    pub fn subscribe_hover(&self) -> watch::Receiver<Option<usize>> {
        self.hover.subscribe()
    }

    pub fn analytics(&self) -> AnalyticsSummary {
        summarize(self.store.records(), &self.resolver, &self.settings)
    }

    pub fn account_detail(&self, handle: &str) -> DetailView {
        detail_view(&self.store, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::DashboardCore;
    use crate::models::{AppSettings, QueryState, Record, Route, SortField, SortOrder};
    use crate::store::RecordStore;
    use crate::timeline::point_style;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn record(handle: &str, location: Option<&str>, followers: Option<u64>, year: Option<i32>) -> Record {
        Record {
            id: handle.to_string(),
            name: handle.to_uppercase(),
            handle: handle.to_string(),
            location_label: location.map(str::to_string),
            follower_count: followers,
            tweet_count: None,
            following_count: None,
            creation_timestamp: year.and_then(|year| Utc.with_ymd_and_hms(year, 6, 1, 0, 0, 0).single()),
            avatar_url: None,
            bio: None,
        }
    }

    fn core() -> Arc<DashboardCore> {
        let store = RecordStore::new(vec![
            record("a", Some("Iraq"), Some(10), Some(2010)),
            record("b", Some("iraq"), Some(30), None),
            record("c", Some("Egypt"), Some(20), Some(2015)),
            record("d", None, None, Some(2012)),
        ]);
        let settings = AppSettings {
            jitter_seed: Some(11),
            ..AppSettings::default()
        };
        DashboardCore::new(store, settings).expect("dashboard core")
    }

    #[test]
    fn clusters_fold_case_and_link_to_directory() {
        let core = core();
        let clusters = core.map_clusters();
        let iraq = clusters.iter().find(|cluster| cluster.name == "Iraq").expect("iraq cluster");
        assert_eq!(iraq.count, 2);
        assert_eq!(iraq.weight.size_pixels, 18);
        assert_eq!(iraq.href, "/users?location=Iraq");
        assert!(clusters.iter().all(|cluster| cluster.name != "Unknown"));
    }

    #[test]
    fn directory_is_memoized_per_query() {
        let core = core();
        core.navigate("/users");
        let first = core.directory_page(650.0, 0.0);
        let second = core.directory_page(650.0, 300.0);
        assert_eq!(first.total, 4);
        assert_eq!(second.total, 4);
        assert_eq!(core.directory_computations(), 1);
        assert_eq!(first.rows[0].handle, "b");
        assert_eq!(first.rows[3].followers, "\u{2014}");

        core.set_location("IRAQ");
        let filtered = core.directory_page(650.0, 0.0);
        assert_eq!(filtered.total, 2);
        assert_eq!(core.directory_computations(), 2);
    }

    #[test]
    fn query_edits_replace_and_navigation_pushes() {
        let core = core();
        core.select_region("iraq");
        assert_eq!(core.current_query().location_filter, "Iraq");

        core.set_search("a");
        let sorted = core.toggle_sort(SortField::Name);
        assert_eq!(sorted.sort_order, SortOrder::Asc);
        core.select_account("a");
        assert_eq!(core.current_route(), Route::account("a"));

        let restored = core.back().expect("directory entry");
        let query = restored.directory_query().expect("directory route");
        assert_eq!(query.search, "a");
        assert_eq!(query.sort_field, SortField::Name);
        assert_eq!(core.back(), Some(Route::Map));
        assert_eq!(core.back(), None);
    }

    #[test]
    fn query_patch_from_another_view_opens_the_directory() {
        let core = core();
        let query = core.set_search("egy");
        assert_eq!(core.current_route(), Route::Directory { query: query.clone() });
        assert_eq!(core.back(), Some(Route::Map));
        assert_eq!(core.current_query(), QueryState::default());
    }

    #[test]
    fn timeline_filters_and_tooltips() {
        let core = core();
        let all = core.timeline_view("All");
        assert_eq!(all.points.len(), 3);
        assert!(all.tooltip.is_none());

        let unknown = core.timeline_points("Unknown");
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].handle, "d");

        core.hover_point(2);
        let hovered = core.timeline_view("");
        let tooltip = hovered.tooltip.expect("tooltip for hovered point");
        assert_eq!(tooltip.handle, "c");
        assert_eq!(tooltip.joined, "Jun 1, 2015");
        assert_eq!(tooltip.href, "/user/c");
        assert_eq!(hovered.points.iter().filter(|point| point.is_hovered).count(), 1);
    }

    #[test]
    fn hovered_point_is_drawn_larger() {
        let core = core();
        core.hover_point(0);
        let view = core.timeline_view("All");
        let hovered = view.points.iter().find(|point| point.is_hovered).expect("hovered point");
        assert_eq!(hovered.record_index, 0);
        assert_eq!(hovered.style, point_style(true));
        assert!(view
            .points
            .iter()
            .filter(|point| !point.is_hovered)
            .all(|point| point.style == point_style(false)));
        assert!(hovered.style.radius > point_style(false).radius);

        core.leave_tooltip();
        let cleared = core.timeline_view("All");
        assert!(cleared.points.iter().all(|point| point.style == point_style(false)));
    }

    #[test]
    fn leaving_a_point_outside_a_runtime_waits_for_grace() {
        let core = core();
        core.hover_point(2);
        core.leave_point();
        assert_eq!(core.hovered(), Some(2));
        assert!(core.timeline_view("All").tooltip.is_some());
    }

    #[test]
    fn jitter_is_stable_across_views() {
        let core = core();
        let first = core.timeline_view("All");
        let second = core.timeline_view("All");
        assert_eq!(first.points, second.points);
    }
}
