mod aggregator;
mod analytics;
mod dashboard;
mod detail;
mod directory;
mod errors;
mod format;
mod hover;
mod memo;
mod models;
mod query;
mod region;
mod settings;
mod store;
mod timeline;
mod timing;
mod weight;
mod window;

pub use crate::aggregator::{aggregate, aggregate_with_diagnostics, Aggregation};
pub use crate::analytics::{region_counts, summarize, top_accounts};
pub use crate::dashboard::DashboardCore;
pub use crate::detail::{detail_view, profile_url};
pub use crate::directory::{derive, derive_indices, locale_cmp, location_options, CollationKey};
pub use crate::errors::{AppError, AppResult};
pub use crate::format::{compact, compact_or_dash, grouped, grouped_or_dash, EM_DASH};
pub use crate::hover::HoverController;
pub use crate::memo::Memo;
pub use crate::models::{
    AccountDetail, AccountReach, AnalyticsSummary, AppSettings, ArrowPosition, Coordinate, DetailView,
    DirectoryPage, DirectoryRow, HorizontalAnchor, Kpi, MapCluster, PointStyle, QueryState, Record,
    RegionCount, RegionGroup, ResolvedRegion, Route, SortField, SortOrder, TierPalette, TimelinePoint,
    TimelineTooltip, TimelineView, TooltipPlacement, VerticalAnchor, ViewWindow, VisualTier, VisualWeight,
    WindowRow, YearTick, ALL_LOCATIONS, UNKNOWN_REGION,
};
pub use crate::query::{History, QueryPatch};
pub use crate::region::RegionResolver;
pub use crate::settings::{load_settings, parse_settings};
pub use crate::store::{parse_timestamp, RecordStore};
pub use crate::timeline::{jitter, joined_label, layout, layout_subset, point_style, tooltip_placement, TimeAxis};
pub use crate::timing::{runtime_handle, Debouncer};
pub use crate::weight::{palette_for, size_for, tier_for, BASE_SIZE_PIXELS, SCALE_FACTOR, TIER_TABLE};
pub use crate::window::{window, ScrollScheduler};

use std::path::Path;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

/// Handle the UI shell keeps between command calls.
#[derive(Clone)]
pub struct AppState {
    pub core: Arc<DashboardCore>,
}

pub fn init_tracing(log_dir: &Path) -> Result<(), String> {
    std::fs::create_dir_all(log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "dashboard.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}

/// Loads settings and dataset, starting file logging when the settings name
/// a log directory.
pub fn bootstrap(dataset_path: &Path, settings_path: Option<&Path>) -> AppResult<AppState> {
    let settings = match settings_path {
        Some(path) => load_settings(path)?,
        None => AppSettings::default(),
    };
    if let Some(log_dir) = &settings.log_dir {
        if let Err(error) = init_tracing(log_dir) {
            tracing::warn!(error = %error, "failed to initialize file logging");
        }
    }

    let store = RecordStore::load(dataset_path)?;
    Ok(AppState {
        core: DashboardCore::new(store, settings)?,
    })
}

pub fn open_dashboard(dataset_path: String, settings_path: Option<String>) -> Result<AppState, String> {
    bootstrap(Path::new(&dataset_path), settings_path.as_deref().map(Path::new)).map_err(to_client_error)
}

pub fn get_map_clusters(state: &AppState) -> Vec<MapCluster> {
    state.core.map_clusters()
}

pub fn get_directory_page(state: &AppState, viewport_height: Option<f64>, scroll_offset: f64) -> DirectoryPage {
    let viewport_height = viewport_height.unwrap_or(state.core.settings().viewport_height);
    state.core.directory_page(viewport_height, scroll_offset)
}

pub fn scroll_directory(state: &AppState, viewport_height: Option<f64>, scroll_offset: f64) {
    let viewport_height = viewport_height.unwrap_or(state.core.settings().viewport_height);
    state.core.on_scroll(viewport_height, scroll_offset);
}

pub fn set_search(state: &AppState, search: String) -> QueryState {
    state.core.set_search(&search)
}

pub fn set_location_filter(state: &AppState, location: String) -> QueryState {
    state.core.set_location(&location)
}

/// Header click on a directory column. An unrecognized field name sorts by
/// the default column.
pub fn sort_directory(state: &AppState, field: String) -> QueryState {
    let field = SortField::from_param(&field).unwrap_or_else(|| {
        tracing::debug!(value = %field, "unknown sort field; using default");
        SortField::default()
    });
    state.core.toggle_sort(field)
}

pub fn navigate(state: &AppState, address: String) -> Route {
    state.core.navigate(&address)
}

pub fn select_region(state: &AppState, region: String) -> Route {
    state.core.select_region(&region)
}

pub fn select_account(state: &AppState, handle: String) -> Route {
    state.core.select_account(&handle)
}

pub fn go_back(state: &AppState) -> Route {
    state.core.back().unwrap_or_else(|| state.core.current_route())
}

pub fn go_forward(state: &AppState) -> Route {
    state.core.forward().unwrap_or_else(|| state.core.current_route())
}

pub fn get_timeline(state: &AppState, location: Option<String>) -> TimelineView {
    state.core.timeline_view(location.as_deref().unwrap_or(ALL_LOCATIONS))
}

pub fn hover_timeline_point(state: &AppState, record_index: usize) {
    state.core.hover_point(record_index);
}

pub fn leave_timeline_point(state: &AppState) {
    state.core.leave_point();
}

pub fn enter_timeline_tooltip(state: &AppState) {
    state.core.enter_tooltip();
}

pub fn leave_timeline_tooltip(state: &AppState) {
    state.core.leave_tooltip();
}

pub fn get_analytics(state: &AppState) -> AnalyticsSummary {
    state.core.analytics()
}

pub fn get_account(state: &AppState, handle: String) -> DetailView {
    state.core.account_detail(&handle)
}

pub fn require_account(state: &AppState, handle: String) -> Result<AccountDetail, String> {
    match state.core.account_detail(&handle) {
        DetailView::Found(detail) => Ok(*detail),
        DetailView::NotFound { handle } => Err(to_client_error(AppError::NotFound(format!("account @{}", handle)))),
    }
}

fn to_client_error(error: impl std::fmt::Display) -> String {
    error.to_string()
}
