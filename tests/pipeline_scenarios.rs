use network_atlas_lib::{
    bootstrap, get_account, go_back, go_forward, hover_timeline_point, leave_timeline_point, navigate,
    open_dashboard, require_account, select_account, sort_directory, AppState, DetailView, QueryState, Route,
    SortField, SortOrder, EM_DASH,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::time::Duration;

fn fixture() -> PathBuf {
    PathBuf::from("tests/fixtures/accounts.json")
}

fn settings_file(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("settings.yaml");
    let mut file = std::fs::File::create(&path).expect("create settings");
    file.write_all(contents.as_bytes()).expect("write settings");
    path
}

fn state() -> AppState {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = settings_file(dir.path(), "jitterSeed: 7\ntimelineEnd: 2025-01-01\n");
    bootstrap(&fixture(), Some(&settings)).expect("bootstrap")
}

fn handles(state: &AppState) -> Vec<String> {
    state
        .core
        .directory_page(10_000.0, 0.0)
        .rows
        .into_iter()
        .map(|row| row.handle)
        .collect()
}

#[test]
fn dataset_loads_with_lenient_fields() {
    let state = state();
    let store = state.core.store();
    assert_eq!(store.len(), 6);
    let (_, sara) = store.find_by_handle("@SaraK").expect("case-insensitive lookup");
    assert_eq!(sara.follower_count, Some(250));
    assert!(sara.creation_timestamp.is_some());
    let (_, zed) = store.find_by_handle("zed").expect("zed");
    assert_eq!(zed.creation_timestamp, None);
    assert_eq!(zed.follower_count, None);
}

#[test]
fn map_folds_case_variants_and_drops_unmapped_regions() {
    let state = state();
    let clusters = state.core.map_clusters();
    let names = clusters.iter().map(|cluster| cluster.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["Iraq", "France", "United States"]);
    assert_eq!(clusters[0].count, 2);
    assert_eq!(clusters[0].href, "/users?location=Iraq");
    assert!(clusters.iter().all(|cluster| !cluster.coordinate.is_sentinel()));
}

#[test]
fn directory_filters_by_canonical_region() {
    let state = state();
    navigate(&state, "/users".to_string());
    assert_eq!(handles(&state), vec!["ali_h", "nadia", "sarak", "emile", "omar", "Zed"]);

    state.core.set_location("Iraq");
    assert_eq!(handles(&state), vec!["ali_h", "sarak"]);

    state.core.set_location("All");
    state.core.set_search("RA");
    assert_eq!(handles(&state), vec!["ali_h", "sarak", "emile"]);
}

#[test]
fn sorting_by_name_uses_locale_order() {
    let state = state();
    navigate(&state, "/users".to_string());
    let query = sort_directory(&state, "name".to_string());
    assert_eq!((query.sort_field, query.sort_order), (SortField::Name, SortOrder::Asc));

    let page = state.core.directory_page(10_000.0, 0.0);
    let names = page.rows.iter().map(|row| row.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["Ali Hassan", "Émile Roux", "Nadia", "Omar", "Sara K", "zed"]);
    assert_eq!(page.rows[5].followers, EM_DASH);

    let fallback = sort_directory(&state, "shoe_size".to_string());
    assert_eq!(fallback.sort_field, SortField::FollowerCount);
    assert_eq!(fallback.sort_order, SortOrder::Asc);
    assert_eq!(handles(&state), vec!["Zed", "omar", "emile", "sarak", "nadia", "ali_h"]);
}

#[test]
fn directory_window_materializes_only_visible_rows() {
    let state = state();
    navigate(&state, "/users".to_string());
    let page = state.core.directory_page(130.0, 65.0);
    assert_eq!(page.total, 6);
    assert_eq!(page.window.start_index, 0);
    assert_eq!(page.window.end_index, 5);
    assert_eq!(page.window.total_extent, 390.0);
    assert_eq!(page.location_options[0], "All");
    assert!(page.location_options.contains(&"Unknown".to_string()));
}

#[test]
fn navigation_restores_query_state() {
    let state = state();
    let route = navigate(&state, "#/users?location=Iraq&sort=name&order=asc".to_string());
    let expected = QueryState::from_query("location=Iraq&sort=name&order=asc");
    assert_eq!(route, Route::Directory { query: expected });

    state.core.set_search("ali");
    select_account(&state, "ali_h".to_string());
    assert_eq!(state.core.current_route().href(), "/user/ali_h");

    let back = go_back(&state);
    let query = back.directory_query().expect("directory");
    assert_eq!(query.search, "ali");
    assert_eq!(query.location_filter, "Iraq");
    assert_eq!(query.sort_field, SortField::Name);
    assert_eq!(handles(&state), vec!["ali_h"]);

    assert_eq!(go_forward(&state), Route::account("ali_h"));
    assert_eq!(navigate(&state, "/definitely/not/a/page".to_string()), Route::Map);
}

#[test]
fn timeline_orders_points_and_skips_undated_records() {
    let state = state();
    let view = state.core.timeline_view("All");
    let order = view.points.iter().map(|point| point.handle.as_str()).collect::<Vec<_>>();
    assert_eq!(order, vec!["emile", "ali_h", "nadia", "sarak", "omar"]);
    assert!(view
        .points
        .iter()
        .all(|point| (0.0..=100.0).contains(&point.x_percent) && (20.0..=80.0).contains(&point.y_percent)));
    assert_eq!(view.ticks.first().map(|tick| tick.year), Some(2007));
    assert_eq!(view.ticks.last().map(|tick| tick.year), Some(2025));

    let again = bootstrap(&fixture(), None).expect("second load");
    let reloaded = again.core.timeline_view("All");
    assert_eq!(reloaded.points.len(), 5);

    let iraq = state.core.timeline_view("iraq");
    assert_eq!(iraq.points.len(), 2);
}

#[test]
fn analytics_match_hand_computed_totals() {
    let state = state();
    let summary = state.core.analytics();
    assert_eq!(summary.total_accounts.value, 6);
    assert_eq!(summary.total_reach.value, 16_655);
    assert_eq!(summary.total_reach.metric, "16.7K");
    assert_eq!(summary.total_reach.raw, "16,655");
    assert_eq!(summary.average_tweets.value, 1_219);
    assert_eq!(summary.top_regions[0].name, "Iraq");
    assert_eq!(summary.top_regions[0].value, 2);
    assert_eq!(summary.top_accounts[0].handle, "ali_h");
    assert_eq!(summary.region_share.len(), 5);
}

#[test]
fn account_detail_distinguishes_unknown_from_zero() {
    let state = state();
    let DetailView::Found(detail) = get_account(&state, "SARAK".to_string()) else {
        panic!("expected sarak");
    };
    assert_eq!(detail.followers, "250");
    assert_eq!(detail.following, EM_DASH);
    assert_eq!(detail.joined.as_deref(), Some("10/10/2018"));
    assert_eq!(detail.bio, "No biography available.");

    let missing = require_account(&state, "nobody".to_string()).expect_err("unknown handle");
    assert!(missing.starts_with("NOT_FOUND"));
}

#[test]
fn missing_dataset_is_reported_to_the_client() {
    let dir = tempfile::tempdir().expect("tempdir");
    let error = open_dashboard(dir.path().join("absent.json").to_string_lossy().to_string(), None)
        .err()
        .expect("missing dataset");
    assert!(error.starts_with("IO_FAILURE"), "{}", error);
    assert!(error.contains("absent.json"));
}

#[tokio::test(start_paused = true)]
async fn hover_grace_keeps_tooltip_reachable() {
    let state = state();
    let view = state.core.timeline_view("All");
    let target = view.points[0].record_index;

    state.core.hover_point(target);
    state.core.leave_point();
    tokio::time::sleep(Duration::from_millis(60)).await;
    state.core.enter_tooltip();
    tokio::time::sleep(Duration::from_millis(300)).await;

    let tooltip = state.core.timeline_view("All").tooltip.expect("tooltip still open");
    assert_eq!(tooltip.handle, "emile");
    assert_eq!(tooltip.placement.horizontal, network_atlas_lib::HorizontalAnchor::Left);

    state.core.leave_tooltip();
    assert!(state.core.timeline_view("All").tooltip.is_none());
}

#[tokio::test(start_paused = true)]
async fn scroll_bursts_publish_only_the_last_window() {
    let state = state();
    navigate(&state, "/users".to_string());
    let mut updates = state.core.subscribe_scroll();
    state.core.on_scroll(65.0, 0.0);
    state.core.on_scroll(65.0, 260.0);

    updates.changed().await.expect("published");
    let published = updates.borrow_and_update().clone();
    assert_eq!(published.end_index, 5);
    assert_eq!(published.start_index, 0);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!updates.has_changed().expect("sender alive"));
}

#[test]
fn hover_grace_holds_for_calls_made_outside_a_runtime() {
    let state = state();
    let target = state.core.timeline_view("All").points[0].record_index;

    hover_timeline_point(&state, target);
    leave_timeline_point(&state);
    assert_eq!(state.core.hovered(), Some(target));
    assert!(state.core.timeline_view("All").tooltip.is_some());

    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
    while state.core.hovered().is_some() && std::time::Instant::now() < deadline {
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
    assert_eq!(state.core.hovered(), None);
}
