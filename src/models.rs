use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One tracked account. Owned by the [`crate::store::RecordStore`]; every
/// derived view refers back to it by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub name: String,
    pub handle: String,
    pub location_label: Option<String>,
    pub follower_count: Option<u64>,
    pub tweet_count: Option<u64>,
    pub following_count: Option<u64>,
    pub creation_timestamp: Option<DateTime<Utc>>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

impl Record {
    pub fn followers_or_zero(&self) -> u64 {
        self.follower_count.unwrap_or(0)
    }

    pub fn tweets_or_zero(&self) -> u64 {
        self.tweet_count.unwrap_or(0)
    }

    /// First character of the display name, used for avatar placeholders.
    pub fn initial(&self) -> Option<char> {
        self.name.chars().next().map(|c| c.to_uppercase().next().unwrap_or(c))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const SENTINEL: Coordinate = Coordinate { lat: 0.0, lng: 0.0 };

    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_sentinel(&self) -> bool {
        self.lat == 0.0 && self.lng == 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRegion {
    pub canonical_name: String,
    pub coordinate: Coordinate,
    pub mapped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionGroup {
    pub name: String,
    pub coordinate: Coordinate,
    pub members: Vec<usize>,
}

impl RegionGroup {
    pub fn count(&self) -> usize {
        self.members.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Name,
    Location,
    #[default]
    FollowerCount,
    TweetCount,
}

impl SortField {
    pub const ALL: [SortField; 4] = [
        SortField::Name,
        SortField::Location,
        SortField::FollowerCount,
        SortField::TweetCount,
    ];

    pub fn as_param(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Location => "account_based_in",
            Self::FollowerCount => "follower_count",
            Self::TweetCount => "number_of_tweets",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_param() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

pub const ALL_LOCATIONS: &str = "All";
pub const UNKNOWN_REGION: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryState {
    pub search: String,
    pub location_filter: String,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search: String::new(),
            location_filter: ALL_LOCATIONS.to_string(),
            sort_field: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowRow {
    pub index: usize,
    pub offset_pixels: f64,
}

/// Materialized slice of a long list. When `rows` is empty the indices carry
/// no meaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewWindow {
    pub start_index: usize,
    pub end_index: usize,
    pub rows: Vec<WindowRow>,
    pub total_extent: f64,
}

impl ViewWindow {
    pub fn empty() -> Self {
        Self {
            start_index: 0,
            end_index: 0,
            rows: Vec::new(),
            total_extent: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn indices(&self) -> std::ops::Range<usize> {
        if self.rows.is_empty() {
            0..0
        } else {
            self.start_index..self.end_index + 1
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualTier {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierPalette {
    pub gradient_from: &'static str,
    pub gradient_to: &'static str,
    pub solid: &'static str,
    pub shadow: &'static str,
}

impl TierPalette {
    pub fn gradient_css(&self) -> String {
        format!("linear-gradient(135deg, {}, {})", self.gradient_from, self.gradient_to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualWeight {
    pub size_pixels: u32,
    pub tier: VisualTier,
    pub palette: TierPalette,
    pub font_class: &'static str,
    pub anchor_pixels: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapCluster {
    pub name: String,
    pub coordinate: Coordinate,
    pub count: usize,
    pub weight: VisualWeight,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    pub record_index: usize,
    pub handle: String,
    pub timestamp: DateTime<Utc>,
    pub x_percent: f64,
    pub y_percent: f64,
    pub is_hovered: bool,
    pub style: PointStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearTick {
    pub year: i32,
    pub x_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAnchor {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAnchor {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ArrowPosition {
    FromLeft { pixels: u32 },
    FromRight { pixels: u32 },
    Centered,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipPlacement {
    pub horizontal: HorizontalAnchor,
    pub vertical: VerticalAnchor,
    pub left_percent: f64,
    pub top_percent: f64,
    pub transform: String,
    pub margin_top_pixels: u32,
    pub arrow: ArrowPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointStyle {
    pub radius: f64,
    pub fill: &'static str,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineTooltip {
    pub handle: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub joined: String,
    pub href: String,
    pub placement: TooltipPlacement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineView {
    pub points: Vec<TimelinePoint>,
    pub ticks: Vec<YearTick>,
    pub tooltip: Option<TimelineTooltip>,
    pub location_options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryRow {
    pub index: usize,
    pub offset_pixels: f64,
    pub handle: String,
    pub name: String,
    pub initial: Option<char>,
    pub avatar_url: Option<String>,
    pub location: String,
    pub followers: String,
    pub tweets: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryPage {
    pub query: QueryState,
    pub total: usize,
    pub window: ViewWindow,
    pub rows: Vec<DirectoryRow>,
    pub location_options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    pub title: &'static str,
    pub description: &'static str,
    pub value: u64,
    pub metric: String,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionCount {
    pub name: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountReach {
    pub handle: String,
    pub followers: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_accounts: Kpi,
    pub total_reach: Kpi,
    pub average_tweets: Kpi,
    pub top_regions: Vec<RegionCount>,
    pub top_accounts: Vec<AccountReach>,
    pub region_share: Vec<RegionCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDetail {
    pub id: String,
    pub name: String,
    pub handle: String,
    pub location: String,
    pub joined: Option<String>,
    pub bio: String,
    pub avatar_url: Option<String>,
    pub followers: String,
    pub tweets: String,
    pub following: String,
    pub profile_url: String,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum DetailView {
    Found(Box<AccountDetail>),
    NotFound { handle: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum Route {
    Map,
    Directory { query: QueryState },
    Insights,
    Timeline,
    Account { handle: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSettings {
    pub row_height: f64,
    pub overscan: usize,
    pub viewport_height: f64,
    pub scroll_debounce_ms: u64,
    pub hover_grace_ms: u64,
    pub timeline_start: NaiveDate,
    pub timeline_end: Option<NaiveDate>,
    pub jitter_seed: Option<u64>,
    pub top_regions: usize,
    pub top_accounts: usize,
    pub share_slices: usize,
    pub log_dir: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            row_height: 65.0,
            overscan: 10,
            viewport_height: 650.0,
            scroll_debounce_ms: 16,
            hover_grace_ms: 100,
            timeline_start: NaiveDate::from_ymd_opt(2007, 1, 1).unwrap_or_default(),
            timeline_end: None,
            jitter_seed: None,
            top_regions: 10,
            top_accounts: 8,
            share_slices: 5,
            log_dir: None,
        }
    }
}
