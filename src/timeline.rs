use crate::models::{
    ArrowPosition, HorizontalAnchor, PointStyle, Record, TimelinePoint, TooltipPlacement, VerticalAnchor,
    YearTick,
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const JITTER_MIN_PERCENT: f64 = 20.0;
pub const JITTER_MAX_PERCENT: f64 = 80.0;

const LEFT_EDGE_PERCENT: f64 = 20.0;
const RIGHT_EDGE_PERCENT: f64 = 80.0;
const NEAR_TOP_PERCENT: f64 = 30.0;
const ARROW_INSET_PIXELS: u32 = 20;
const BELOW_MARGIN_PIXELS: u32 = 15;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Fixed horizontal time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeAxis {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeAxis {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn from_dates(start: NaiveDate, end: Option<NaiveDate>) -> Self {
        let start = start.and_hms_opt(0, 0, 0).map(|value| value.and_utc()).unwrap_or_default();
        let end = end
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|value| value.and_utc())
            .unwrap_or_else(Utc::now);
        Self { start, end }
    }

    pub fn x_percent(&self, timestamp: DateTime<Utc>) -> f64 {
        let span = (self.end - self.start).num_milliseconds();
        if span <= 0 {
            return 0.0;
        }
        let offset = (timestamp - self.start).num_milliseconds();
        (offset as f64 / span as f64 * 100.0).clamp(0.0, 100.0)
    }

    /// January 1st of every year the axis spans.
    pub fn year_ticks(&self) -> Vec<YearTick> {
        (self.start.year()..=self.end.year())
            .filter_map(|year| NaiveDate::from_ymd_opt(year, 1, 1))
            .filter_map(|date| date.and_hms_opt(0, 0, 0))
            .map(|value| {
                let timestamp = value.and_utc();
                YearTick {
                    year: timestamp.year(),
                    x_percent: self.x_percent(timestamp),
                }
            })
            .collect()
    }
}

fn identity_hash(value: &str) -> u64 {
    value
        .bytes()
        .fold(FNV_OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME))
}

/// Vertical position for a record, uniform in [20, 80]. Stable for a given
/// record id and session seed.
pub fn jitter(record_id: &str, session_seed: u64) -> f64 {
    let mut rng = StdRng::seed_from_u64(identity_hash(record_id) ^ session_seed);
    rng.random_range(JITTER_MIN_PERCENT..=JITTER_MAX_PERCENT)
}

/// Points for the given store indices, ordered by timestamp. Records
/// without a timestamp are left out.
pub fn layout_subset(records: &[Record], indices: &[usize], axis: &TimeAxis, session_seed: u64) -> Vec<TimelinePoint> {
    let mut points = indices
        .iter()
        .filter_map(|index| records.get(*index).map(|record| (*index, record)))
        .filter_map(|(index, record)| {
            record.creation_timestamp.map(|timestamp| TimelinePoint {
                record_index: index,
                handle: record.handle.clone(),
                timestamp,
                x_percent: axis.x_percent(timestamp),
                y_percent: jitter(&record.id, session_seed),
                is_hovered: false,
                style: point_style(false),
            })
        })
        .collect::<Vec<_>>();
    points.sort_by_key(|point| point.timestamp);
    points
}

pub fn layout(records: &[Record], axis: &TimeAxis, session_seed: u64) -> Vec<TimelinePoint> {
    let indices = (0..records.len()).collect::<Vec<_>>();
    layout_subset(records, &indices, axis, session_seed)
}

pub fn tooltip_placement(x_percent: f64, y_percent: f64) -> TooltipPlacement {
    let (horizontal, mut transform, arrow) = if x_percent < LEFT_EDGE_PERCENT {
        (
            HorizontalAnchor::Left,
            "translateX(-10px)".to_string(),
            ArrowPosition::FromLeft {
                pixels: ARROW_INSET_PIXELS,
            },
        )
    } else if x_percent > RIGHT_EDGE_PERCENT {
        (
            HorizontalAnchor::Right,
            "translateX(calc(-100% + 10px))".to_string(),
            ArrowPosition::FromRight {
                pixels: ARROW_INSET_PIXELS,
            },
        )
    } else {
        (
            HorizontalAnchor::Center,
            "translateX(-50%)".to_string(),
            ArrowPosition::Centered,
        )
    };

    let (vertical, margin_top_pixels) = if y_percent < NEAR_TOP_PERCENT {
        (VerticalAnchor::Below, BELOW_MARGIN_PIXELS)
    } else {
        transform.push_str(" translateY(-100%)");
        (VerticalAnchor::Above, 0)
    };

    TooltipPlacement {
        horizontal,
        vertical,
        left_percent: x_percent,
        top_percent: y_percent,
        transform,
        margin_top_pixels,
        arrow,
    }
}

pub fn point_style(hovered: bool) -> PointStyle {
    if hovered {
        PointStyle {
            radius: 6.0,
            fill: "#60a5fa",
            opacity: 1.0,
        }
    } else {
        PointStyle {
            radius: 3.0,
            fill: "#3b82f6",
            opacity: 0.6,
        }
    }
}

pub fn joined_label(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%b %-d, %Y").to_string()
}
