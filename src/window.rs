use crate::models::{ViewWindow, WindowRow};
use crate::timing::Debouncer;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::Duration;

fn finite_non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Rows to materialize for a fixed-row-height list. Cost depends on the
/// viewport and overscan only, never on `total_count`.
pub fn window(
    total_count: usize,
    viewport_height: f64,
    scroll_offset: f64,
    row_height: f64,
    overscan: usize,
) -> ViewWindow {
    if total_count == 0 || !row_height.is_finite() || row_height <= 0.0 {
        return ViewWindow::empty();
    }

    let scroll_offset = finite_non_negative(scroll_offset);
    let viewport_height = finite_non_negative(viewport_height);
    let last_index = total_count - 1;

    let first_visible = (scroll_offset / row_height).floor() as usize;
    let last_visible = ((scroll_offset + viewport_height) / row_height).ceil() as usize;
    let end_index = last_visible.saturating_add(overscan).min(last_index);
    let start_index = first_visible.saturating_sub(overscan).min(end_index);

    let rows = (start_index..=end_index)
        .map(|index| WindowRow {
            index,
            offset_pixels: index as f64 * row_height,
        })
        .collect();

    ViewWindow {
        start_index,
        end_index,
        rows,
        total_extent: total_count as f64 * row_height,
    }
}

/// Recomputes the window after scroll events settle. Each event supersedes
/// the calculation still pending from the previous one; results are
/// published on a watch channel.
#[derive(Debug, Clone)]
pub struct ScrollScheduler {
    row_height: f64,
    overscan: usize,
    delay: Duration,
    debouncer: Debouncer,
    latest: Arc<watch::Sender<ViewWindow>>,
}

impl ScrollScheduler {
    pub fn new(row_height: f64, overscan: usize, delay: Duration, runtime: Handle) -> Self {
        let (sender, _) = watch::channel(ViewWindow::empty());
        Self {
            row_height,
            overscan,
            delay,
            debouncer: Debouncer::new(runtime),
            latest: Arc::new(sender),
        }
    }

    pub fn on_scroll(&self, total_count: usize, viewport_height: f64, scroll_offset: f64) {
        let latest = Arc::clone(&self.latest);
        let row_height = self.row_height;
        let overscan = self.overscan;
        self.debouncer.schedule(self.delay, move || {
            latest.send_replace(window(total_count, viewport_height, scroll_offset, row_height, overscan));
        });
    }

    /// Computes and publishes immediately, dropping any pending calculation.
    pub fn recompute_now(&self, total_count: usize, viewport_height: f64, scroll_offset: f64) -> ViewWindow {
        self.debouncer.cancel();
        let computed = window(total_count, viewport_height, scroll_offset, self.row_height, self.overscan);
        self.latest.send_replace(computed.clone());
        computed
    }

    pub fn current(&self) -> ViewWindow {
        self.latest.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewWindow> {
        self.latest.subscribe()
    }
}
