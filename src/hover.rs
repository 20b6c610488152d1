use crate::timing::Debouncer;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::Duration;

/// Tracks the single timeline point whose tooltip is showing.
///
/// Leaving a point does not hide its tooltip right away: a short grace
/// period lets the pointer travel from the point into the tooltip. Entering
/// the tooltip (or any point) cancels the pending dismissal.
#[derive(Debug, Clone)]
pub struct HoverController {
    hovered: Arc<watch::Sender<Option<usize>>>,
    dismissal: Debouncer,
    grace: Duration,
}

impl HoverController {
    pub fn new(grace: Duration, runtime: Handle) -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            hovered: Arc::new(sender),
            dismissal: Debouncer::new(runtime),
            grace,
        }
    }

    pub fn enter_point(&self, record_index: usize) {
        self.dismissal.cancel();
        self.hovered.send_replace(Some(record_index));
    }

    pub fn leave_point(&self) {
        let hovered = Arc::clone(&self.hovered);
        self.dismissal.schedule(self.grace, move || {
            hovered.send_replace(None);
        });
    }

    pub fn enter_tooltip(&self) {
        self.dismissal.cancel();
    }

    pub fn leave_tooltip(&self) {
        self.dismissal.cancel();
        self.hovered.send_replace(None);
    }

    pub fn hovered(&self) -> Option<usize> {
        *self.hovered.borrow()
    }

    pub fn is_dismissal_pending(&self) -> bool {
        self.dismissal.is_pending()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<usize>> {
        self.hovered.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::HoverController;
    use tokio::runtime::Handle;
    use tokio::time::Duration;

    fn controller() -> HoverController {
        HoverController::new(Duration::from_millis(100), Handle::current())
    }

    #[tokio::test(start_paused = true)]
    async fn leaving_a_point_dismisses_after_grace() {
        let hover = controller();
        hover.enter_point(3);
        hover.leave_point();
        assert!(hover.is_dismissal_pending());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(hover.hovered(), Some(3));

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(hover.hovered(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn entering_the_tooltip_keeps_it_open() {
        let hover = controller();
        hover.enter_point(7);
        hover.leave_point();
        tokio::time::sleep(Duration::from_millis(40)).await;
        hover.enter_tooltip();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(hover.hovered(), Some(7));

        hover.leave_tooltip();
        assert_eq!(hover.hovered(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn last_hovered_point_wins() {
        let hover = controller();
        hover.enter_point(1);
        hover.leave_point();
        hover.enter_point(2);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(hover.hovered(), Some(2));
    }
}
