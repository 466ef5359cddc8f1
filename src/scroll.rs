use serde::Serialize;

use crate::pointer::ElementBounds;

pub const DEFAULT_REVEAL_MARGIN_PX: f64 = -100.0;
pub const DEFAULT_REVEAL_AMOUNT: f64 = 0.1;
pub const DEFAULT_PARALLAX_RATE: f64 = -0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityOptions {
    /// Latch on first reveal instead of tracking intersection.
    pub once: bool,
    /// Grows (positive) or shrinks (negative) the viewport's top and bottom
    /// edges before testing intersection.
    pub margin_px: f64,
    /// Fraction of the element's area that must be inside the viewport.
    pub amount: f64,
}

impl Default for VisibilityOptions {
    fn default() -> Self {
        Self {
            once: true,
            margin_px: DEFAULT_REVEAL_MARGIN_PX,
            amount: DEFAULT_REVEAL_AMOUNT,
        }
    }
}

impl VisibilityOptions {
    /// Options for section-active tracking: no latch, no margin.
    pub fn tracking(amount: f64) -> Self {
        Self {
            once: false,
            margin_px: 0.0,
            amount,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    pub is_intersecting: bool,
    pub ratio: f64,
}

impl Intersection {
    const NONE: Self = Self {
        is_intersecting: false,
        ratio: 0.0,
    };
}

pub fn intersection(
    element: &ElementBounds,
    viewport_width: f64,
    viewport_height: f64,
    margin_px: f64,
) -> Intersection {
    let margin = if margin_px.is_finite() { margin_px } else { 0.0 };
    let root_top = -margin;
    let root_bottom = viewport_height + margin;

    let overlap_width = element.right().min(viewport_width) - element.left.max(0.0);
    let overlap_height = element.bottom().min(root_bottom) - element.top.max(root_top);

    let overlaps = overlap_width >= 0.0 && overlap_height >= 0.0;
    if !overlaps {
        return Intersection::NONE;
    }

    let area = element.width * element.height;
    let ratio = if area > 0.0 {
        (overlap_width * overlap_height / area).clamp(0.0, 1.0)
    } else {
        1.0
    };

    Intersection {
        is_intersecting: true,
        ratio,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum RevealLatch {
    #[default]
    Unseen,
    Seen,
}

#[derive(Clone, Debug)]
pub struct VisibilityObserver {
    options: VisibilityOptions,
    latch: RevealLatch,
    visible: bool,
}

impl VisibilityObserver {
    pub fn new(options: VisibilityOptions) -> Self {
        Self {
            options,
            latch: RevealLatch::Unseen,
            visible: false,
        }
    }

    pub fn latch(&self) -> RevealLatch {
        self.latch
    }

    pub fn observe(
        &mut self,
        element: &ElementBounds,
        viewport_width: f64,
        viewport_height: f64,
    ) -> bool {
        if self.options.once && self.latch == RevealLatch::Seen {
            return true;
        }

        let hit = intersection(element, viewport_width, viewport_height, self.options.margin_px);
        let meets_threshold = hit.is_intersecting && hit.ratio >= self.options.amount;

        if self.options.once {
            if meets_threshold {
                self.latch = RevealLatch::Seen;
                self.visible = true;
            }
        } else {
            self.visible = meets_threshold;
        }

        self.visible
    }
}

impl Default for VisibilityObserver {
    fn default() -> Self {
        Self::new(VisibilityOptions::default())
    }
}

/// `scroll_y / (scroll_height - viewport_height)`, clamped to `[0, 1]`.
/// Pages that cannot scroll report 0.
pub fn scroll_progress(scroll_y: f64, scroll_height: f64, viewport_height: f64) -> f64 {
    let scrollable = scroll_height - viewport_height;
    let can_scroll = scrollable.is_finite() && scrollable > 0.0;
    if !can_scroll || !scroll_y.is_finite() {
        return 0.0;
    }

    (scroll_y / scrollable).clamp(0.0, 1.0)
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollProgressTracker {
    fraction: f64,
}

impl ScrollProgressTracker {
    pub fn on_scroll(&mut self, scroll_y: f64, scroll_height: f64, viewport_height: f64) -> f64 {
        self.fraction = scroll_progress(scroll_y, scroll_height, viewport_height);
        self.fraction
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    pub fn percentage(&self) -> u8 {
        (self.fraction * 100.0).round() as u8
    }
}

pub fn parallax_offset(scroll_y: f64, rate: f64) -> f64 {
    if !scroll_y.is_finite() || !rate.is_finite() {
        return 0.0;
    }
    scroll_y * rate
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionBounds {
    pub offset_top: f64,
    pub height: f64,
}

/// Index of the section containing the viewport's vertical midline.
pub fn active_section(
    scroll_y: f64,
    viewport_height: f64,
    sections: &[SectionBounds],
) -> Option<usize> {
    let midline = scroll_y + viewport_height / 2.0;
    sections.iter().rposition(|section| {
        midline >= section.offset_top && midline < section.offset_top + section.height
    })
}

/// Remembers the last active section so gaps between sections keep the
/// previous highlight.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActiveSectionTracker {
    active: usize,
}

impl ActiveSectionTracker {
    pub fn active(&self) -> usize {
        self.active
    }

    pub fn on_scroll(
        &mut self,
        scroll_y: f64,
        viewport_height: f64,
        sections: &[SectionBounds],
    ) -> usize {
        if let Some(index) = active_section(scroll_y, viewport_height, sections) {
            self.active = index;
        }
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT_WIDTH: f64 = 1280.0;
    const VIEWPORT_HEIGHT: f64 = 800.0;

    fn card_at(top: f64) -> ElementBounds {
        ElementBounds::new(100.0, top, 400.0, 300.0)
    }

    #[test]
    fn progress_stays_in_unit_range() {
        for scroll_y in [-500.0, 0.0, 10.0, 1_200.0, 2_200.0, 9_999.0, f64::NAN] {
            let fraction = scroll_progress(scroll_y, 3_000.0, VIEWPORT_HEIGHT);
            assert!((0.0..=1.0).contains(&fraction), "{scroll_y} -> {fraction}");
        }
        assert_eq!(scroll_progress(1_100.0, 3_000.0, VIEWPORT_HEIGHT), 0.5);
    }

    #[test]
    fn short_page_reports_zero_progress() {
        assert_eq!(scroll_progress(0.0, VIEWPORT_HEIGHT, VIEWPORT_HEIGHT), 0.0);
        assert_eq!(scroll_progress(40.0, VIEWPORT_HEIGHT, VIEWPORT_HEIGHT), 0.0);
        assert_eq!(scroll_progress(40.0, 600.0, VIEWPORT_HEIGHT), 0.0);
    }

    #[test]
    fn progress_reads_position_in_both_directions() {
        let mut tracker = ScrollProgressTracker::default();
        tracker.on_scroll(1_650.0, 3_000.0, VIEWPORT_HEIGHT);
        assert_eq!(tracker.percentage(), 75);

        tracker.on_scroll(220.0, 3_000.0, VIEWPORT_HEIGHT);
        assert_eq!(tracker.percentage(), 10);
        assert_eq!(tracker.fraction(), 0.1);
    }

    #[test]
    fn once_observer_latches_after_first_reveal() {
        let mut observer = VisibilityObserver::default();

        assert!(!observer.observe(&card_at(1_500.0), VIEWPORT_WIDTH, VIEWPORT_HEIGHT));
        assert_eq!(observer.latch(), RevealLatch::Unseen);

        assert!(observer.observe(&card_at(400.0), VIEWPORT_WIDTH, VIEWPORT_HEIGHT));
        assert_eq!(observer.latch(), RevealLatch::Seen);

        for top in [-2_000.0, 5_000.0, 400.0, -900.0] {
            assert!(observer.observe(&card_at(top), VIEWPORT_WIDTH, VIEWPORT_HEIGHT));
        }
        assert_eq!(observer.latch(), RevealLatch::Seen);
    }

    #[test]
    fn tracking_observer_toggles_with_intersection() {
        let mut observer = VisibilityObserver::new(VisibilityOptions::tracking(0.3));

        assert!(observer.observe(&card_at(100.0), VIEWPORT_WIDTH, VIEWPORT_HEIGHT));
        assert!(!observer.observe(&card_at(2_000.0), VIEWPORT_WIDTH, VIEWPORT_HEIGHT));
        assert!(observer.observe(&card_at(300.0), VIEWPORT_WIDTH, VIEWPORT_HEIGHT));
    }

    #[test]
    fn negative_margin_delays_reveal() {
        // 50px of the card peeks above the bottom edge: inside the raw
        // viewport, but swallowed by the -100px margin.
        let peeking = card_at(VIEWPORT_HEIGHT - 50.0);

        let raw = intersection(&peeking, VIEWPORT_WIDTH, VIEWPORT_HEIGHT, 0.0);
        assert!(raw.is_intersecting);

        let mut observer = VisibilityObserver::default();
        assert!(!observer.observe(&peeking, VIEWPORT_WIDTH, VIEWPORT_HEIGHT));
    }

    #[test]
    fn amount_threshold_is_an_area_fraction() {
        let half_visible = card_at(VIEWPORT_HEIGHT - 150.0);
        let hit = intersection(&half_visible, VIEWPORT_WIDTH, VIEWPORT_HEIGHT, 0.0);
        assert_eq!(hit.ratio, 0.5);

        let mut strict = VisibilityObserver::new(VisibilityOptions::tracking(0.6));
        assert!(!strict.observe(&half_visible, VIEWPORT_WIDTH, VIEWPORT_HEIGHT));
    }

    #[test]
    fn parallax_moves_against_scroll() {
        assert_eq!(parallax_offset(300.0, DEFAULT_PARALLAX_RATE), -150.0);
        assert_eq!(parallax_offset(f64::NAN, DEFAULT_PARALLAX_RATE), 0.0);
    }

    #[test]
    fn active_section_follows_viewport_midline() {
        let sections = [
            SectionBounds { offset_top: 0.0, height: 900.0 },
            SectionBounds { offset_top: 900.0, height: 700.0 },
            SectionBounds { offset_top: 1_800.0, height: 1_000.0 },
        ];
        let mut tracker = ActiveSectionTracker::default();

        assert_eq!(tracker.on_scroll(0.0, VIEWPORT_HEIGHT, &sections), 0);
        assert_eq!(tracker.on_scroll(700.0, VIEWPORT_HEIGHT, &sections), 1);
        // Midline at 1_700 falls in the gap: keep the previous section.
        assert_eq!(tracker.on_scroll(1_300.0, VIEWPORT_HEIGHT, &sections), 1);
        assert_eq!(active_section(1_300.0, VIEWPORT_HEIGHT, &sections), None);
        assert_eq!(tracker.on_scroll(1_500.0, VIEWPORT_HEIGHT, &sections), 2);
    }
}
