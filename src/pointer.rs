use std::collections::VecDeque;

use serde::Serialize;

pub const DEFAULT_MAGNETIC_STRENGTH: f64 = 0.3;
pub const CURSOR_TRAIL_LENGTH: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementBounds {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    fn is_measurable(&self) -> bool {
        [self.left, self.top, self.width, self.height]
            .iter()
            .all(|value| value.is_finite())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PointerOffset {
    pub x: f64,
    pub y: f64,
}

impl PointerOffset {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

#[derive(Clone, Debug)]
pub struct PointerTracker {
    strength: f64,
    offset: PointerOffset,
}

impl PointerTracker {
    /// `strength` is clamped into `(0, 1]`; anything unusable falls back to
    /// [`DEFAULT_MAGNETIC_STRENGTH`].
    pub fn new(strength: f64) -> Self {
        let strength = if strength.is_finite() && strength > 0.0 {
            strength.min(1.0)
        } else {
            DEFAULT_MAGNETIC_STRENGTH
        };

        Self {
            strength,
            offset: PointerOffset::ZERO,
        }
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// Switches to a new strength, dropping the current offset. Returns
    /// whether anything changed.
    pub fn retune(&mut self, strength: f64) -> bool {
        let next = Self::new(strength);
        if next.strength == self.strength {
            return false;
        }
        *self = next;
        true
    }

    pub fn offset(&self) -> PointerOffset {
        self.offset
    }

    /// No-op while the element has no measurable bounds.
    pub fn on_pointer_move(
        &mut self,
        bounds: Option<ElementBounds>,
        client_x: f64,
        client_y: f64,
    ) -> PointerOffset {
        let Some(bounds) = bounds.filter(ElementBounds::is_measurable) else {
            return self.offset;
        };
        if !client_x.is_finite() || !client_y.is_finite() {
            return self.offset;
        }

        let (center_x, center_y) = bounds.center();
        self.offset = PointerOffset {
            x: (client_x - center_x) * self.strength,
            y: (client_y - center_y) * self.strength,
        };
        self.offset
    }

    pub fn on_pointer_leave(&mut self) -> PointerOffset {
        self.offset = PointerOffset::ZERO;
        self.offset
    }
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MAGNETIC_STRENGTH)
    }
}

#[derive(Clone, Debug, Default)]
pub struct CursorTrail {
    points: VecDeque<(f64, f64)>,
}

impl CursorTrail {
    pub fn push(&mut self, client_x: f64, client_y: f64) {
        if self.points.len() == CURSOR_TRAIL_LENGTH {
            self.points.pop_front();
        }
        self.points.push_back((client_x, client_y));
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> impl Iterator<Item = &(f64, f64)> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
