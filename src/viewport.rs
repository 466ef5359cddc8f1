use serde::Serialize;

pub const MOBILE_MAX_WIDTH: f64 = 768.0;
pub const TABLET_MAX_WIDTH: f64 = 1024.0;
pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Mobile,
    Tablet,
    Desktop,
}

impl Breakpoint {
    /// Unknown or non-finite widths resolve to desktop, the layout shown
    /// before the first measurement.
    pub fn from_width(width: Option<f64>) -> Self {
        match width.filter(|value| value.is_finite()) {
            Some(value) if value < MOBILE_MAX_WIDTH => Self::Mobile,
            Some(value) if value < TABLET_MAX_WIDTH => Self::Tablet,
            _ => Self::Desktop,
        }
    }

    pub fn profile(self) -> ResponsiveProfile {
        match self {
            Self::Mobile => ResponsiveProfile {
                reduced_motion: true,
                stagger_children_secs: 0.05,
                duration_multiplier: 0.7,
                scale_multiplier: 0.8,
            },
            Self::Tablet => ResponsiveProfile {
                reduced_motion: false,
                stagger_children_secs: 0.08,
                duration_multiplier: 0.85,
                scale_multiplier: 0.9,
            },
            Self::Desktop => ResponsiveProfile {
                reduced_motion: false,
                stagger_children_secs: 0.1,
                duration_multiplier: 1.0,
                scale_multiplier: 1.0,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResponsiveProfile {
    pub reduced_motion: bool,
    pub stagger_children_secs: f32,
    pub duration_multiplier: f32,
    pub scale_multiplier: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportState {
    pub is_mobile: bool,
    pub is_tablet: bool,
    pub reduced_motion: bool,
}

impl ViewportState {
    pub fn from_width(width: Option<f64>, reduced_motion: bool) -> Self {
        let breakpoint = Breakpoint::from_width(width);
        Self {
            is_mobile: breakpoint == Breakpoint::Mobile,
            is_tablet: breakpoint == Breakpoint::Tablet,
            reduced_motion,
        }
    }

    pub fn breakpoint(&self) -> Breakpoint {
        if self.is_mobile {
            Breakpoint::Mobile
        } else if self.is_tablet {
            Breakpoint::Tablet
        } else {
            Breakpoint::Desktop
        }
    }

    /// True when effects should be simplified: reduced motion or a mobile
    /// viewport.
    pub fn prefers_simplified_motion(&self) -> bool {
        self.reduced_motion || self.is_mobile
    }
}

#[derive(Clone, Debug)]
pub struct ViewportSensor {
    state: ViewportState,
}

impl ViewportSensor {
    pub fn new(width: Option<f64>, reduced_motion: bool) -> Self {
        Self {
            state: ViewportState::from_width(width, reduced_motion),
        }
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    /// Recomputes the breakpoint flags. Returns whether anything changed so
    /// bursts of resize events within one breakpoint can be coalesced.
    pub fn on_resize(&mut self, width: f64) -> bool {
        let next = ViewportState::from_width(Some(width), self.state.reduced_motion);
        let changed = next != self.state;
        self.state = next;
        changed
    }

    pub fn set_reduced_motion(&mut self, reduced_motion: bool) -> bool {
        let changed = self.state.reduced_motion != reduced_motion;
        self.state.reduced_motion = reduced_motion;
        changed
    }
}

impl Default for ViewportSensor {
    fn default() -> Self {
        Self::new(None, false)
    }
}
