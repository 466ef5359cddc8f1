use crate::viewport::ViewportState;

/// The site's standard easing curve.
pub const HOUSE_CURVE: [f32; 4] = [0.25, 0.46, 0.45, 0.94];

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Easing {
    Linear,
    EaseOut,
    CubicBezier([f32; 4]),
}

impl Easing {
    pub fn to_css(self) -> String {
        match self {
            Self::Linear => "linear".to_string(),
            Self::EaseOut => "ease-out".to_string(),
            Self::CubicBezier([x1, y1, x2, y2]) => {
                format!("cubic-bezier({x1}, {y1}, {x2}, {y2})")
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub duration_secs: f32,
    pub easing: Easing,
    pub delay_secs: f32,
}

impl Transition {
    pub const FAST: Self = Self::new(0.2, Easing::EaseOut);
    pub const NORMAL: Self = Self::new(0.3, Easing::CubicBezier(HOUSE_CURVE));
    pub const SLOW: Self = Self::new(0.6, Easing::CubicBezier(HOUSE_CURVE));
    pub const VERY_SLOW: Self = Self::new(1.0, Easing::CubicBezier(HOUSE_CURVE));
    /// Scroll reveal of content blocks.
    pub const REVEAL: Self = Self::new(0.8, Easing::CubicBezier(HOUSE_CURVE));
    /// Magnetic elements springing back after the pointer leaves.
    pub const MAGNETIC_RETURN: Self = Self::new(0.3, Easing::EaseOut);

    pub const fn new(duration_secs: f32, easing: Easing) -> Self {
        Self {
            duration_secs,
            easing,
            delay_secs: 0.0,
        }
    }

    pub fn with_delay(mut self, delay_secs: f32) -> Self {
        self.delay_secs = delay_secs;
        self
    }

    /// Halves the duration and drops to a linear tween when the viewport
    /// asks for simpler motion.
    pub fn optimized(self, viewport: &ViewportState) -> Self {
        if !viewport.prefers_simplified_motion() {
            return self;
        }

        Self {
            duration_secs: self.duration_secs * 0.5,
            easing: Easing::Linear,
            delay_secs: self.delay_secs,
        }
    }

    pub fn to_css(self, property: &str) -> String {
        let mut css = format!("{property} {}s {}", self.duration_secs, self.easing.to_css());
        if self.delay_secs > 0.0 {
            css.push_str(&format!(" {}s", self.delay_secs));
        }
        css
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectFlags {
    pub magnetic: bool,
    pub magnetic_strength: f64,
    pub shimmer: bool,
    pub glow: bool,
}

impl Default for EffectFlags {
    fn default() -> Self {
        Self {
            magnetic: false,
            magnetic_strength: crate::pointer::DEFAULT_MAGNETIC_STRENGTH,
            shimmer: false,
            glow: false,
        }
    }
}

impl EffectFlags {
    pub fn magnetic(strength: f64) -> Self {
        Self {
            magnetic: true,
            magnetic_strength: strength,
            ..Self::default()
        }
    }

    pub fn with_shimmer(mut self) -> Self {
        self.shimmer = true;
        self
    }

    pub fn with_glow(mut self) -> Self {
        self.glow = true;
        self
    }

    pub fn resolve(&self, viewport: &ViewportState) -> EffectPlan {
        let animated = !viewport.reduced_motion;
        EffectPlan {
            magnetic_strength: (self.magnetic && animated && !viewport.is_mobile)
                .then_some(self.magnetic_strength),
            shimmer: self.shimmer && animated,
            glow: self.glow && animated,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EffectPlan {
    pub magnetic_strength: Option<f64>,
    pub shimmer: bool,
    pub glow: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desktop() -> ViewportState {
        ViewportState::from_width(Some(1440.0), false)
    }

    #[test]
    fn preset_table_renders_css() {
        assert_eq!(Transition::FAST.to_css("opacity"), "opacity 0.2s ease-out");
        assert_eq!(
            Transition::NORMAL.with_delay(0.1).to_css("transform"),
            "transform 0.3s cubic-bezier(0.25, 0.46, 0.45, 0.94) 0.1s"
        );
    }

    #[test]
    fn optimized_transition_halves_on_simplified_viewports() {
        let reduced = ViewportState::from_width(Some(1440.0), true);
        let optimized = Transition::SLOW.optimized(&reduced);
        assert_eq!(optimized.duration_secs, 0.3);
        assert_eq!(optimized.easing, Easing::Linear);

        let mobile = ViewportState::from_width(Some(375.0), false);
        assert_eq!(Transition::VERY_SLOW.optimized(&mobile).duration_secs, 0.5);

        assert_eq!(Transition::SLOW.optimized(&desktop()), Transition::SLOW);
    }

    #[test]
    fn magnetic_effect_only_on_desktop_with_motion() {
        let flags = EffectFlags::magnetic(0.05).with_glow();

        assert_eq!(flags.resolve(&desktop()).magnetic_strength, Some(0.05));
        assert_eq!(
            flags
                .resolve(&ViewportState::from_width(Some(900.0), false))
                .magnetic_strength,
            Some(0.05)
        );
        assert_eq!(
            flags
                .resolve(&ViewportState::from_width(Some(375.0), false))
                .magnetic_strength,
            None
        );

        let reduced = flags.resolve(&ViewportState::from_width(Some(1440.0), true));
        assert_eq!(reduced, EffectPlan::default());
    }

    #[test]
    fn plain_flags_resolve_to_nothing() {
        assert_eq!(EffectFlags::default().resolve(&desktop()), EffectPlan::default());
        assert!(EffectFlags::default().with_shimmer().resolve(&desktop()).shimmer);
    }
}
