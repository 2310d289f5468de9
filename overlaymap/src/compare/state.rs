//! Comparison state machine.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use crate::layer::LayerId;

/// Default swipe divider position, in percent of the canvas width.
pub const DEFAULT_SWIPE_POSITION: f32 = 50.0;

/// Default spyglass radius in pixels.
pub const DEFAULT_SPYGLASS_RADIUS: f32 = 100.0;

/// Default blink period.
pub const DEFAULT_BLINK_INTERVAL: Duration = Duration::from_millis(800);

/// The four comparison presentations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonMode {
    Single,
    Swipe,
    Spyglass,
    Blink,
}

impl ComparisonMode {
    pub const ALL: [ComparisonMode; 4] = [
        ComparisonMode::Single,
        ComparisonMode::Swipe,
        ComparisonMode::Spyglass,
        ComparisonMode::Blink,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ComparisonMode::Single => "single",
            ComparisonMode::Swipe => "swipe",
            ComparisonMode::Spyglass => "spyglass",
            ComparisonMode::Blink => "blink",
        }
    }
}

impl fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ComparisonMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown comparison mode '{}'", s))
    }
}

/// Starting values for mode-specific parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompareDefaults {
    pub swipe_position: f32,
    pub spyglass_radius: f32,
    pub blink_interval: Duration,
}

impl Default for CompareDefaults {
    fn default() -> Self {
        Self {
            swipe_position: DEFAULT_SWIPE_POSITION,
            spyglass_radius: DEFAULT_SPYGLASS_RADIUS,
            blink_interval: DEFAULT_BLINK_INTERVAL,
        }
    }
}

/// Parameters of the active mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModeParams {
    Single,
    Swipe {
        /// Divider position in percent, `0..=100`.
        position: f32,
    },
    Spyglass {
        /// Last pointer position in canvas pixels; `None` until the pointer
        /// has entered the canvas.
        center: Option<(f32, f32)>,
        radius: f32,
    },
    Blink {
        showing_a: bool,
        playing: bool,
        interval: Duration,
    },
}

impl ModeParams {
    pub fn mode(&self) -> ComparisonMode {
        match self {
            ModeParams::Single => ComparisonMode::Single,
            ModeParams::Swipe { .. } => ComparisonMode::Swipe,
            ModeParams::Spyglass { .. } => ComparisonMode::Spyglass,
            ModeParams::Blink { .. } => ComparisonMode::Blink,
        }
    }

    /// Fresh parameters for `mode`.
    pub fn initial(mode: ComparisonMode, defaults: &CompareDefaults) -> Self {
        match mode {
            ComparisonMode::Single => ModeParams::Single,
            ComparisonMode::Swipe => ModeParams::Swipe {
                position: defaults.swipe_position.clamp(0.0, 100.0),
            },
            ComparisonMode::Spyglass => ModeParams::Spyglass {
                center: None,
                radius: defaults.spyglass_radius.max(0.0),
            },
            ComparisonMode::Blink => ModeParams::Blink {
                showing_a: true,
                playing: false,
                interval: defaults.blink_interval,
            },
        }
    }
}

/// Which two layers are compared, how, and with what parameters.
///
/// Every input is an explicit transition; operations that do not apply to
/// the current mode return `false` and change nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonState {
    layer_a: LayerId,
    layer_b: LayerId,
    params: ModeParams,
    defaults: CompareDefaults,
}

impl ComparisonState {
    /// Starts in [`ComparisonMode::Single`] showing `layer_a`.
    pub fn new(layer_a: LayerId, layer_b: LayerId) -> Self {
        Self::with_defaults(layer_a, layer_b, CompareDefaults::default())
    }

    pub fn with_defaults(layer_a: LayerId, layer_b: LayerId, defaults: CompareDefaults) -> Self {
        Self {
            layer_a,
            layer_b,
            params: ModeParams::Single,
            defaults,
        }
    }

    pub fn layer_a(&self) -> LayerId {
        self.layer_a
    }

    pub fn layer_b(&self) -> LayerId {
        self.layer_b
    }

    pub fn mode(&self) -> ComparisonMode {
        self.params.mode()
    }

    pub fn params(&self) -> &ModeParams {
        &self.params
    }

    pub fn defaults(&self) -> &CompareDefaults {
        &self.defaults
    }

    /// Chooses the compared pair. Mode parameters are kept.
    pub fn set_layers(&mut self, layer_a: LayerId, layer_b: LayerId) {
        self.layer_a = layer_a;
        self.layer_b = layer_b;
    }

    /// Exchanges A and B.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.layer_a, &mut self.layer_b);
    }

    /// Switches mode, resetting parameters to their defaults.
    ///
    /// Selecting the current mode again keeps its parameters. Returns true
    /// when the mode changed.
    pub fn set_mode(&mut self, mode: ComparisonMode) -> bool {
        if mode == self.mode() {
            return false;
        }
        debug!(from = %self.mode(), to = %mode, "Comparison mode changed");
        self.params = ModeParams::initial(mode, &self.defaults);
        true
    }

    /// Moves the swipe divider, clamped to `0..=100`.
    pub fn set_swipe_position(&mut self, percent: f32) -> bool {
        match &mut self.params {
            ModeParams::Swipe { position } if !percent.is_nan() => {
                *position = percent.clamp(0.0, 100.0);
                true
            }
            _ => false,
        }
    }

    /// Records the pointer position for the spyglass.
    pub fn pointer_moved(&mut self, x: f32, y: f32) -> bool {
        match &mut self.params {
            ModeParams::Spyglass { center, .. } if x.is_finite() && y.is_finite() => {
                *center = Some((x, y));
                true
            }
            _ => false,
        }
    }

    pub fn set_spyglass_radius(&mut self, pixels: f32) -> bool {
        match &mut self.params {
            ModeParams::Spyglass { radius, .. } if pixels.is_finite() => {
                *radius = pixels.max(0.0);
                true
            }
            _ => false,
        }
    }

    pub fn set_blink_interval(&mut self, period: Duration) -> bool {
        match &mut self.params {
            ModeParams::Blink { interval, .. } => {
                *interval = period;
                true
            }
            _ => false,
        }
    }

    /// Starts blinking. Returns false outside blink mode.
    pub fn play(&mut self) -> bool {
        self.set_playing(true)
    }

    /// Freezes blinking on the current layer.
    pub fn pause(&mut self) -> bool {
        self.set_playing(false)
    }

    fn set_playing(&mut self, value: bool) -> bool {
        match &mut self.params {
            ModeParams::Blink { playing, .. } => {
                *playing = value;
                true
            }
            _ => false,
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.params, ModeParams::Blink { playing: true, .. })
    }

    /// Blink period, when in blink mode.
    pub fn blink_interval(&self) -> Option<Duration> {
        match self.params {
            ModeParams::Blink { interval, .. } => Some(interval),
            _ => None,
        }
    }

    /// Advances the blink by one period. Only toggles while playing.
    pub fn tick(&mut self) -> bool {
        match &mut self.params {
            ModeParams::Blink {
                showing_a,
                playing: true,
                ..
            } => {
                *showing_a = !*showing_a;
                true
            }
            _ => false,
        }
    }

    /// Shows A or B directly, in blink mode.
    pub fn show(&mut self, a: bool) -> bool {
        match &mut self.params {
            ModeParams::Blink { showing_a, .. } => {
                *showing_a = a;
                true
            }
            _ => false,
        }
    }
}
