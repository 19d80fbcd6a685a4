//! Traffic profiles and time-varying traffic patterns
//!
//! A [`TrafficProfile`] is the steady-state description a test case carries:
//! an aggregate request rate plus a read/write split. [`TrafficPattern`]
//! restores the time-varying shapes (flash crowds, ramps, daily cycles) used
//! by scalability-oriented challenges; `traffic_at` evaluates a pattern at a
//! point in time, closed-form.

use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

const DEFAULT_READ_RATIO: f64 = 0.8;

/// Steady-state traffic description from a test case.
///
/// Challenges declare either an aggregate `rps` with an optional `readRatio`,
/// or explicit `readRps`/`writeRps` figures; explicit figures win.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrafficProfile {
    pub rps: f64,
    pub read_ratio: Option<f64>,
    pub read_rps: Option<f64>,
    pub write_rps: Option<f64>,
}

impl TrafficProfile {
    pub fn new(rps: f64, read_ratio: f64) -> Self {
        Self {
            rps: rps.max(0.0),
            read_ratio: Some(read_ratio.clamp(0.0, 1.0)),
            read_rps: None,
            write_rps: None,
        }
    }

    /// All-read traffic at the given rate
    pub fn read_only(rps: f64) -> Self {
        Self::new(rps, 1.0)
    }

    /// All-write traffic at the given rate
    pub fn write_only(rps: f64) -> Self {
        Self::new(rps, 0.0)
    }

    pub fn total_rps(&self) -> f64 {
        match (self.read_rps, self.write_rps) {
            (Some(r), Some(w)) => r + w,
            _ => self.rps.max(0.0),
        }
    }

    pub fn effective_read_ratio(&self) -> f64 {
        let total = self.total_rps();
        if total <= 0.0 {
            return self
                .read_ratio
                .unwrap_or(DEFAULT_READ_RATIO)
                .clamp(0.0, 1.0);
        }
        self.effective_read_rps() / total
    }

    pub fn effective_read_rps(&self) -> f64 {
        match self.read_rps {
            Some(reads) => reads.max(0.0).min(self.total_rps()),
            None => {
                self.total_rps()
                    * self
                        .read_ratio
                        .unwrap_or(DEFAULT_READ_RATIO)
                        .clamp(0.0, 1.0)
            }
        }
    }

    pub fn effective_write_rps(&self) -> f64 {
        match self.write_rps {
            Some(writes) => writes.max(0.0),
            // Whatever the reads leave over; an explicit read-only profile
            // (readRps == rps) therefore carries zero writes.
            None => (self.total_rps() - self.effective_read_rps()).max(0.0),
        }
    }
}

/// Phase label for a point on a traffic pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficPhase {
    Constant,
    PreSpike,
    Spike,
    PostSpike,
    RampUp,
    RampComplete,
    DailyCycle,
}

impl TrafficPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            TrafficPhase::Constant => "constant",
            TrafficPhase::PreSpike => "pre_spike",
            TrafficPhase::Spike => "spike",
            TrafficPhase::PostSpike => "post_spike",
            TrafficPhase::RampUp => "ramp_up",
            TrafficPhase::RampComplete => "ramp_complete",
            TrafficPhase::DailyCycle => "daily_cycle",
        }
    }
}

/// Evaluated traffic at a point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrafficPoint {
    pub rps: f64,
    pub read_rps: f64,
    pub write_rps: f64,
    pub phase: TrafficPhase,
    pub is_spike: bool,
}

/// Time-varying traffic shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrafficPattern {
    Constant {
        base_rps: f64,
    },
    /// Sudden jump from base to peak inside a declared window
    FlashCrowd {
        base_rps: f64,
        peak_rps: f64,
        start_second: f64,
        duration_secs: f64,
    },
    /// Linear climb from base to peak over the ramp duration
    GradualRamp {
        base_rps: f64,
        peak_rps: f64,
        ramp_secs: f64,
    },
    /// Sinusoid between valley and peak over a 24h period
    DailyCycle {
        base_rps: f64,
        peak_rps: f64,
        valley_rps: f64,
    },
}

impl TrafficPattern {
    fn base_rps(&self) -> f64 {
        match *self {
            TrafficPattern::Constant { base_rps }
            | TrafficPattern::FlashCrowd { base_rps, .. }
            | TrafficPattern::GradualRamp { base_rps, .. }
            | TrafficPattern::DailyCycle { base_rps, .. } => base_rps,
        }
    }

    /// Evaluate the pattern honoring [`crate::SimOptions`]: with time-varying
    /// traffic disabled, every pattern degrades to constant base-rate
    /// traffic.
    pub fn evaluate(
        &self,
        t_secs: f64,
        read_ratio: f64,
        options: &crate::SimOptions,
    ) -> TrafficPoint {
        if !options.traffic_patterns {
            let rps = self.base_rps().max(0.0);
            let read_ratio = read_ratio.clamp(0.0, 1.0);
            return TrafficPoint {
                rps,
                read_rps: rps * read_ratio,
                write_rps: rps * (1.0 - read_ratio),
                phase: TrafficPhase::Constant,
                is_spike: false,
            };
        }
        self.traffic_at(t_secs, read_ratio)
    }

    /// Evaluate the pattern at `t` seconds, splitting reads and writes by
    /// `read_ratio`.
    pub fn traffic_at(&self, t_secs: f64, read_ratio: f64) -> TrafficPoint {
        let read_ratio = read_ratio.clamp(0.0, 1.0);
        let (rps, phase, is_spike) = match *self {
            TrafficPattern::Constant { base_rps } => (base_rps, TrafficPhase::Constant, false),
            TrafficPattern::FlashCrowd {
                base_rps,
                peak_rps,
                start_second,
                duration_secs,
            } => {
                if t_secs < start_second {
                    (base_rps, TrafficPhase::PreSpike, false)
                } else if t_secs < start_second + duration_secs {
                    (peak_rps, TrafficPhase::Spike, true)
                } else {
                    (base_rps, TrafficPhase::PostSpike, false)
                }
            }
            TrafficPattern::GradualRamp {
                base_rps,
                peak_rps,
                ramp_secs,
            } => {
                let progress = if ramp_secs > 0.0 {
                    (t_secs / ramp_secs).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                let phase = if progress < 1.0 {
                    TrafficPhase::RampUp
                } else {
                    TrafficPhase::RampComplete
                };
                (base_rps + (peak_rps - base_rps) * progress, phase, false)
            }
            TrafficPattern::DailyCycle {
                base_rps: _,
                peak_rps,
                valley_rps,
            } => {
                const DAY_SECS: f64 = 86_400.0;
                // Trough at midnight, crest mid-afternoon
                let angle = std::f64::consts::TAU * (t_secs / DAY_SECS) - std::f64::consts::FRAC_PI_2;
                let wave = 0.5 + 0.5 * angle.sin();
                (
                    valley_rps + (peak_rps - valley_rps) * wave,
                    TrafficPhase::DailyCycle,
                    false,
                )
            }
        };
        let rps = rps.max(0.0);
        TrafficPoint {
            rps,
            read_rps: rps * read_ratio,
            write_rps: rps * (1.0 - read_ratio),
            phase,
            is_spike,
        }
    }
}

/// A randomly generated traffic spike
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpikeEvent {
    pub at_secs: f64,
    /// Multiplier over baseline traffic
    pub magnitude: f64,
    pub duration_secs: f64,
}

/// Sample spike events across a window.
///
/// `frequency` is the expected number of spikes per second; each spike lasts
/// between 60 and 600 seconds with a magnitude in `1..=max_magnitude`.
pub fn spike_events<R: Rng>(
    duration_secs: f64,
    frequency: f64,
    max_magnitude: f64,
    rng: &mut R,
) -> Vec<SpikeEvent> {
    let expected = (duration_secs * frequency).max(0.0);
    // Round up so a nonzero expectation always produces at least one spike
    let count = expected.ceil() as usize;
    if count == 0 || duration_secs <= 0.0 {
        return Vec::new();
    }
    let time_dist = Uniform::new(0.0, duration_secs);
    let magnitude_dist = Uniform::new_inclusive(1.0, max_magnitude.max(1.0));
    let duration_dist = Uniform::new_inclusive(60.0, 600.0);
    let mut events: Vec<SpikeEvent> = (0..count)
        .map(|_| SpikeEvent {
            at_secs: time_dist.sample(rng),
            magnitude: magnitude_dist.sample(rng),
            duration_secs: duration_dist.sample(rng),
        })
        .collect();
    events.sort_by(|a, b| a.at_secs.total_cmp(&b.at_secs));
    events
}

/// Geographic region served by the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    UsEast,
    UsWest,
    Europe,
    Asia,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::UsEast, Region::UsWest, Region::Europe, Region::Asia];

    fn utc_offset_hours(self) -> f64 {
        match self {
            Region::UsEast => -5.0,
            Region::UsWest => -8.0,
            Region::Europe => 1.0,
            Region::Asia => 8.0,
        }
    }
}

/// Split an aggregate rate across regions, weighted by local time of day.
///
/// Regions in their local daytime carry more of the traffic; the split always
/// sums back to the input rate.
pub fn geo_distribution(total_rps: f64, t_secs: f64) -> Vec<(Region, f64)> {
    let utc_hour = (t_secs / 3600.0) % 24.0;
    let weights: Vec<f64> = Region::ALL
        .iter()
        .map(|r| {
            let local = (utc_hour + r.utc_offset_hours()).rem_euclid(24.0);
            // Diurnal weight: quiet overnight, busy mid-afternoon
            let angle = std::f64::consts::TAU * (local / 24.0) - std::f64::consts::FRAC_PI_2;
            0.25 + 0.75 * (0.5 + 0.5 * angle.sin())
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    Region::ALL
        .iter()
        .zip(weights)
        .map(|(r, w)| (*r, total_rps * w / sum))
        .collect()
}
