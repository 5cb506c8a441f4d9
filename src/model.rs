use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub(crate) const DEFAULT_NAME: &str = "Fluffy";

pub(crate) const STAT_MAX: i32 = 100;
pub(crate) const STAT_MIN: i32 = 0;
pub(crate) const WEIGHT_MIN: i32 = 1;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Shape {
    Pentagon,
    Square,
    Triangle,
    Circle,
}

impl Shape {
    pub(crate) const ALL: [Shape; 4] = [
        Shape::Pentagon,
        Shape::Square,
        Shape::Triangle,
        Shape::Circle,
    ];

    /// Shape a pet gets when start-game is given nothing usable.
    pub(crate) const FALLBACK: Shape = Shape::Circle;

    /// Placeholder drawn before any game has started.
    pub(crate) const PLACEHOLDER: Shape = Shape::Pentagon;

    pub(crate) fn parse(s: &str) -> Option<Shape> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pentagon" => Some(Shape::Pentagon),
            "square" => Some(Shape::Square),
            "triangle" => Some(Shape::Triangle),
            "circle" => Some(Shape::Circle),
            _ => None,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Shape::Pentagon => "pentagon",
            Shape::Square => "square",
            Shape::Triangle => "triangle",
            Shape::Circle => "circle",
        }
    }

    pub(crate) fn cycle(self, step: i32) -> Shape {
        let len = Shape::ALL.len() as i32;
        let idx = Shape::ALL.iter().position(|s| *s == self).unwrap_or(0) as i32;
        Shape::ALL[(idx + step).rem_euclid(len) as usize]
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signed change applied to the four numeric stats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct StatDelta {
    pub(crate) happiness: i32,
    pub(crate) weight: i32,
    pub(crate) food: i32,
    pub(crate) stamina: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PetState {
    pub(crate) name: String,
    pub(crate) weight: i32,
    pub(crate) happiness: i32,
    pub(crate) food: i32,
    pub(crate) stamina: i32,
    pub(crate) shape: Shape,
}

impl PetState {
    /// Fresh pet for a new game. Blank names fall back to the default.
    pub(crate) fn new(name: &str, shape: Shape) -> Self {
        let trimmed = name.trim();
        Self {
            name: if trimmed.is_empty() {
                DEFAULT_NAME.to_string()
            } else {
                trimmed.to_string()
            },
            weight: 5,
            happiness: 50,
            food: 60,
            stamina: 100,
            shape,
        }
    }

    pub(crate) fn placeholder() -> Self {
        Self::new(DEFAULT_NAME, Shape::PLACEHOLDER)
    }

    pub(crate) fn apply_delta(&mut self, d: StatDelta) {
        self.happiness = self.happiness.saturating_add(d.happiness);
        self.weight = self.weight.saturating_add(d.weight);
        self.food = self.food.saturating_add(d.food);
        self.stamina = self.stamina.saturating_add(d.stamina);
    }

    /// Bound every stat into its valid range. Idempotent.
    pub(crate) fn clamp(&mut self) {
        self.happiness = self.happiness.clamp(STAT_MIN, STAT_MAX);
        self.food = self.food.clamp(STAT_MIN, STAT_MAX);
        self.stamina = self.stamina.clamp(STAT_MIN, STAT_MAX);
        self.weight = self.weight.max(WEIGHT_MIN);
    }

    pub(crate) fn is_within_bounds(&self) -> bool {
        (STAT_MIN..=STAT_MAX).contains(&self.happiness)
            && (STAT_MIN..=STAT_MAX).contains(&self.food)
            && (STAT_MIN..=STAT_MAX).contains(&self.stamina)
            && self.weight >= WEIGHT_MIN
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SleepState {
    Awake,
    Sleeping { ends_at: DateTime<Utc> },
}

impl SleepState {
    pub(crate) fn is_sleeping(&self) -> bool {
        matches!(self, SleepState::Sleeping { .. })
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Rules {
    pub(crate) decay_period_ms: i64,
    pub(crate) decay: StatDelta,
    /// Generic sleep length; nothing in normal play uses it.
    pub(crate) sleep_default_ms: i64,
    pub(crate) collapse_nap_ms: i64,
    pub(crate) sleep_poll_ms: i64,
    pub(crate) zzz_spawn_ms: i64,
    pub(crate) zzz_lifetime_ms: i64,
    pub(crate) awake_banner_ms: i64,
    pub(crate) wake_stamina_floor: i32,
    pub(crate) cue_revert_ms: i64,
    /// Timer backlog older than this is coalesced instead of replayed.
    pub(crate) max_catch_up_ms: i64,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            decay_period_ms: 5_000,
            decay: StatDelta {
                happiness: -1,
                weight: 0,
                food: -2,
                stamina: -1,
            },
            sleep_default_ms: 60_000,
            collapse_nap_ms: 5_000,
            sleep_poll_ms: 250,
            zzz_spawn_ms: 600,
            zzz_lifetime_ms: 2_000,
            awake_banner_ms: 1_500,
            wake_stamina_floor: 50,
            cue_revert_ms: 200,
            max_catch_up_ms: 60_000,
        }
    }
}

impl Rules {
    pub(crate) fn ms(v: i64) -> Duration {
        Duration::milliseconds(v)
    }
}

/// Floating "Z" shown while asleep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ZzzMarker {
    /// Horizontal offset from centre, in percent of the pet viewport.
    pub(crate) offset_pct: f32,
    pub(crate) born_at: DateTime<Utc>,
    pub(crate) expires_at: DateTime<Utc>,
}

impl ZzzMarker {
    /// 0.0 at spawn, 1.0 at expiry.
    pub(crate) fn progress(&self, now: DateTime<Utc>) -> f32 {
        let total = (self.expires_at - self.born_at).num_milliseconds().max(1) as f32;
        let age = (now - self.born_at).num_milliseconds() as f32;
        (age / total).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    Setup,
    Playing,
}

/// Read-only view handed to the presentation sink.
#[derive(Clone, Debug)]
pub(crate) struct Snapshot {
    pub(crate) pet: PetState,
    pub(crate) phase: Phase,
    pub(crate) status: String,
    pub(crate) sleeping: bool,
    pub(crate) remaining_ms: Option<i64>,
    pub(crate) actions_enabled: bool,
    pub(crate) markers: Vec<ZzzMarker>,
}

#[derive(Clone, Debug)]
pub(crate) struct RNGState {
    pub(crate) seed: u64,
    pub(crate) event_counter: u64,
}

impl RNGState {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            seed,
            event_counter: 0,
        }
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        // Counter-based SplitMix64.
        let mut z = self
            .seed
            .wrapping_add(self.event_counter.wrapping_mul(0x9E3779B97F4A7C15));
        self.event_counter = self.event_counter.wrapping_add(1);

        z = z.wrapping_add(0x9E3779B97F4A7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    /// [0,1)
    pub(crate) fn next_f32(&mut self) -> f32 {
        let v = self.next_u64() >> 40;
        (v as f32) / ((1u64 << 24) as f32)
    }

    pub(crate) fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }
}
