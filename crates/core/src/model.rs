use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ParseDirectionError};

/// Upper clamp on any green phase, in seconds.
pub const MAX_GREEN_TIME: u32 = 60;
/// Lower clamp on any green phase, in seconds.
pub const MIN_GREEN_TIME: u32 = 15;
/// Seconds of green granted per counted vehicle.
pub const SECS_PER_VEHICLE: u32 = 2;
/// Direction served when nothing has been green yet and there is no demand.
pub const DEFAULT_DIRECTION: Direction = Direction::North;

/// Approach to the intersection.
///
/// Declaration order is significant: it is the tie-break order when several
/// approaches share the highest count, and the iteration order of every
/// per-direction map in this crate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All approaches, in declaration order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Lower-case name, also the JSON key.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }

    /// Successor in the idle rotation north -> east -> south -> west -> north.
    pub fn next_in_rotation(self) -> Direction {
        const ROTATION: [(Direction, Direction); 4] = [
            (Direction::North, Direction::East),
            (Direction::East, Direction::South),
            (Direction::South, Direction::West),
            (Direction::West, Direction::North),
        ];
        ROTATION
            .iter()
            .find(|(from, _)| *from == self)
            .map(|(_, to)| *to)
            .unwrap_or(DEFAULT_DIRECTION)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Direction::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ParseDirectionError(s.to_string()))
    }
}

fn complete(mut map: BTreeMap<Direction, u32>) -> BTreeMap<Direction, u32> {
    for d in Direction::ALL {
        map.entry(d).or_insert(0);
    }
    map
}

/// Latest vehicle count per approach. Always holds all four approaches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Direction, u32>", into = "BTreeMap<Direction, u32>")]
pub struct CountSnapshot {
    counts: BTreeMap<Direction, u32>,
}

impl Default for CountSnapshot {
    fn default() -> Self {
        Self {
            counts: complete(BTreeMap::new()),
        }
    }
}

impl From<BTreeMap<Direction, u32>> for CountSnapshot {
    fn from(counts: BTreeMap<Direction, u32>) -> Self {
        Self {
            counts: complete(counts),
        }
    }
}

impl From<CountSnapshot> for BTreeMap<Direction, u32> {
    fn from(value: CountSnapshot) -> Self {
        value.counts
    }
}

impl CountSnapshot {
    /// Builds a snapshot from explicit counts in declaration order
    /// (north, south, east, west).
    pub fn from_counts(counts: [u32; 4]) -> Self {
        Self {
            counts: Direction::ALL.into_iter().zip(counts).collect(),
        }
    }

    pub fn get(&self, direction: Direction) -> u32 {
        self.counts.get(&direction).copied().unwrap_or(0)
    }

    pub fn set(&mut self, direction: Direction, count: u32) {
        self.counts.insert(direction, count);
    }

    /// Counts in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, u32)> + '_ {
        self.counts.iter().map(|(d, c)| (*d, *c))
    }

    pub fn total(&self) -> u64 {
        self.counts.values().map(|c| u64::from(*c)).sum()
    }
}

/// Green duration per approach produced by one scheduling decision.
///
/// At most one approach carries a non-zero duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Direction, u32>", into = "BTreeMap<Direction, u32>")]
pub struct SignalPlan {
    durations: BTreeMap<Direction, u32>,
}

impl From<BTreeMap<Direction, u32>> for SignalPlan {
    fn from(durations: BTreeMap<Direction, u32>) -> Self {
        Self {
            durations: complete(durations),
        }
    }
}

impl From<SignalPlan> for BTreeMap<Direction, u32> {
    fn from(value: SignalPlan) -> Self {
        value.durations
    }
}

impl SignalPlan {
    /// Plan granting `secs` of green to `green` and zero to everyone else.
    pub fn single(green: Direction, secs: u32) -> Self {
        Self {
            durations: Direction::ALL
                .into_iter()
                .map(|d| (d, if d == green { secs } else { 0 }))
                .collect(),
        }
    }

    pub fn duration(&self, direction: Direction) -> u32 {
        self.durations.get(&direction).copied().unwrap_or(0)
    }

    /// The approach holding green and its duration, if any.
    pub fn green(&self) -> Option<(Direction, u32)> {
        self.iter().find(|(_, secs)| *secs > 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Direction, u32)> + '_ {
        self.durations.iter().map(|(d, s)| (*d, *s))
    }
}

/// How a vehicle count turns into a green duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreenTiming {
    /// Lower clamp, seconds.
    #[serde(default = "default_min_green_secs")]
    pub min_green_secs: u32,
    /// Upper clamp, seconds.
    #[serde(default = "default_max_green_secs")]
    pub max_green_secs: u32,
    /// Seconds granted per counted vehicle.
    #[serde(default = "default_secs_per_vehicle")]
    pub secs_per_vehicle: u32,
}

fn default_min_green_secs() -> u32 {
    MIN_GREEN_TIME
}

fn default_max_green_secs() -> u32 {
    MAX_GREEN_TIME
}

fn default_secs_per_vehicle() -> u32 {
    SECS_PER_VEHICLE
}

impl Default for GreenTiming {
    fn default() -> Self {
        Self {
            min_green_secs: MIN_GREEN_TIME,
            max_green_secs: MAX_GREEN_TIME,
            secs_per_vehicle: SECS_PER_VEHICLE,
        }
    }
}

impl GreenTiming {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secs_per_vehicle == 0 {
            return Err(ConfigError::ZeroScale);
        }
        // Plans identify the green approach by its non-zero duration.
        if self.min_green_secs == 0 {
            return Err(ConfigError::ZeroMinGreen);
        }
        if self.min_green_secs > self.max_green_secs {
            return Err(ConfigError::MinExceedsMax {
                min: self.min_green_secs,
                max: self.max_green_secs,
            });
        }
        Ok(())
    }

    /// `min(max, max(min, count * secs_per_vehicle))`.
    pub fn duration_for(&self, count: u32) -> u32 {
        count
            .saturating_mul(self.secs_per_vehicle)
            .max(self.min_green_secs)
            .min(self.max_green_secs)
    }
}

/// Read-only view of the scheduler state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStatus {
    pub counts: CountSnapshot,
    pub last_green: Option<Direction>,
    #[serde(default)]
    pub timing: GreenTiming,
}
