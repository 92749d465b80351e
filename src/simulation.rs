//! Virtual lift plant for running without sensor hardware.
//!
//! [`SimulationEngine`] keeps a numeric cab height, moves it one step per
//! tick in the direction the controller is driving, and reports level
//! presence the way the real sensor nodes do: one event per level whenever
//! that level's reading changes.
//!
//! Time is injected. The engine only advances when polled, and never by
//! more than one tick per poll.

use crate::config::SimulationConfig;
use crate::level::{Level, LEVEL_COUNT};
use crate::sensor::LevelPresence;
use crate::traits::{Direction, PresenceFeed};

/// Slack added to the tolerance so accumulated rounding never hides a level.
const TOLERANCE_SLACK_M: f32 = 1e-4;

/// Simulated cab and presence sensors.
///
/// # Example
///
/// ```rust
/// use rs_lift::{Direction, SimulationEngine};
/// use rs_lift::traits::PresenceFeed;
///
/// let mut sim = SimulationEngine::new();
/// // The first poll reports every level.
/// assert_eq!(sim.poll(0).len(), 4);
///
/// sim.set_motion(Some(Direction::Up), 0);
/// sim.poll(100);
/// assert!((sim.position_m() - 0.05).abs() < 1e-3);
/// ```
#[derive(Clone, Debug)]
pub struct SimulationEngine {
    position_m: f32,
    motion: Option<Direction>,
    next_tick_ms: u64,
    tick_ms: u64,
    step_m: f32,
    tolerance_m: f32,
    reported: [Option<bool>; LEVEL_COUNT],
    needs_eval: bool,
}

impl SimulationEngine {
    /// Engine with default settings, starting at ground level.
    pub fn new() -> Self {
        Self::from_config(&SimulationConfig::default())
    }

    /// Engine from configuration.
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            position_m: config.start_level.height_m(),
            motion: None,
            next_tick_ms: 0,
            tick_ms: u64::from(config.tick_ms.max(1)),
            step_m: config.step_m,
            tolerance_m: config.tolerance_m,
            reported: [None; LEVEL_COUNT],
            needs_eval: true,
        }
    }

    /// Current virtual height in metres.
    pub fn position_m(&self) -> f32 {
        self.position_m
    }

    /// Direction the cab is moving, if any.
    pub fn motion(&self) -> Option<Direction> {
        self.motion
    }

    /// Whether `level` reads present at the current height.
    pub fn reads_present(&self, level: Level) -> bool {
        (self.position_m - level.height_m()).abs() <= self.tolerance_m + TOLERANCE_SLACK_M
    }

    fn step(&mut self, direction: Direction) {
        let delta = match direction {
            Direction::Up => self.step_m,
            Direction::Down => -self.step_m,
        };
        self.position_m = (self.position_m + delta)
            .clamp(Level::BOTTOM.height_m(), Level::TOP.height_m());
        tracing::trace!(position_m = self.position_m, "virtual lift moved");
    }

    /// Events for levels whose reading changed since the last report.
    ///
    /// Departures come before arrivals so a tracker sees the cab leave one
    /// level before it reaches the next.
    fn changed_levels(&mut self) -> Vec<LevelPresence> {
        let readings = Level::ALL.map(|level| self.reads_present(level));
        let mut events = Vec::new();
        for present in [false, true] {
            for level in Level::ALL {
                let reading = readings[level.index()];
                if reading == present && self.reported[level.index()] != Some(reading) {
                    self.reported[level.index()] = Some(reading);
                    events.push(LevelPresence::new(level, reading));
                }
            }
        }
        events
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PresenceFeed for SimulationEngine {
    fn set_motion(&mut self, motion: Option<Direction>, now_ms: u64) {
        if motion == self.motion {
            return;
        }
        if self.motion.is_none() {
            self.next_tick_ms = now_ms.saturating_add(self.tick_ms);
        }
        if motion.is_none() {
            self.needs_eval = true;
        }
        tracing::debug!(?motion, position_m = self.position_m, "virtual lift motion changed");
        self.motion = motion;
    }

    fn poll(&mut self, now_ms: u64) -> Vec<LevelPresence> {
        let mut moved = false;
        if let Some(direction) = self.motion {
            if now_ms >= self.next_tick_ms {
                self.step(direction);
                moved = true;
                self.next_tick_ms = self.next_tick_ms.saturating_add(self.tick_ms);
                if self.next_tick_ms <= now_ms {
                    self.next_tick_ms = now_ms.saturating_add(self.tick_ms);
                }
            }
        }
        if !moved && !self.needs_eval {
            return Vec::new();
        }
        self.needs_eval = false;
        self.changed_levels()
    }

    fn is_simulated(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(sim: &mut SimulationEngine, from_ms: u64, to_ms: u64) -> Vec<LevelPresence> {
        let mut events = Vec::new();
        let mut now = from_ms;
        while now <= to_ms {
            events.extend(sim.poll(now));
            now += 20;
        }
        events
    }

    // =========================================================================
    // Presence reporting
    // =========================================================================

    #[test]
    fn first_poll_reports_all_levels() {
        let mut sim = SimulationEngine::new();
        let events = sim.poll(0);
        assert_eq!(events.len(), LEVEL_COUNT);
        assert!(events.contains(&LevelPresence::new(Level::Ground, true)));
        assert!(events.contains(&LevelPresence::new(Level::First, false)));
        assert!(sim.poll(10).is_empty());
    }

    #[test]
    fn start_level_is_configurable() {
        let config = SimulationConfig::default().with_start_level(Level::Basement);
        let mut sim = SimulationEngine::from_config(&config);
        assert_eq!(sim.position_m(), -3.0);
        assert!(sim.poll(0).contains(&LevelPresence::new(Level::Basement, true)));
    }

    #[test]
    fn leaving_a_level_reports_once() {
        let mut sim = SimulationEngine::new();
        sim.poll(0);
        sim.set_motion(Some(Direction::Up), 0);
        let events = drain(&mut sim, 20, 1000);
        assert_eq!(events, vec![LevelPresence::new(Level::Ground, false)]);
    }

    #[test]
    fn travel_reaches_next_level() {
        let mut sim = SimulationEngine::new();
        sim.poll(0);
        sim.set_motion(Some(Direction::Up), 0);
        let events = drain(&mut sim, 20, 6050);
        assert_eq!(
            events,
            vec![
                LevelPresence::new(Level::Ground, false),
                LevelPresence::new(Level::First, true),
            ]
        );
    }

    // =========================================================================
    // Motion
    // =========================================================================

    #[test]
    fn one_step_per_tick() {
        let mut sim = SimulationEngine::new();
        sim.set_motion(Some(Direction::Down), 0);
        sim.poll(50);
        assert_eq!(sim.position_m(), 0.0);
        sim.poll(100);
        assert!((sim.position_m() + 0.05).abs() < 1e-4);
    }

    #[test]
    fn late_poll_advances_only_one_tick() {
        let mut sim = SimulationEngine::new();
        sim.set_motion(Some(Direction::Up), 0);
        sim.poll(1000);
        assert!((sim.position_m() - 0.05).abs() < 1e-4);
        sim.poll(1050);
        assert!((sim.position_m() - 0.05).abs() < 1e-4);
        sim.poll(1100);
        assert!((sim.position_m() - 0.10).abs() < 1e-4);
    }

    #[test]
    fn position_is_clamped_at_top() {
        let config = SimulationConfig::default().with_start_level(Level::Second);
        let mut sim = SimulationEngine::from_config(&config);
        sim.set_motion(Some(Direction::Up), 0);
        drain(&mut sim, 0, 2000);
        assert_eq!(sim.position_m(), 6.0);
    }

    #[test]
    fn stop_freezes_position() {
        let mut sim = SimulationEngine::new();
        sim.set_motion(Some(Direction::Up), 0);
        drain(&mut sim, 0, 500);
        sim.set_motion(None, 500);
        let held = sim.position_m();
        drain(&mut sim, 520, 2000);
        assert_eq!(sim.position_m(), held);
    }

    #[test]
    fn stop_triggers_evaluation() {
        let mut sim = SimulationEngine::new();
        sim.poll(0);
        sim.set_motion(Some(Direction::Up), 0);
        sim.set_motion(None, 10);
        // No change since the first report, so nothing new to say.
        assert!(sim.poll(20).is_empty());
        assert!(!sim.needs_eval);
    }

    #[test]
    fn reports_simulated() {
        assert!(SimulationEngine::new().is_simulated());
    }
}
