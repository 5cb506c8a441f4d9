use crate::clock::Timer;
use crate::model::{PetState, Rules, StatDelta};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Periodic stat drain while the pet is awake.
pub(crate) struct DecayScheduler {
    timer: Timer,
    delta: StatDelta,
}

impl DecayScheduler {
    pub(crate) fn new(rules: &Rules) -> Self {
        Self {
            timer: Timer::interval(Rules::ms(rules.decay_period_ms)),
            delta: rules.decay,
        }
    }

    /// Stops any running loop before arming a fresh one, so there is never
    /// more than one decay loop per game.
    pub(crate) fn restart(&mut self, now: DateTime<Utc>) {
        self.timer.stop();
        self.timer.start(now);
    }

    pub(crate) fn stop(&mut self) {
        self.timer.stop();
    }

    pub(crate) fn next_due(&self) -> Option<DateTime<Utc>> {
        self.timer.due()
    }

    pub(crate) fn skip_missed(&mut self, now: DateTime<Utc>) -> i64 {
        self.timer.skip_missed(now)
    }

    /// Consumes one tick. Applies the drain only when awake; ticks that land
    /// during sleep are dropped, not deferred. Returns whether the pet changed.
    pub(crate) fn on_tick(&mut self, pet: &mut PetState, sleeping: bool) -> bool {
        if self.timer.fire().is_none() {
            return false;
        }
        if sleeping {
            debug!("decay tick skipped while asleep");
            return false;
        }
        pet.apply_delta(self.delta);
        debug!(
            food = pet.food,
            stamina = pet.stamina,
            happiness = pet.happiness,
            "decay tick"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Shape;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn tick_applies_fixed_drain() {
        let mut decay = DecayScheduler::new(&Rules::default());
        let mut pet = PetState::new("Rex", Shape::Square);
        decay.restart(t0());
        assert!(decay.on_tick(&mut pet, false));
        assert_eq!(pet.food, 58);
        assert_eq!(pet.stamina, 99);
        assert_eq!(pet.happiness, 49);
        assert_eq!(pet.weight, 5);
    }

    #[test]
    fn tick_while_sleeping_changes_nothing() {
        let mut decay = DecayScheduler::new(&Rules::default());
        let mut pet = PetState::new("Rex", Shape::Square);
        let before = pet.clone();
        decay.restart(t0());
        for _ in 0..10 {
            assert!(!decay.on_tick(&mut pet, true));
        }
        assert_eq!(pet, before);
        // the loop keeps running through sleep
        assert_eq!(decay.next_due(), Some(t0() + Duration::seconds(55)));
    }

    #[test]
    fn restart_replaces_the_previous_deadline() {
        let mut decay = DecayScheduler::new(&Rules::default());
        decay.restart(t0());
        decay.restart(t0() + Duration::seconds(3));
        assert_eq!(decay.next_due(), Some(t0() + Duration::seconds(8)));
    }

    #[test]
    fn stopped_scheduler_does_not_tick() {
        let mut decay = DecayScheduler::new(&Rules::default());
        let mut pet = PetState::new("Rex", Shape::Square);
        decay.restart(t0());
        decay.stop();
        assert_eq!(decay.next_due(), None);
        assert!(!decay.on_tick(&mut pet, false));
        assert_eq!(pet.food, 60);
    }
}
