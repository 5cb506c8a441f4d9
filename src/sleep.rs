use crate::clock::Timer;
use crate::model::{PetState, RNGState, Rules, SleepState, ZzzMarker};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

/// Timer-driven work owned by the sleep controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum SleepEvent {
    Poll,
    SpawnZzz,
    ExpireZzz,
    BannerDone,
}

/// Awake/Sleeping state machine plus the cues that belong to it: the zzz
/// generator, the status poll, and the short "Awake!" banner after waking.
pub(crate) struct SleepController {
    state: SleepState,
    poll: Timer,
    zzz: Timer,
    banner: Timer,
    markers: Vec<ZzzMarker>,
    rng: RNGState,
    default_duration: Duration,
    zzz_lifetime: Duration,
    wake_floor: i32,
}

impl SleepController {
    pub(crate) fn new(rules: &Rules, seed: u64) -> Self {
        Self {
            state: SleepState::Awake,
            poll: Timer::interval(Rules::ms(rules.sleep_poll_ms)),
            zzz: Timer::interval(Rules::ms(rules.zzz_spawn_ms)),
            banner: Timer::timeout(Rules::ms(rules.awake_banner_ms)),
            markers: Vec::new(),
            rng: RNGState::new(seed),
            default_duration: Rules::ms(rules.sleep_default_ms),
            zzz_lifetime: Rules::ms(rules.zzz_lifetime_ms),
            wake_floor: rules.wake_stamina_floor,
        }
    }

    pub(crate) fn state(&self) -> SleepState {
        self.state
    }

    pub(crate) fn is_sleeping(&self) -> bool {
        self.state().is_sleeping()
    }

    pub(crate) fn markers(&self) -> &[ZzzMarker] {
        &self.markers
    }

    pub(crate) fn banner_active(&self) -> bool {
        self.banner.is_running()
    }

    /// The banner is shown once; any later stat change re-derives the status.
    pub(crate) fn clear_banner(&mut self) {
        self.banner.stop();
    }

    /// Collapses the backlog of the repeating timers after a clock jump.
    pub(crate) fn skip_missed(&mut self, now: DateTime<Utc>) {
        self.poll.skip_missed(now);
        self.zzz.skip_missed(now);
    }

    /// Awake -> Sleeping. `None` sleeps for the generic default length.
    /// Returns false (and changes nothing) when already asleep.
    pub(crate) fn enter(&mut self, now: DateTime<Utc>, duration: Option<Duration>) -> bool {
        if self.is_sleeping() {
            return false;
        }
        let duration = duration.unwrap_or(self.default_duration);
        let ends_at = now + duration;
        self.state = SleepState::Sleeping { ends_at };
        self.banner.stop();
        self.zzz.start(now);
        self.poll.start(now);
        info!(ms = duration.num_milliseconds(), "pet fell asleep");
        true
    }

    /// Sleeping -> Awake with stamina recovery. No-op when awake.
    pub(crate) fn wake(&mut self, now: DateTime<Utc>, pet: &mut PetState) -> bool {
        if !self.is_sleeping() {
            return false;
        }
        self.stop_effects();
        self.state = SleepState::Awake;
        pet.stamina = pet.stamina.max(self.wake_floor);
        self.banner.start(now);
        info!(stamina = pet.stamina, "pet woke up");
        true
    }

    /// Drops straight to Awake for a new game: timers and markers go, stamina
    /// is left alone because the pet is about to be replaced.
    pub(crate) fn force_reset(&mut self) {
        self.stop_effects();
        self.banner.stop();
        self.state = SleepState::Awake;
    }

    fn stop_effects(&mut self) {
        self.poll.stop();
        self.zzz.stop();
        self.markers.clear();
    }

    pub(crate) fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self.state {
            SleepState::Awake => None,
            SleepState::Sleeping { ends_at } => Some((ends_at - now).max(Duration::zero())),
        }
    }

    pub(crate) fn next_event(&self) -> Option<(DateTime<Utc>, SleepEvent)> {
        let expiry = self.markers.iter().map(|m| m.expires_at).min();
        [
            (self.poll.due(), SleepEvent::Poll),
            (self.zzz.due(), SleepEvent::SpawnZzz),
            (expiry, SleepEvent::ExpireZzz),
            (self.banner.due(), SleepEvent::BannerDone),
        ]
        .into_iter()
        .filter_map(|(at, ev)| at.map(|at| (at, ev)))
        .min()
    }

    /// Runs one timer event at its deadline `at`. Returns true when the pet
    /// woke up as a result.
    pub(crate) fn handle(&mut self, ev: SleepEvent, at: DateTime<Utc>, pet: &mut PetState) -> bool {
        match ev {
            SleepEvent::Poll => {
                self.poll.fire();
                self.on_poll(at, pet)
            }
            SleepEvent::SpawnZzz => {
                self.zzz.fire();
                self.spawn_marker(at);
                false
            }
            SleepEvent::ExpireZzz => {
                self.markers.retain(|m| m.expires_at > at);
                false
            }
            SleepEvent::BannerDone => {
                self.banner.fire();
                false
            }
        }
    }

    fn on_poll(&mut self, now: DateTime<Utc>, pet: &mut PetState) -> bool {
        match self.state {
            SleepState::Sleeping { ends_at } if now >= ends_at => self.wake(now, pet),
            _ => false,
        }
    }

    fn spawn_marker(&mut self, now: DateTime<Utc>) {
        let offset_pct = self.rng.range_f32(-20.0, 20.0);
        self.markers.push(ZzzMarker {
            offset_pct,
            born_at: now,
            expires_at: now + self.zzz_lifetime,
        });
        debug!(live = self.markers.len(), "zzz");
    }
}

/// `mm:ss`, rounding down, never negative.
pub(crate) fn format_remaining(remaining: Duration) -> String {
    let ms = remaining.num_milliseconds().max(0);
    format!("{:02}:{:02}", ms / 60_000, (ms % 60_000) / 1000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Shape;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn ms(v: i64) -> Duration {
        Duration::milliseconds(v)
    }

    /// Fires every sleep event due up to `until`, in deadline order.
    fn pump(ctl: &mut SleepController, pet: &mut PetState, until: DateTime<Utc>) -> bool {
        let mut woke = false;
        while let Some((at, ev)) = ctl.next_event() {
            if at > until {
                break;
            }
            woke |= ctl.handle(ev, at, pet);
        }
        woke
    }

    #[test]
    fn enter_sets_deadline_and_starts_effects() {
        let mut ctl = SleepController::new(&Rules::default(), 1);
        assert!(ctl.enter(t0(), Some(ms(5000))));
        assert_eq!(ctl.state(), SleepState::Sleeping { ends_at: t0() + ms(5000) });
        assert_eq!(ctl.remaining(t0()), Some(ms(5000)));
        assert!(ctl.next_event().is_some());
    }

    #[test]
    fn enter_without_duration_uses_generic_default() {
        let mut ctl = SleepController::new(&Rules::default(), 1);
        ctl.enter(t0(), None);
        assert_eq!(ctl.state(), SleepState::Sleeping { ends_at: t0() + ms(60_000) });

        let mut pet = PetState::new("Rex", Shape::Square);
        pet.stamina = 0;
        assert!(!pump(&mut ctl, &mut pet, t0() + ms(59_999)));
        assert!(pump(&mut ctl, &mut pet, t0() + ms(60_000)));
        assert_eq!(pet.stamina, 50);
    }

    #[test]
    fn enter_while_sleeping_keeps_first_deadline() {
        let mut ctl = SleepController::new(&Rules::default(), 1);
        ctl.enter(t0(), Some(ms(5000)));
        assert!(!ctl.enter(t0() + ms(1000), Some(ms(5000))));
        assert_eq!(ctl.state(), SleepState::Sleeping { ends_at: t0() + ms(5000) });
    }

    #[test]
    fn poll_wakes_at_deadline_with_stamina_floor() {
        let mut ctl = SleepController::new(&Rules::default(), 1);
        let mut pet = PetState::new("Rex", Shape::Square);
        pet.stamina = 0;
        ctl.enter(t0(), Some(ms(5000)));

        assert!(!pump(&mut ctl, &mut pet, t0() + ms(4999)));
        assert!(ctl.is_sleeping());
        assert!(pump(&mut ctl, &mut pet, t0() + ms(5000)));
        assert!(!ctl.is_sleeping());
        assert_eq!(pet.stamina, 50);
        assert!(ctl.markers().is_empty());
        assert!(ctl.banner_active());
    }

    #[test]
    fn wake_never_lowers_stamina() {
        let mut ctl = SleepController::new(&Rules::default(), 1);
        let mut pet = PetState::new("Rex", Shape::Square);
        pet.stamina = 80;
        ctl.enter(t0(), Some(ms(5000)));
        pump(&mut ctl, &mut pet, t0() + ms(5000));
        assert_eq!(pet.stamina, 80);
    }

    #[test]
    fn wake_while_awake_is_noop() {
        let mut ctl = SleepController::new(&Rules::default(), 1);
        let mut pet = PetState::new("Rex", Shape::Square);
        pet.stamina = 10;
        assert!(!ctl.wake(t0(), &mut pet));
        assert_eq!(pet.stamina, 10);
        assert!(!ctl.banner_active());
    }

    #[test]
    fn markers_spawn_and_expire_while_sleeping() {
        let mut ctl = SleepController::new(&Rules::default(), 9);
        let mut pet = PetState::new("Rex", Shape::Square);
        ctl.enter(t0(), Some(ms(60_000)));

        pump(&mut ctl, &mut pet, t0() + ms(1300));
        assert_eq!(ctl.markers().len(), 2);
        for m in ctl.markers() {
            assert!((-20.0..20.0).contains(&m.offset_pct));
            assert_eq!(m.expires_at - m.born_at, ms(2000));
        }

        // spawned at 600, 1200, 1800, 2400, 3000; the 600 one is gone by 2600
        pump(&mut ctl, &mut pet, t0() + ms(3000));
        assert_eq!(ctl.markers().len(), 4);
        assert!(ctl.markers().iter().all(|m| m.expires_at > t0() + ms(3000)));
    }

    #[test]
    fn force_reset_skips_recovery_and_clears_everything() {
        let mut ctl = SleepController::new(&Rules::default(), 1);
        let mut pet = PetState::new("Rex", Shape::Square);
        pet.stamina = 0;
        ctl.enter(t0(), Some(ms(5000)));
        pump(&mut ctl, &mut pet, t0() + ms(1300));
        assert!(!ctl.markers().is_empty());

        ctl.force_reset();
        assert_eq!(ctl.state(), SleepState::Awake);
        assert_eq!(pet.stamina, 0);
        assert!(ctl.markers().is_empty());
        assert!(ctl.next_event().is_none());
        assert!(!ctl.banner_active());
    }

    #[test]
    fn banner_clears_after_its_hold_time() {
        let mut ctl = SleepController::new(&Rules::default(), 1);
        let mut pet = PetState::new("Rex", Shape::Square);
        ctl.enter(t0(), Some(ms(5000)));
        pump(&mut ctl, &mut pet, t0() + ms(5000));
        assert!(ctl.banner_active());
        pump(&mut ctl, &mut pet, t0() + ms(6499));
        assert!(ctl.banner_active());
        pump(&mut ctl, &mut pet, t0() + ms(6500));
        assert!(!ctl.banner_active());
    }

    #[test]
    fn clear_banner_drops_its_timeout() {
        let mut ctl = SleepController::new(&Rules::default(), 1);
        let mut pet = PetState::new("Rex", Shape::Square);
        ctl.enter(t0(), Some(ms(5000)));
        pump(&mut ctl, &mut pet, t0() + ms(5000));
        ctl.clear_banner();
        assert!(!ctl.banner_active());
        assert!(ctl.next_event().is_none());
    }

    #[test]
    fn remaining_is_clamped_at_zero() {
        let mut ctl = SleepController::new(&Rules::default(), 1);
        ctl.enter(t0(), Some(ms(5000)));
        assert_eq!(ctl.remaining(t0() + ms(9000)), Some(Duration::zero()));
    }

    #[test]
    fn remaining_formats_as_minutes_and_seconds() {
        assert_eq!(format_remaining(ms(5000)), "00:05");
        assert_eq!(format_remaining(ms(4999)), "00:04");
        assert_eq!(format_remaining(ms(60_000)), "01:00");
        assert_eq!(format_remaining(ms(-300)), "00:00");
    }
}
