use crate::decay::DecayScheduler;
use crate::model::{PetState, Phase, Rules, Shape, Snapshot, StatDelta};
use crate::sleep::{format_remaining, SleepController, SleepEvent};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

pub(crate) const MSG_TIRED: &str = "I’m tired... need rest soon.";
pub(crate) const MSG_HUNGRY: &str = "I’m hungry!";
pub(crate) const MSG_CONTENT: &str = "I’m feeling great!";
pub(crate) const MSG_AWAKE: &str = "Awake!";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Treat,
    Feed,
    Exercise,
    Play,
}

impl Action {
    pub(crate) fn delta(self) -> StatDelta {
        let (happiness, weight, food, stamina) = match self {
            Action::Treat => (5, 2, 3, 5),
            Action::Feed => (2, 1, 5, 10),
            Action::Exercise => (-10, -2, -10, -20),
            Action::Play => (4, -1, -5, -10),
        };
        StatDelta {
            happiness,
            weight,
            food,
            stamina,
        }
    }

    pub(crate) fn cue(self) -> Cue {
        match self {
            Action::Treat => Cue::Scale(1.10),
            Action::Feed => Cue::Scale(1.15),
            Action::Exercise => Cue::Scale(0.90),
            Action::Play => Cue::Rotate(20.0),
        }
    }
}

/// Transient pulse on the pet after an action. Purely cosmetic.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Cue {
    Scale(f32),
    Rotate(f32),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Act(Action),
    StartGame { name: String, shape: Option<Shape> },
    NewGame,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    Applied,
    /// Dropped without effect, e.g. an action while asleep.
    Ignored,
}

/// Whatever draws the pet. Receives snapshots after every state change and
/// fire-and-forget cues; it never feeds anything back into the game.
pub(crate) trait PresentationSink {
    fn refresh(&mut self, snapshot: &Snapshot);
    fn cue(&mut self, cue: Cue, at: DateTime<Utc>);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Due {
    Sleep(SleepEvent),
    Decay,
}

/// One game session: the pet plus the sleep and decay machinery acting on it.
pub(crate) struct Game {
    rules: Rules,
    pet: PetState,
    phase: Phase,
    sleep: SleepController,
    decay: DecayScheduler,
}

impl Game {
    pub(crate) fn new(rules: Rules, seed: u64) -> Self {
        let sleep = SleepController::new(&rules, seed);
        let decay = DecayScheduler::new(&rules);
        Self {
            rules,
            pet: PetState::placeholder(),
            phase: Phase::Setup,
            sleep,
            decay,
        }
    }

    pub(crate) fn pet(&self) -> &PetState {
        &self.pet
    }

    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn is_sleeping(&self) -> bool {
        self.sleep.is_sleeping()
    }

    pub(crate) fn actions_enabled(&self) -> bool {
        self.phase == Phase::Playing && !self.sleep.is_sleeping()
    }

    pub(crate) fn dispatch(
        &mut self,
        cmd: Command,
        now: DateTime<Utc>,
        sink: &mut dyn PresentationSink,
    ) -> Outcome {
        match cmd {
            Command::Act(action) => self.act(action, now, sink),
            Command::StartGame { name, shape } => {
                self.stop_all();
                self.pet = PetState::new(&name, shape.unwrap_or(Shape::FALLBACK));
                self.phase = Phase::Playing;
                self.decay.restart(now);
                info!(name = %self.pet.name, shape = %self.pet.shape, "game started");
                sink.refresh(&self.snapshot(now));
                Outcome::Applied
            }
            Command::NewGame => {
                self.stop_all();
                self.phase = Phase::Setup;
                info!("new game requested");
                sink.refresh(&self.snapshot(now));
                Outcome::Applied
            }
        }
    }

    fn act(&mut self, action: Action, now: DateTime<Utc>, sink: &mut dyn PresentationSink) -> Outcome {
        if !self.actions_enabled() {
            debug!(?action, phase = ?self.phase, "action ignored");
            return Outcome::Ignored;
        }
        self.pet.apply_delta(action.delta());
        debug!(?action, "action applied");
        self.settle(now, sink);
        sink.cue(action.cue(), now);
        Outcome::Applied
    }

    /// Shared tail of every stat mutation: clamp, publish, and collapse into a
    /// nap if stamina ran out.
    fn settle(&mut self, now: DateTime<Utc>, sink: &mut dyn PresentationSink) {
        self.sleep.clear_banner();
        self.pet.clamp();
        debug_assert!(self.pet.is_within_bounds());
        sink.refresh(&self.snapshot(now));
        if self.pet.stamina <= 0 {
            self.pet.stamina = 0;
            let nap = Rules::ms(self.rules.collapse_nap_ms);
            if self.sleep.enter(now, Some(nap)) {
                sink.refresh(&self.snapshot(now));
            }
        }
    }

    /// Cancels decay and every sleep-owned timer before the state is reset.
    fn stop_all(&mut self) {
        self.decay.stop();
        self.sleep.force_reset();
    }

    fn next_due(&self) -> Option<(DateTime<Utc>, Due)> {
        let sleep = self.sleep.next_event().map(|(at, ev)| (at, Due::Sleep(ev)));
        let decay = self.decay.next_due().map(|at| (at, Due::Decay));
        match (sleep, decay) {
            // decay was armed first, so it wins ties
            (Some(s), Some(d)) => Some(if d.0 <= s.0 { d } else { s }),
            (s, d) => s.or(d),
        }
    }

    /// Fires every timer whose deadline is at or before `now`, earliest first,
    /// each one running to completion before the next.
    /// A backlog older than `max_catch_up_ms` (suspend, clock step) is
    /// coalesced first: each repeating timer keeps one firing.
    pub(crate) fn advance_to(&mut self, now: DateTime<Utc>, sink: &mut dyn PresentationSink) {
        if let Some((oldest, _)) = self.next_due() {
            let behind = now - oldest;
            if behind > Rules::ms(self.rules.max_catch_up_ms) {
                let dropped = self.decay.skip_missed(now);
                self.sleep.skip_missed(now);
                warn!(
                    behind_ms = behind.num_milliseconds(),
                    dropped_decay_ticks = dropped,
                    "clock jumped, coalescing missed timers"
                );
            }
        }
        while let Some((at, due)) = self.next_due() {
            if at > now {
                break;
            }
            match due {
                Due::Decay => {
                    let sleeping = self.sleep.is_sleeping();
                    if self.decay.on_tick(&mut self.pet, sleeping) {
                        self.settle(at, sink);
                    }
                }
                Due::Sleep(ev) => {
                    self.sleep.handle(ev, at, &mut self.pet);
                    sink.refresh(&self.snapshot(at));
                }
            }
        }
    }

    pub(crate) fn status(&self, now: DateTime<Utc>) -> String {
        if let Some(left) = self.sleep.remaining(now) {
            return format!("Sleeping... {}", format_remaining(left));
        }
        if self.sleep.banner_active() {
            return MSG_AWAKE.to_string();
        }
        if self.phase == Phase::Setup {
            return String::new();
        }
        mood_message(&self.pet).to_string()
    }

    pub(crate) fn snapshot(&self, now: DateTime<Utc>) -> Snapshot {
        Snapshot {
            pet: self.pet.clone(),
            phase: self.phase,
            status: self.status(now),
            sleeping: self.sleep.is_sleeping(),
            remaining_ms: self.sleep.remaining(now).map(|d| d.num_milliseconds()),
            actions_enabled: self.actions_enabled(),
            markers: self.sleep.markers().to_vec(),
        }
    }
}

/// Awake status line. Checked in fixed priority: tired, hungry, content.
pub(crate) fn mood_message(pet: &PetState) -> &'static str {
    if pet.stamina <= 20 {
        MSG_TIRED
    } else if pet.food <= 20 {
        MSG_HUNGRY
    } else if pet.happiness >= 70 {
        MSG_CONTENT
    } else {
        ""
    }
}
