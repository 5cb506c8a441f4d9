use crate::clock::{Clock, SystemClock};
use crate::config::{load_settings, project_paths, Cli, Settings};
use crate::input::{collect_input_nonblocking, map_event_to_action, UiAction, UiState};
use crate::model::{Phase, Rules};
use crate::render::{
    canvas_to_cells, draw_pet, draw_pet_ascii, draw_text, draw_zzz, setup_lines, ui_overlay,
    Cell, Screen, Terminal, Viewport,
};
use crate::sim::{Command, Game, Outcome, PresentationSink};
use anyhow::Context;
use clap::Parser;
use crossterm::style::Color;
use std::cmp::{max, min};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

pub(crate) struct App {
    settings: Settings,
    game: Game,
    screen: Screen,
    ui: UiState,
    clock: SystemClock,
    term: Terminal,
    should_quit: bool,
}

impl App {
    fn init(cli: Cli) -> anyhow::Result<Self> {
        let paths = project_paths()?;
        init_tracing(&paths.log_path)?;
        info!("=== shapepet startup ===");

        let settings = load_settings(&paths.settings_path).merge_cli(&cli);
        let rules = Rules::default();
        let clock = SystemClock;

        let mut game = Game::new(rules.clone(), settings.seed);
        let mut screen = Screen::new(&rules);
        let ui = UiState::new(&settings.default_name, settings.default_shape);

        let now = clock.now();
        match cli.name {
            Some(name) => {
                game.dispatch(
                    Command::StartGame {
                        name,
                        shape: Some(settings.default_shape),
                    },
                    now,
                    &mut screen,
                );
            }
            None => screen.refresh(&game.snapshot(now)),
        }

        let term = Terminal::begin().context("could not enter terminal mode")?;

        Ok(Self {
            settings,
            game,
            screen,
            ui,
            clock,
            term,
            should_quit: false,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let frame_dt = Duration::from_secs_f32(1.0 / self.settings.fps_cap as f32);

        while !self.should_quit {
            self.term.resize_if_needed()?;

            for ev in collect_input_nonblocking(frame_dt)? {
                let Some(action) = map_event_to_action(self.game.phase(), &self.ui, ev) else {
                    continue;
                };
                if action == UiAction::Quit {
                    self.should_quit = true;
                    break;
                }
                if let Some(cmd) = self.ui.apply(action) {
                    let now = self.clock.now();
                    if self.game.dispatch(cmd.clone(), now, &mut self.screen) == Outcome::Ignored {
                        debug!(?cmd, sleeping = self.game.is_sleeping(), "command dropped");
                    }
                }
            }

            self.game.advance_to(self.clock.now(), &mut self.screen);

            self.render_frame()?;

            spin_sleep(frame_dt, Instant::now());
        }

        self.term.end()?;
        let pet = self.game.pet();
        info!(name = %pet.name, weight = pet.weight, "bye");
        Ok(())
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let bg = Color::Black;
        self.term.cur.clear(bg);

        let Some(snap) = self.screen.latest().cloned() else {
            return Ok(());
        };
        let now = self.clock.now();
        let pose = self.screen.pose(now);

        // Left panel for text; pet viewport on the right.
        let cols = self.term.cols as i32;
        let rows = self.term.rows as i32;
        let panel_w_cells = min(max(30, cols / 3), cols - 10).max(0);
        let pet_cells = Viewport {
            x: panel_w_cells,
            y: 0,
            w: cols - panel_w_cells,
            h: rows - 1,
        };

        if self.settings.enable_braille {
            self.term.canvas.clear();
            let vp = Viewport {
                x: pet_cells.x * 2,
                y: pet_cells.y * 4,
                w: pet_cells.w * 2,
                h: pet_cells.h * 4,
            };
            draw_pet(&mut self.term.canvas, &snap.pet, snap.sleeping, vp, pose);
            canvas_to_cells(&self.term.canvas, &mut self.term.cur, self.settings.enable_color, bg);
        } else {
            draw_pet_ascii(
                &mut self.term.cur,
                &snap.pet,
                snap.sleeping,
                pet_cells,
                pose,
                self.settings.enable_color,
            );
        }
        draw_zzz(&mut self.term.cur, &snap, pet_cells, now);

        ui_overlay(&mut self.term.cur, &snap);

        if snap.phase == Phase::Setup {
            self.draw_center_box("New pet", &setup_lines(&self.ui).join("\n"));
        } else if self.ui.help {
            self.draw_center_box(
                "How to play",
                "Keep your shape fed, rested and happy.\n\n\
    T Treat:    +happiness +weight +food +stamina\n\
    F Feed:     +food +stamina, a little weight\n\
    E Exercise: burns weight, food, stamina, mood\n\
    P Play:     +happiness, costs food and stamina\n\n\
    Stats drain every few seconds while awake.\n\
    At zero stamina it naps; actions wait until it wakes.\n\
    N starts over at any time.\n\n\
    Esc or H to close help.",
            );
        }

        self.term.present()?;
        Ok(())
    }

    fn draw_center_box(&mut self, title: &str, body: &str) {
        let w = self.term.cols;
        let h = self.term.rows;
        let fg = Color::White;
        let bg = Color::Black;

        let bw = min(60, w.saturating_sub(4));
        let bh = min(18, h.saturating_sub(4));
        if bw < 2 || bh < 2 {
            return;
        }

        let x0 = (w - bw) / 2;
        let y0 = (h - bh) / 2;
        let cur = &mut self.term.cur;

        for y in y0..y0 + bh {
            for x in x0..x0 + bw {
                let top = y == y0;
                let bottom = y == y0 + bh - 1;
                let left = x == x0;
                let right = x == x0 + bw - 1;
                let ch = match (top, bottom, left, right) {
                    (true, _, true, _) => '┌',
                    (true, _, _, true) => '┐',
                    (_, true, true, _) => '└',
                    (_, true, _, true) => '┘',
                    (true, _, _, _) | (_, true, _, _) => '─',
                    (_, _, true, _) | (_, _, _, true) => '│',
                    _ => ' ',
                };
                cur.set(x, y, Cell { ch, fg, bg });
            }
        }

        draw_text(cur, x0 + 2, y0 + 1, title, Color::Yellow, bg);

        let mut yy = y0 + 3;
        for line in body.lines() {
            if yy >= y0 + bh - 1 {
                break;
            }
            draw_text(cur, x0 + 2, yy, line, fg, bg);
            yy += 1;
        }
    }
}

/// Logs go to a file: the terminal is busy with the alternate screen.
fn init_tracing(log_path: &Path) -> anyhow::Result<()> {
    let file = File::create(log_path)
        .with_context(|| format!("could not open log file {}", log_path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .compact()
        .init();
    Ok(())
}

pub(crate) fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut app = App::init(cli)?;
    let result = app.run();
    if result.is_err() {
        // leave the terminal usable even when the loop failed
        let _ = app.term.end();
    }
    result
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
