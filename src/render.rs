use crate::input::UiState;
use crate::model::{Phase, PetState, Rules, Shape, Snapshot};
use crate::sim::{Cue, PresentationSink};
use chrono::{DateTime, Duration, Utc};
use crossterm::{
    cursor,
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::f32::consts::PI;
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    fn set_i32(&mut self, x: i32, y: i32, c: Cell) {
        if x >= 0 && y >= 0 {
            self.set(x as u16, y as u16, c);
        }
    }
    pub(crate) fn clear(&mut self, bg: Color) {
        for c in &mut self.cells {
            *c = Cell {
                bg,
                ..Cell::default()
            };
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Pixel {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl Pixel {
    fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    fn dimmed(self, f: f32) -> Self {
        let d = |c: u8| (c as f32 * f).clamp(0.0, 255.0) as u8;
        Self {
            r: d(self.r),
            g: d(self.g),
            b: d(self.b),
            a: self.a,
        }
    }

    fn to_color(self, enable_color: bool) -> Color {
        if enable_color {
            Color::Rgb {
                r: self.r,
                g: self.g,
                b: self.b,
            }
        } else {
            Color::White
        }
    }
}

pub(crate) struct PixelCanvas {
    pub(crate) w: u32,
    pub(crate) h: u32,
    pub(crate) px: Vec<Pixel>,
}

impl PixelCanvas {
    pub(crate) fn new(w: u32, h: u32) -> Self {
        Self {
            w,
            h,
            px: vec![Pixel::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn clear(&mut self) {
        self.px.fill(Pixel::default());
    }
    fn blend_over(&mut self, x: i32, y: i32, src: Pixel) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.w || y >= self.h {
            return;
        }
        let i = self.idx(x, y);
        let dst = self.px[i];

        let sa = src.a as f32 / 255.0;
        let da = dst.a as f32 / 255.0;

        let out_a = sa + da * (1.0 - sa);
        if out_a <= 1e-6 {
            self.px[i] = Pixel::default();
            return;
        }

        let blend = |sc: u8, dc: u8| -> u8 {
            let sc = sc as f32 / 255.0;
            let dc = dc as f32 / 255.0;
            let out = (sc * sa + dc * da * (1.0 - sa)) / out_a;
            (out.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
        };

        self.px[i] = Pixel {
            r: blend(src.r, dst.r),
            g: blend(src.g, dst.g),
            b: blend(src.b, dst.b),
            a: (out_a.clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
        };
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
    pub(crate) canvas: PixelCanvas,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;

        // Braille: 2×4 pixels per cell
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
            canvas: PixelCanvas::new(cols as u32 * 2, rows as u32 * 4),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        self.canvas = PixelCanvas::new(c as u32 * 2, r as u32 * 4);
        Ok(true)
    }

    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

/* -----------------------------
   Braille encoding: 2×4 pixels -> U+2800..U+28FF
------------------------------ */

fn braille_bit(dx: u32, dy: u32) -> u8 {
    // (0,0)=1 (0,1)=2 (0,2)=4 (0,3)=64
    // (1,0)=8 (1,1)=16 (1,2)=32 (1,3)=128
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0x00,
    }
}

pub(crate) fn canvas_to_cells(canvas: &PixelCanvas, out: &mut CellBuffer, enable_color: bool, bg: Color) {
    for cy in 0..out.h as u32 {
        for cx in 0..out.w as u32 {
            let mut mask: u8 = 0;
            let (mut sum_r, mut sum_g, mut sum_b, mut ink) = (0u32, 0u32, 0u32, 0u32);

            for dy in 0..4 {
                for dx in 0..2 {
                    let (x, y) = (cx * 2 + dx, cy * 4 + dy);
                    if x >= canvas.w || y >= canvas.h {
                        continue;
                    }
                    let p = canvas.px[canvas.idx(x, y)];
                    if p.a >= 32 {
                        mask |= braille_bit(dx, dy);
                        sum_r += p.r as u32;
                        sum_g += p.g as u32;
                        sum_b += p.b as u32;
                        ink += 1;
                    }
                }
            }
            if mask == 0 {
                continue;
            }

            let ch = char::from_u32(0x2800 + (mask as u32)).unwrap_or(' ');
            let fg = Pixel::rgb(
                (sum_r / ink) as u8,
                (sum_g / ink) as u8,
                (sum_b / ink) as u8,
            )
            .to_color(enable_color);
            out.set(cx as u16, cy as u16, Cell { ch, fg, bg });
        }
    }
}

/* -----------------------------
   Appearance
------------------------------ */

/// Body colour by happiness band.
pub(crate) fn happiness_color(happiness: i32) -> Pixel {
    if happiness <= 35 {
        Pixel::rgb(0xff, 0x4d, 0x4d)
    } else if happiness <= 65 {
        Pixel::rgb(0xff, 0xcc, 0x00)
    } else {
        Pixel::rgb(0x4c, 0xaf, 0x50)
    }
}

/// Body size by weight band, in percent of the medium size.
pub(crate) fn weight_size(weight: i32) -> i32 {
    if weight <= 5 {
        70
    } else if weight <= 10 {
        100
    } else {
        130
    }
}

/// Whether a point in the unit box [-1,1]² lies inside `shape`.
pub(crate) fn shape_contains(shape: Shape, x: f32, y: f32) -> bool {
    match shape {
        Shape::Circle => x * x + y * y <= 1.0,
        Shape::Square => x.abs() <= 0.85 && y.abs() <= 0.85,
        Shape::Triangle => inside_polygon(&[(0.0, -1.0), (1.0, 0.85), (-1.0, 0.85)], x, y),
        Shape::Pentagon => {
            let pts: Vec<(f32, f32)> = (0..5)
                .map(|k| {
                    let a = -PI / 2.0 + k as f32 * 2.0 * PI / 5.0;
                    (a.cos(), a.sin())
                })
                .collect();
            inside_polygon(&pts, x, y)
        }
    }
}

fn inside_polygon(pts: &[(f32, f32)], x: f32, y: f32) -> bool {
    let mut inside = false;
    let mut j = pts.len() - 1;
    for i in 0..pts.len() {
        let (xi, yi) = pts[i];
        let (xj, yj) = pts[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/* -----------------------------
   Cues
------------------------------ */

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Pose {
    pub(crate) scale: f32,
    pub(crate) rotate_deg: f32,
}

impl Pose {
    pub(crate) const REST: Pose = Pose {
        scale: 1.0,
        rotate_deg: 0.0,
    };
}

/// The presentation sink: keeps the latest snapshot and at most one running
/// cue. A new cue replaces the old one; cues revert on their own.
pub(crate) struct Screen {
    latest: Option<Snapshot>,
    cue: Option<(Cue, DateTime<Utc>)>,
    cue_hold: Duration,
}

impl Screen {
    pub(crate) fn new(rules: &Rules) -> Self {
        Self {
            latest: None,
            cue: None,
            cue_hold: Rules::ms(rules.cue_revert_ms),
        }
    }

    pub(crate) fn latest(&self) -> Option<&Snapshot> {
        self.latest.as_ref()
    }

    pub(crate) fn pose(&self, now: DateTime<Utc>) -> Pose {
        match self.cue {
            Some((cue, until)) if now < until => match cue {
                Cue::Scale(scale) => Pose {
                    scale,
                    ..Pose::REST
                },
                Cue::Rotate(rotate_deg) => Pose {
                    rotate_deg,
                    ..Pose::REST
                },
            },
            _ => Pose::REST,
        }
    }
}

impl PresentationSink for Screen {
    fn refresh(&mut self, snapshot: &Snapshot) {
        self.latest = Some(snapshot.clone());
    }

    fn cue(&mut self, cue: Cue, at: DateTime<Utc>) {
        self.cue = Some((cue, at + self.cue_hold));
    }
}

/* -----------------------------
   Pet
------------------------------ */

#[derive(Clone, Copy)]
pub(crate) struct Viewport {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) w: i32,
    pub(crate) h: i32,
}

impl Viewport {
    fn center(&self) -> (i32, i32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    /// Radius of the body for a pet of `size` percent.
    fn body_radius(&self, size: i32, pose: Pose) -> i32 {
        let full = self.w.min(self.h) as f32 * 0.45;
        ((full * size as f32 / 130.0) * pose.scale).max(2.0) as i32
    }
}

fn rotate(x: f32, y: f32, deg: f32) -> (f32, f32) {
    let (s, c) = (-deg.to_radians()).sin_cos();
    (x * c - y * s, x * s + y * c)
}

fn body_pixel(pet: &PetState, sleeping: bool) -> Pixel {
    let base = happiness_color(pet.happiness);
    if sleeping {
        base.dimmed(0.55)
    } else {
        base
    }
}

pub(crate) fn draw_pet(canvas: &mut PixelCanvas, pet: &PetState, sleeping: bool, vp: Viewport, pose: Pose) {
    let (cx, cy) = vp.center();
    let radius = vp.body_radius(weight_size(pet.weight), pose);
    let body = body_pixel(pet, sleeping);

    for y in -radius..=radius {
        for x in -radius..=radius {
            let (nx, ny) = rotate(x as f32 / radius as f32, y as f32 / radius as f32, pose.rotate_deg);
            if !shape_contains(pet.shape, nx, ny) {
                continue;
            }
            let t = 1.0 - (nx * nx + ny * ny).sqrt().min(1.0);
            let a = (body.a as f32 * (0.45 + 0.55 * t)) as u8;
            canvas.blend_over(cx + x, cy + y, Pixel { a, ..body });
        }
    }

    let eye = Pixel {
        r: 5,
        g: 5,
        b: 8,
        a: 245,
    };
    let eye_y = cy - radius / 5;
    let (left_x, right_x) = (cx - radius / 3, cx + radius / 3);
    if sleeping {
        for dx in -2..=2 {
            canvas.blend_over(left_x + dx, eye_y, eye);
            canvas.blend_over(right_x + dx, eye_y, eye);
        }
    } else {
        for dy in -1..=1 {
            for dx in -1..=1 {
                canvas.blend_over(left_x + dx, eye_y + dy, eye);
                canvas.blend_over(right_x + dx, eye_y + dy, eye);
            }
        }
    }
}

/// Cell-resolution fallback: cells are roughly twice as tall as wide.
pub(crate) fn draw_pet_ascii(
    buf: &mut CellBuffer,
    pet: &PetState,
    sleeping: bool,
    vp: Viewport,
    pose: Pose,
    enable_color: bool,
) {
    let (cx, cy) = vp.center();
    let rx = vp.body_radius(weight_size(pet.weight), pose).max(2);
    let ry = (rx / 2).max(1);
    let fg = body_pixel(pet, sleeping).to_color(enable_color);

    for y in -ry..=ry {
        for x in -rx..=rx {
            let (nx, ny) = rotate(x as f32 / rx as f32, y as f32 / ry as f32, pose.rotate_deg);
            if shape_contains(pet.shape, nx, ny) {
                buf.set_i32(cx + x, cy + y, Cell { ch: '█', fg, bg: Color::Black });
            }
        }
    }

    let eye = if sleeping { '-' } else { 'o' };
    for ex in [cx - rx / 3, cx + rx / 3] {
        buf.set_i32(ex, cy - ry / 3, Cell { ch: eye, fg: Color::Black, bg: fg });
    }
}

/// Floating Zs above the pet, in cell coordinates.
pub(crate) fn draw_zzz(buf: &mut CellBuffer, snap: &Snapshot, vp_cells: Viewport, now: DateTime<Utc>) {
    let (cx, cy) = vp_cells.center();
    let rise = (vp_cells.h / 2).max(2);
    for m in &snap.markers {
        let p = m.progress(now);
        let x = cx + (m.offset_pct / 100.0 * vp_cells.w as f32) as i32;
        let y = cy - (p * rise as f32) as i32 - 1;
        let fg = if p < 0.6 { Color::White } else { Color::DarkGrey };
        buf.set_i32(x, y, Cell { ch: 'Z', fg, bg: Color::Black });
    }
}

/* -----------------------------
   Text panel
------------------------------ */

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg });
    }
}

fn bar(value: i32, width: usize) -> String {
    let v = (value as f32 / 100.0).clamp(0.0, 1.0);
    let fill = (v * width as f32 + 0.5) as usize;
    let mut s = String::with_capacity(width + 2);
    s.push('[');
    for i in 0..width {
        s.push(if i < fill { '█' } else { ' ' });
    }
    s.push(']');
    s
}

pub(crate) fn stat_lines(pet: &PetState) -> Vec<String> {
    vec![
        format!("Name:    {}", pet.name),
        format!("Shape:   {}", pet.shape),
        format!("Weight:  {}", pet.weight),
        format!("Happy:   {} {:>3}", bar(pet.happiness, 12), pet.happiness),
        format!("Food:    {} {:>3}", bar(pet.food, 12), pet.food),
        format!("Stamina: {} {:>3}", bar(pet.stamina, 12), pet.stamina),
    ]
}

pub(crate) fn ui_overlay(buf: &mut CellBuffer, snap: &Snapshot) {
    let bg = Color::Black;
    let fg = Color::White;

    draw_text(buf, 1, 0, "Shapepet", Color::Yellow, bg);

    for (i, line) in stat_lines(&snap.pet).iter().enumerate() {
        draw_text(buf, 1, 2 + i as u16, line, fg, bg);
    }

    let status_fg = if snap.sleeping { Color::Cyan } else { Color::Yellow };
    draw_text(buf, 1, 9, &snap.status, status_fg, bg);

    let (hint, hint_fg) = match (snap.phase, snap.actions_enabled) {
        (Phase::Setup, _) => ("Setup: type name | ←→ shape | enter start | esc quit", fg),
        (Phase::Playing, true) => (
            "Keys: t treat | f feed | e exercise | p play | n new game | h help | q quit",
            fg,
        ),
        (Phase::Playing, false) => ("Sleeping... n new game | h help | q quit", Color::DarkGrey),
    };
    draw_text(buf, 1, buf.h.saturating_sub(1), hint, hint_fg, bg);
}

pub(crate) fn setup_lines(ui: &UiState) -> Vec<String> {
    let mut name = ui.name_edit.clone();
    name.push('_');
    let shapes: Vec<String> = Shape::ALL
        .iter()
        .map(|s| {
            if *s == ui.shape {
                format!("[{s}]")
            } else {
                format!(" {s} ")
            }
        })
        .collect();
    vec![
        format!("Name:  {name}"),
        String::new(),
        format!("Shape: {}", shapes.join(" ")),
        String::new(),
        "Enter start | ←→ shape | Esc quit".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ZzzMarker;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn snapshot(pet: PetState, sleeping: bool) -> Snapshot {
        Snapshot {
            pet,
            phase: Phase::Playing,
            status: String::new(),
            sleeping,
            remaining_ms: None,
            actions_enabled: !sleeping,
            markers: Vec::new(),
        }
    }

    #[test]
    fn happiness_bands() {
        assert_eq!(happiness_color(35), Pixel::rgb(0xff, 0x4d, 0x4d));
        assert_eq!(happiness_color(36), Pixel::rgb(0xff, 0xcc, 0x00));
        assert_eq!(happiness_color(65), Pixel::rgb(0xff, 0xcc, 0x00));
        assert_eq!(happiness_color(66), Pixel::rgb(0x4c, 0xaf, 0x50));
    }

    #[test]
    fn weight_bands() {
        assert_eq!(weight_size(1), 70);
        assert_eq!(weight_size(5), 70);
        assert_eq!(weight_size(6), 100);
        assert_eq!(weight_size(10), 100);
        assert_eq!(weight_size(11), 130);
    }

    #[test]
    fn shapes_contain_their_center_but_not_far_corners() {
        for shape in Shape::ALL {
            assert!(shape_contains(shape, 0.0, 0.0), "{shape}");
            assert!(!shape_contains(shape, 0.99, -0.99), "{shape}");
        }
        assert!(shape_contains(Shape::Square, 0.8, 0.8));
        assert!(!shape_contains(Shape::Circle, 0.8, 0.8));
    }

    #[test]
    fn newer_cue_replaces_older_and_both_revert() {
        let mut screen = Screen::new(&Rules::default());
        screen.cue(Cue::Scale(1.1), t0());
        screen.cue(Cue::Rotate(20.0), t0() + Duration::milliseconds(50));
        let mid = screen.pose(t0() + Duration::milliseconds(100));
        assert_eq!(mid.rotate_deg, 20.0);
        assert_eq!(mid.scale, 1.0);
        assert_eq!(screen.pose(t0() + Duration::milliseconds(250)), Pose::REST);
    }

    #[test]
    fn screen_keeps_latest_snapshot() {
        let mut screen = Screen::new(&Rules::default());
        assert!(screen.latest().is_none());
        screen.refresh(&snapshot(PetState::new("Rex", Shape::Square), false));
        assert_eq!(screen.latest().map(|s| s.pet.name.as_str()), Some("Rex"));
    }

    #[test]
    fn pet_is_drawn_into_the_canvas() {
        let mut canvas = PixelCanvas::new(80, 80);
        let vp = Viewport { x: 0, y: 0, w: 80, h: 80 };
        let pet = PetState::new("Rex", Shape::Triangle);
        draw_pet(&mut canvas, &pet, false, vp, Pose::REST);
        assert!(canvas.px[canvas.idx(40, 40)].a > 0);
        assert_eq!(canvas.px[canvas.idx(0, 0)].a, 0);
    }

    #[test]
    fn heavier_pet_covers_more_cells() {
        let vp = Viewport { x: 0, y: 0, w: 60, h: 30 };
        let count = |weight: i32| {
            let mut buf = CellBuffer::new(60, 30);
            let mut pet = PetState::new("Rex", Shape::Square);
            pet.weight = weight;
            draw_pet_ascii(&mut buf, &pet, false, vp, Pose::REST, true);
            buf.cells.iter().filter(|c| c.ch == '█').count()
        };
        assert!(count(12) > count(3));
    }

    #[test]
    fn zzz_markers_rise_over_their_lifetime() {
        let mut snap = snapshot(PetState::new("Rex", Shape::Circle), true);
        snap.markers.push(ZzzMarker {
            offset_pct: 0.0,
            born_at: t0(),
            expires_at: t0() + Duration::milliseconds(2000),
        });
        let vp = Viewport { x: 0, y: 0, w: 20, h: 20 };
        let row_of_z = |now| {
            let mut buf = CellBuffer::new(20, 20);
            draw_zzz(&mut buf, &snap, vp, now);
            buf.cells.iter().position(|c| c.ch == 'Z').map(|i| i / 20)
        };
        let early = row_of_z(t0()).unwrap();
        let late = row_of_z(t0() + Duration::milliseconds(1800)).unwrap();
        assert!(late < early);
    }

    #[test]
    fn setup_form_marks_selected_shape() {
        let ui = UiState::new("Rex", Shape::Square);
        let lines = setup_lines(&ui);
        assert_eq!(lines[0], "Name:  Rex_");
        assert!(lines[2].contains("[square]"));
    }
}
