//! Pointer gesture state machine for moving and resizing task bars.
//!
//! The translator knows nothing about any input-event system: callers feed it pointer
//! positions and it answers with previews and, on release, at most one commit.

use crate::calendar::DAYS_PER_WEEK;
use crate::task::Task;
use chrono::{Duration, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};

/// Fallback row height when the rendering surface has no measured week yet.
pub const DEFAULT_CELL_HEIGHT: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GestureMode {
    Move,
    ResizeLeft,
    ResizeRight,
}

impl GestureMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureMode::Move => "move",
            GestureMode::ResizeLeft => "resize-left",
            GestureMode::ResizeRight => "resize-right",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "move" | "drag" => Some(GestureMode::Move),
            "resize-left" | "left" => Some(GestureMode::ResizeLeft),
            "resize-right" | "right" => Some(GestureMode::ResizeRight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

impl PointerPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size of one day cell on the rendering surface, sampled once per gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellGeometry {
    pub cell_width: f64,
    pub cell_height: f64,
}

impl CellGeometry {
    pub fn new(cell_width: f64, cell_height: f64) -> Self {
        Self {
            cell_width,
            cell_height,
        }
    }

    /// Derives cell size from the week grid's width and the first week's height.
    pub fn from_grid(grid_width: f64, week_height: Option<f64>) -> Self {
        Self {
            cell_width: grid_width / DAYS_PER_WEEK as f64,
            cell_height: week_height.unwrap_or(DEFAULT_CELL_HEIGHT),
        }
    }

    /// Whole-day displacement for a pointer offset: columns plus seven per week row.
    pub fn day_delta(&self, dx: f64, dy: f64) -> i64 {
        let days = steps(dx, self.cell_width);
        let weeks = steps(dy, self.cell_height);
        days.saturating_add(weeks.saturating_mul(DAYS_PER_WEEK as i64))
    }
}

// Half-way cases round toward positive infinity.
fn steps(offset: f64, cell: f64) -> i64 {
    if cell.is_nan() || cell <= 0.0 || !offset.is_finite() {
        return 0;
    }
    (offset / cell + 0.5).floor() as i64
}

/// Everything captured when a gesture begins.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureAnchor {
    pub task_id: String,
    pub pointer: PointerPosition,
    pub geometry: CellGeometry,
    pub original_start: NaiveDate,
    pub original_end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging(GestureAnchor),
    ResizingLeft(GestureAnchor),
    ResizingRight(GestureAnchor),
}

impl GestureState {
    fn active(&self) -> Option<(GestureMode, &GestureAnchor)> {
        match self {
            GestureState::Idle => None,
            GestureState::Dragging(anchor) => Some((GestureMode::Move, anchor)),
            GestureState::ResizingLeft(anchor) => Some((GestureMode::ResizeLeft, anchor)),
            GestureState::ResizingRight(anchor) => Some((GestureMode::ResizeRight, anchor)),
        }
    }
}

/// Tentative dates for the task under the pointer. Never applied until release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GesturePreview {
    pub task_id: String,
    pub mode: GestureMode,
    pub delta_days: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl GesturePreview {
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Tooltip text: `+3 days` while moving, `Jul 13 - Jul 15 (3d)` while resizing.
    /// `None` while the pointer is back on the original dates.
    pub fn label(&self) -> Option<String> {
        if self.delta_days == 0 {
            return None;
        }
        Some(match self.mode {
            GestureMode::Move => {
                let sign = if self.delta_days > 0 { "+" } else { "" };
                let unit = if self.delta_days.abs() == 1 {
                    "day"
                } else {
                    "days"
                };
                format!("{sign}{} {unit}", self.delta_days)
            }
            GestureMode::ResizeLeft | GestureMode::ResizeRight => format!(
                "{} - {} ({}d)",
                self.start_date.format("%b %-d"),
                self.end_date.format("%b %-d"),
                self.duration_days()
            ),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Released on the original dates; nothing to write.
    Discarded { task_id: String },
    /// Released elsewhere; the preview becomes one atomic update.
    Commit(GesturePreview),
}

/// Global pointer listeners held for the lifetime of one gesture.
pub trait PointerCapture {
    fn acquire(&mut self);
    fn release(&mut self);
}

/// Capture for headless callers that have no listeners to manage.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapture;

impl PointerCapture for NoCapture {
    fn acquire(&mut self) {}
    fn release(&mut self) {}
}

/// Converts pointer movement into date deltas for one task at a time.
///
/// Listeners acquired at gesture start are released on `end`, on `teardown`, and when
/// the translator is dropped mid-gesture.
#[derive(Debug, Default)]
pub struct DragTranslator<C: PointerCapture = NoCapture> {
    state: GestureState,
    capture: C,
}

impl DragTranslator<NoCapture> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: PointerCapture> DragTranslator<C> {
    pub fn with_capture(capture: C) -> Self {
        Self {
            state: GestureState::Idle,
            capture,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn capture(&self) -> &C {
        &self.capture
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, GestureState::Idle)
    }

    pub fn active_task_id(&self) -> Option<&str> {
        self.state.active().map(|(_, anchor)| anchor.task_id.as_str())
    }

    pub fn mode(&self) -> Option<GestureMode> {
        self.state.active().map(|(mode, _)| mode)
    }

    /// Starts a gesture on `task`. Ignored, returning false, while another gesture is
    /// still in progress.
    pub fn begin(
        &mut self,
        task: &Task,
        mode: GestureMode,
        pointer: PointerPosition,
        geometry: CellGeometry,
    ) -> bool {
        if self.is_active() {
            debug!(
                "event=gesture_begin module=gesture status=ignored task_id={} active_task_id={}",
                task.id,
                self.active_task_id().unwrap_or_default()
            );
            return false;
        }

        let anchor = GestureAnchor {
            task_id: task.id.clone(),
            pointer,
            geometry,
            original_start: task.start_date,
            original_end: task.end_date,
        };
        self.state = match mode {
            GestureMode::Move => GestureState::Dragging(anchor),
            GestureMode::ResizeLeft => GestureState::ResizingLeft(anchor),
            GestureMode::ResizeRight => GestureState::ResizingRight(anchor),
        };
        self.capture.acquire();
        debug!(
            "event=gesture_begin module=gesture status=ok task_id={} mode={}",
            task.id,
            mode.as_str()
        );
        true
    }

    /// Preview for the current pointer position, or `None` when idle.
    pub fn update(&self, pointer: PointerPosition) -> Option<GesturePreview> {
        let (mode, anchor) = self.state.active()?;
        Some(preview(mode, anchor, pointer))
    }

    /// Finishes the gesture and returns to idle. `None` when no gesture was active.
    pub fn end(&mut self, pointer: PointerPosition) -> Option<GestureOutcome> {
        let preview = self.update(pointer)?;
        self.reset();
        let outcome = if preview.delta_days == 0 {
            GestureOutcome::Discarded {
                task_id: preview.task_id,
            }
        } else {
            GestureOutcome::Commit(preview)
        };
        Some(outcome)
    }

    /// Abandons any gesture without committing and releases listeners.
    pub fn teardown(&mut self) {
        if self.is_active() {
            debug!(
                "event=gesture_teardown module=gesture status=ok task_id={}",
                self.active_task_id().unwrap_or_default()
            );
            self.reset();
        }
    }

    fn reset(&mut self) {
        self.state = GestureState::Idle;
        self.capture.release();
    }
}

impl<C: PointerCapture> Drop for DragTranslator<C> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn preview(mode: GestureMode, anchor: &GestureAnchor, pointer: PointerPosition) -> GesturePreview {
    let delta_days = anchor
        .geometry
        .day_delta(pointer.x - anchor.pointer.x, pointer.y - anchor.pointer.y);
    // A delta past the representable date range leaves the task where it was.
    let (delta_days, (start_date, end_date)) =
        match shifted_range(mode, anchor.original_start, anchor.original_end, delta_days) {
            Some(range) => (delta_days, range),
            None => (0, (anchor.original_start, anchor.original_end)),
        };
    GesturePreview {
        task_id: anchor.task_id.clone(),
        mode,
        delta_days,
        start_date,
        end_date,
    }
}

/// New `(start, end)` after moving by `delta` days in `mode`. Resizing past the other
/// edge collapses the task to a single day instead of inverting it. `None` when a
/// shifted date falls outside the calendar's range.
pub fn shifted_range(
    mode: GestureMode,
    start: NaiveDate,
    end: NaiveDate,
    delta: i64,
) -> Option<(NaiveDate, NaiveDate)> {
    let offset = Duration::try_days(delta)?;
    let shift = |date: NaiveDate| date.checked_add_signed(offset);
    match mode {
        GestureMode::Move => Some((shift(start)?, shift(end)?)),
        GestureMode::ResizeLeft => Some((shift(start)?.min(end), end)),
        GestureMode::ResizeRight => Some((start, shift(end)?.max(start))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
    }

    #[test]
    fn rounding_matches_half_up() {
        let geometry = CellGeometry::new(100.0, 120.0);
        assert_eq!(geometry.day_delta(49.0, 0.0), 0);
        assert_eq!(geometry.day_delta(50.0, 0.0), 1);
        assert_eq!(geometry.day_delta(-50.0, 0.0), 0);
        assert_eq!(geometry.day_delta(-51.0, 0.0), -1);
        assert_eq!(geometry.day_delta(0.0, 130.0), 7);
        assert_eq!(geometry.day_delta(-210.0, -120.0), -9);
    }

    #[test]
    fn degenerate_geometry_yields_no_movement() {
        let geometry = CellGeometry::new(0.0, f64::NAN);
        assert_eq!(geometry.day_delta(500.0, 500.0), 0);
    }

    #[test]
    fn from_grid_uses_fallback_height() {
        let geometry = CellGeometry::from_grid(700.0, None);
        assert_eq!(geometry.cell_width, 100.0);
        assert_eq!(geometry.cell_height, DEFAULT_CELL_HEIGHT);
    }

    #[test]
    fn resize_right_clamps_to_start() {
        assert_eq!(
            shifted_range(GestureMode::ResizeRight, d(8), d(10), -5),
            Some((d(8), d(8)))
        );
    }

    #[test]
    fn out_of_range_shifts_have_no_result() {
        assert_eq!(shifted_range(GestureMode::Move, d(8), d(10), 200_000_000), None);
        assert_eq!(shifted_range(GestureMode::ResizeLeft, d(8), d(10), i64::MIN), None);
        assert_eq!(shifted_range(GestureMode::ResizeRight, d(8), d(10), i64::MAX), None);
    }

    #[test]
    fn tiny_cells_saturate_instead_of_overflowing() {
        let geometry = CellGeometry::new(1e-300, 1e-300);
        assert_eq!(geometry.day_delta(500.0, 500.0), i64::MAX);
        assert_eq!(geometry.day_delta(-500.0, -500.0), i64::MIN);
    }

    #[test]
    fn unreachable_preview_falls_back_to_original_dates() {
        let task = Task::new("t", "Cut", d(2), d(4));
        let mut translator = DragTranslator::new();
        translator.begin(
            &task,
            GestureMode::Move,
            PointerPosition::new(0.0, 0.0),
            CellGeometry::new(1e-6, 120.0),
        );
        let preview = translator.update(PointerPosition::new(500.0, 0.0)).unwrap();
        assert_eq!(preview.delta_days, 0);
        assert_eq!((preview.start_date, preview.end_date), (d(2), d(4)));
        assert_eq!(
            translator.end(PointerPosition::new(500.0, 0.0)),
            Some(GestureOutcome::Discarded { task_id: "t".into() })
        );
    }

    #[test]
    fn labels_follow_mode() {
        let mut preview = GesturePreview {
            task_id: "t".into(),
            mode: GestureMode::Move,
            delta_days: -1,
            start_date: d(9),
            end_date: d(11),
        };
        assert_eq!(preview.label().as_deref(), Some("-1 day"));
        preview.delta_days = 3;
        assert_eq!(preview.label().as_deref(), Some("+3 days"));
        preview.mode = GestureMode::ResizeRight;
        assert_eq!(preview.label().as_deref(), Some("Jul 9 - Jul 11 (3d)"));
        preview.delta_days = 0;
        assert_eq!(preview.label(), None);
    }

    #[test]
    fn mode_parsing_accepts_short_names() {
        assert_eq!(GestureMode::parse("left"), Some(GestureMode::ResizeLeft));
        assert_eq!(GestureMode::parse("MOVE"), Some(GestureMode::Move));
        assert_eq!(GestureMode::parse("sideways"), None);
    }
}
