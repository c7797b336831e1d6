use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use plan_it::gesture::{
    CellGeometry, DragTranslator, GestureMode, GestureOutcome, PointerCapture, PointerPosition,
};
use plan_it::project::{ProjectInfo, ProjectSnapshot};
use plan_it::{Planner, Task};

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
}

fn geometry() -> CellGeometry {
    CellGeometry::from_grid(700.0, Some(120.0))
}

fn at(x: f64, y: f64) -> PointerPosition {
    PointerPosition::new(x, y)
}

#[derive(Clone, Default)]
struct RecordingCapture {
    events: Rc<RefCell<Vec<&'static str>>>,
}

impl PointerCapture for RecordingCapture {
    fn acquire(&mut self) {
        self.events.borrow_mut().push("acquire");
    }

    fn release(&mut self) {
        self.events.borrow_mut().push("release");
    }
}

#[test]
fn move_by_three_columns_shifts_both_dates() {
    let task = Task::new("t", "Review", d(10), d(12));
    let mut translator = DragTranslator::new();
    assert!(translator.begin(&task, GestureMode::Move, at(400.0, 50.0), geometry()));

    let preview = translator.update(at(700.0, 55.0)).unwrap();
    assert_eq!(preview.delta_days, 3);
    assert_eq!((preview.start_date, preview.end_date), (d(13), d(15)));
    assert_eq!(preview.label().as_deref(), Some("+3 days"));

    match translator.end(at(700.0, 55.0)) {
        Some(GestureOutcome::Commit(commit)) => {
            assert_eq!((commit.start_date, commit.end_date), (d(13), d(15)));
        }
        other => panic!("expected commit, got {other:?}"),
    }
    assert!(!translator.is_active());
}

#[test]
fn resize_left_past_end_collapses_to_one_day() {
    let task = Task::new("t", "Edit", d(8), d(10));
    let mut translator = DragTranslator::new();
    translator.begin(&task, GestureMode::ResizeLeft, at(100.0, 0.0), geometry());

    let preview = translator.update(at(600.0, 0.0)).unwrap();
    assert_eq!(preview.delta_days, 5);
    assert_eq!((preview.start_date, preview.end_date), (d(10), d(10)));
    assert_eq!(preview.label().as_deref(), Some("Jul 10 - Jul 10 (1d)"));
}

#[test]
fn vertical_movement_counts_whole_weeks() {
    let task = Task::new("t", "Cut", d(2), d(4));
    let mut translator = DragTranslator::new();
    translator.begin(&task, GestureMode::Move, at(0.0, 0.0), geometry());
    let preview = translator.update(at(-100.0, 240.0)).unwrap();
    assert_eq!(preview.delta_days, 13);
    assert_eq!(preview.start_date, d(15));
}

#[test]
fn returning_to_origin_discards_the_gesture() {
    let task = Task::new("t", "Cut", d(2), d(4));
    let mut translator = DragTranslator::new();
    translator.begin(&task, GestureMode::Move, at(10.0, 10.0), geometry());
    assert_eq!(translator.update(at(400.0, 10.0)).unwrap().delta_days, 4);
    assert_eq!(
        translator.end(at(30.0, 20.0)),
        Some(GestureOutcome::Discarded {
            task_id: "t".into()
        })
    );
}

#[test]
fn second_begin_is_ignored_while_active() {
    let first = Task::new("a", "A", d(2), d(4));
    let second = Task::new("b", "B", d(9), d(9));
    let mut translator = DragTranslator::new();
    assert!(translator.begin(&first, GestureMode::Move, at(0.0, 0.0), geometry()));
    assert!(!translator.begin(&second, GestureMode::ResizeRight, at(0.0, 0.0), geometry()));
    assert_eq!(translator.active_task_id(), Some("a"));
    assert_eq!(translator.mode(), Some(GestureMode::Move));
}

#[test]
fn idle_translator_has_no_preview_or_outcome() {
    let mut translator = DragTranslator::new();
    assert_eq!(translator.update(at(100.0, 0.0)), None);
    assert_eq!(translator.end(at(100.0, 0.0)), None);
}

#[test]
fn capture_is_released_on_end_teardown_and_drop() {
    let capture = RecordingCapture::default();
    let events = Rc::clone(&capture.events);
    let task = Task::new("t", "Cut", d(2), d(4));

    let mut translator = DragTranslator::with_capture(capture);
    translator.begin(&task, GestureMode::Move, at(0.0, 0.0), geometry());
    translator.end(at(100.0, 0.0));
    translator.begin(&task, GestureMode::Move, at(0.0, 0.0), geometry());
    translator.teardown();
    translator.teardown();
    translator.begin(&task, GestureMode::ResizeRight, at(0.0, 0.0), geometry());
    drop(translator);

    assert_eq!(
        *events.borrow(),
        vec!["acquire", "release", "acquire", "release", "acquire", "release"]
    );
}

#[test]
fn planner_gesture_commit_is_one_undoable_update() {
    let snapshot = ProjectSnapshot::new(
        ProjectInfo::default(),
        vec![Task::new("t", "Review", d(10), d(12))],
    );
    let mut planner = Planner::from_snapshot(snapshot).unwrap();

    assert!(planner.begin_gesture("t", GestureMode::Move, at(0.0, 0.0), geometry()));
    // Dates are untouched while the gesture is in flight.
    planner.update_gesture(at(300.0, 0.0));
    assert_eq!(planner.task("t").unwrap().start_date, d(10));

    planner.end_gesture(at(300.0, 0.0)).unwrap();
    assert_eq!(planner.task("t").unwrap().start_date, d(13));
    assert_eq!(planner.undo_depth(), 1);

    assert!(planner.undo());
    let restored = planner.task("t").unwrap();
    assert_eq!(restored.start_date.to_string(), "2024-07-10");
    assert_eq!(restored.end_date.to_string(), "2024-07-12");
}

#[test]
fn planner_rejects_gestures_on_unknown_tasks() {
    let mut planner = Planner::new();
    assert!(!planner.begin_gesture("ghost", GestureMode::Move, at(0.0, 0.0), geometry()));
    assert_eq!(planner.end_gesture(at(10.0, 0.0)).unwrap(), None);
}
