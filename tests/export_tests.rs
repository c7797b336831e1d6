use chrono::NaiveDate;
use plan_it::export::color::{DARK_TEXT, LIGHT_TEXT};
use plan_it::export::sheet::{
    MONTH_SPACING_ROWS, MonthKey, SyncPayload, build_main_calendars, build_sheet_calendar,
    calendar_frame, due_dates_by_assignee, task_list_frame, task_list_rows,
};
use plan_it::export::{document_file_name, document_layout};
use plan_it::project::{ProjectInfo, sample_snapshot};
use plan_it::{Task, layout};
use polars::prelude::DataType;

fn d(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, day).unwrap()
}

const JULY: MonthKey = MonthKey {
    year: 2024,
    month: 7,
};

#[test]
fn july_sheet_calendar_rows_and_cells() {
    let snapshot = sample_snapshot();
    let calendar = build_sheet_calendar(&snapshot.tasks, "Marketing Campaign", JULY, 1).unwrap();

    assert_eq!(calendar.title, "Marketing Campaign - July 2024");
    assert_eq!(calendar.title_row, 1);
    assert_eq!(calendar.header_row, 2);
    assert_eq!(calendar.weeks.len(), 5);

    let first = &calendar.weeks[0];
    assert_eq!(first.date_row, 3);
    // Jul 1 2024 is a Monday, so Sunday's column stays empty.
    assert_eq!(first.dates.first(), Some(&(2, 1)));
    assert_eq!(first.dates.len(), 6);
    assert_eq!(first.task_rows, 1);

    let creative = first.tasks.iter().find(|c| c.task_id == "task-1").unwrap();
    assert_eq!((creative.row, creative.column, creative.span), (4, 3, 3));
    assert!(creative.is_merged());
    assert_eq!(creative.font_color, DARK_TEXT);

    let second = &calendar.weeks[1];
    assert_eq!(second.date_row, 6);
    assert_eq!(second.task_rows, 2);
    let review = second.tasks.iter().find(|c| c.task_id == "task-4").unwrap();
    assert_eq!(review.row, 8);

    assert_eq!(calendar.weeks[2].task_rows, 3);
    let last = calendar.weeks.last().unwrap();
    assert_eq!(last.dates, vec![(1, 28), (2, 29), (3, 30), (4, 31)]);
    assert!(last.tasks.is_empty());
    assert_eq!(last.task_rows, 1);
    assert_eq!(calendar.last_row(), 21);
}

#[test]
fn sheet_clips_bars_to_the_month() {
    let tasks = vec![Task::new("x", "Spill", d(6, 28), d(7, 2)).with_color("#2d2a26")];
    let calendar = build_sheet_calendar(&tasks, "P", JULY, 1).unwrap();
    let cells: Vec<_> = calendar.task_cells().collect();
    assert_eq!(cells.len(), 1);
    assert_eq!((cells[0].column, cells[0].span), (2, 2));
    assert_eq!(cells[0].font_color, LIGHT_TEXT);
}

#[test]
fn main_tab_stacks_months_with_spacing() {
    let tasks = vec![
        Task::new("a", "June", d(6, 10), d(6, 12)),
        Task::new("b", "Cross", d(6, 28), d(7, 2)),
    ];
    let calendars = build_main_calendars(&tasks, "P").unwrap();
    assert_eq!(calendars.len(), 2);
    assert_eq!(calendars[0].title, "P - June 2024");
    assert_eq!(calendars[0].title_row, 1);
    assert_eq!(
        calendars[1].title_row,
        calendars[0].last_row() + MONTH_SPACING_ROWS
    );
}

#[test]
fn calendar_frame_has_one_line_per_sheet_row() {
    let snapshot = sample_snapshot();
    let calendar = build_sheet_calendar(&snapshot.tasks, "Marketing Campaign", JULY, 1).unwrap();
    let frame = calendar_frame(&calendar).unwrap();
    assert_eq!(frame.shape(), (21, 8));
    let names: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(
        names,
        vec!["row", "Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
    );
}

#[test]
fn task_list_is_sorted_and_date_typed() {
    let snapshot = sample_snapshot();
    let rows = task_list_rows(&snapshot.tasks);
    assert_eq!(rows.len(), 13);
    assert!(rows.windows(2).all(|w| w[0].start_date <= w[1].start_date));
    assert_eq!(rows[0].days, 3);

    let frame = task_list_frame(&snapshot.tasks).unwrap();
    assert_eq!(frame.height(), 13);
    assert_eq!(frame.column("Start").unwrap().dtype(), &DataType::Date);
    assert_eq!(frame.column("End").unwrap().dtype(), &DataType::Date);
}

#[test]
fn due_dates_grouped_alphabetically() {
    let snapshot = sample_snapshot();
    let groups = due_dates_by_assignee(&snapshot.tasks);
    let names: Vec<&str> = groups.iter().map(|g| g.assignee.as_str()).collect();
    assert_eq!(
        names,
        vec!["Elena Rodriguez", "Marcus Webb", "Sarah Chen", "Team"]
    );
    let team: Vec<String> = groups[3].tasks.iter().map(|t| t.label()).collect();
    assert_eq!(team, vec!["Jul 10", "Jul 20", "Jul 24"]);
}

#[test]
fn sync_payload_uses_zero_based_month() {
    let snapshot = sample_snapshot();
    let payload = SyncPayload::new(&ProjectInfo::default(), &snapshot.tasks, d(7, 19));
    let value: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
    assert_eq!(value["month"], 6);
    assert_eq!(value["year"], 2024);
    assert_eq!(value["projectName"], "Marketing Campaign");
    assert_eq!(value["tasks"].as_array().unwrap().len(), 13);
    assert_eq!(value["tasks"][0]["startDate"], "2024-07-02");
}

#[test]
fn document_layout_for_sample_month() {
    let snapshot = sample_snapshot();
    let month = layout(&snapshot.tasks, d(7, 1));
    let document = document_layout(&month, "Marketing Campaign", d(7, 4));

    assert_eq!(document.title, "Marketing Campaign - July 2024");
    assert_eq!(document.footer, "Generated on 7/4/2024");
    assert_eq!(document.file_name, "marketing-campaign---july-2024.pdf");
    assert_eq!(document.header_cells.len(), 7);
    assert_eq!(document.weeks.len(), 5);
    // task-9 crosses the Jul 20/21 week boundary and is drawn twice.
    assert_eq!(document.bars.len(), 14);

    let total: f64 = document.weeks.iter().map(|w| w.rect.height).sum();
    assert!((total - 165.0).abs() < 1e-9);
    assert!(document.weeks[2].rect.height > document.weeks[0].rect.height);
}

#[test]
fn document_file_name_collapses_whitespace() {
    assert_eq!(document_file_name("Q3  Launch - May 2025"), "q3-launch---may-2025.pdf");
}
