use std::io::{self, Write};

use chrono::{Local, NaiveDate};
use plan_it::calendar::{WEEKDAY_LABELS, next_month, previous_month};
use plan_it::export::{
    self, MonthKey, build_sheet_calendar, calendar_frame, document_layout, due_dates_by_assignee,
    task_list_frame, tasks_due_in_month,
};
use plan_it::gesture::{CellGeometry, GestureMode, GestureOutcome, PointerPosition};
use plan_it::persistence::{CsvFileStore, JsonFileStore, TaskStore};
use plan_it::project::sample_snapshot;
use plan_it::{AppConfig, MonthLayout, NewTask, Planner, TaskPatch, logging};
use polars::prelude::{AnyValue, DataFrame};

const DEFAULT_GRID_WIDTH: f64 = 700.0;

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let cell_text = |av: AnyValue| match av {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        other => other.to_string(),
    };

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|col| col.get(row_idx).map(cell_text).unwrap_or_default())
            .collect();
        cells.push(row);
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.chars().count()).collect();
    for row in &cells {
        for (ci, s) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(s.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let format_row = |values: &[String]| {
        let mut line = String::from("|");
        for (ci, s) in values.iter().enumerate() {
            let pad = widths[ci].saturating_sub(s.chars().count());
            line.push(' ');
            line.push_str(s);
            line.push_str(&" ".repeat(pad));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&format_row(&col_names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        out.push_str(&format_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn render_month(month: &MonthLayout, visible: usize, total: usize) -> String {
    let mut out = format!("{} ({visible} of {total} tasks)\n", month.window.title());
    for week in &month.weeks {
        out.push_str(&format!(
            "Week {}: {} - {}\n",
            week.index + 1,
            week.week.first().format("%b %-d"),
            week.week.last().format("%b %-d")
        ));
        for (row, placements) in week.rows.iter().enumerate() {
            for placement in placements {
                let first = WEEKDAY_LABELS[placement.position.start_column];
                let last =
                    WEEKDAY_LABELS[placement.position.start_column + placement.position.span - 1];
                out.push_str(&format!(
                    "  row {row} [{first}-{last}] {}{} ({}, {}){}\n",
                    if placement.continues_before { "< " } else { "" },
                    placement.task.name,
                    placement.task.id,
                    placement.task.assignee,
                    if placement.continues_after { " >" } else { "" },
                ));
            }
        }
    }
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                                   Show this help\n  show                                   Show the current month\n  month <YYYY-MM-DD> | next | prev | today\n                                         Change the viewed month\n  sample                                 Load the sample project\n  add <start> <end> <name...>            Add a task (dates YYYY-MM-DD)\n  rename <id> <name...>                  Rename a task\n  assign <id> <assignee...>              Set the assignee\n  color <id> <#rrggbb>                   Set the color\n  start|end <id> <YYYY-MM-DD>            Set start or end date\n  duration <id> <days>                   Set inclusive duration\n  move|resize-left|resize-right <id> <days>\n                                         Shift by whole days\n  drag <id> <mode> <dx> <dy> [grid_width]\n                                         Simulate a pointer gesture in pixels\n  delete <id>                            Delete a task\n  undo                                   Undo the last change\n  filter [assignee...]                   Filter by assignee (no argument clears)\n  assignees                              List assignees\n  list                                   Task list\n  sheet                                  Spreadsheet layout of the viewed month\n  doc                                    Document layout summary\n  sync                                   Spreadsheet sync payload\n  save [json|csv|sqlite <path>]          Save to the configured or given store\n  load [json|csv|sqlite <path>]          Load from the configured or given store\n  quit|exit                              Exit"
    );
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
}

fn rest_of_line<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.collect::<Vec<_>>().join(" ")
}

fn explicit_store(
    kind: Option<&str>,
    path: Option<&str>,
) -> Result<Option<Box<dyn TaskStore>>, String> {
    match (kind, path) {
        (None, _) => Ok(None),
        (Some("json"), Some(path)) => Ok(Some(Box::new(JsonFileStore::new(path)))),
        (Some("csv"), Some(path)) => Ok(Some(Box::new(CsvFileStore::new(path)))),
        #[cfg(feature = "sqlite")]
        (Some("sqlite"), Some(path)) => plan_it::persistence::sqlite::SqliteTaskStore::new(path)
            .map(|store| Some(Box::new(store) as Box<dyn TaskStore>))
            .map_err(|e| e.to_string()),
        _ => Err("Usage: save|load [json|csv|sqlite <path>]".to_string()),
    }
}

fn main() {
    let config = match AppConfig::load(None) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {e}");
            AppConfig::default()
        }
    };
    if let Err(e) = logging::init_logging(&config.log_level, config.log_dir_str().as_deref()) {
        eprintln!("Logging disabled: {e}");
    }

    let mut planner = Planner::new();
    let mut viewing = Local::now().date_naive();

    println!("Plan It! (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => {
                let month = planner.layout(viewing);
                print!(
                    "{}",
                    render_month(&month, planner.visible_count(), planner.tasks().len())
                );
            }
            "month" => match parse_date(parts.next()) {
                Some(date) => {
                    viewing = date;
                    println!("Viewing {}", planner.layout(viewing).window.title());
                }
                None => println!("Usage: month <YYYY-MM-DD>"),
            },
            "next" | "prev" | "today" => {
                viewing = match cmd {
                    "next" => next_month(viewing),
                    "prev" => previous_month(viewing),
                    _ => Local::now().date_naive(),
                };
                println!("Viewing {}", planner.layout(viewing).window.title());
            }
            "sample" => match planner.replace_snapshot(sample_snapshot()) {
                Ok(()) => {
                    viewing = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap_or(viewing);
                    println!("Loaded sample project with {} tasks.", planner.tasks().len());
                }
                Err(e) => println!("Error: {e}"),
            },
            "add" => {
                let start = parse_date(parts.next());
                let end = parse_date(parts.next());
                let name = rest_of_line(parts);
                match (start, end) {
                    (Some(start), Some(end)) if !name.is_empty() => {
                        match planner.add_task(NewTask::new(name, start, end)) {
                            Ok(task) => println!("Added task {} ({} - {}).", task.id, task.start_date, task.end_date),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: add <start> <end> <name...>"),
                }
            }
            "rename" | "assign" | "color" => {
                let Some(id) = parts.next() else {
                    println!("Usage: {cmd} <id> <value...>");
                    continue;
                };
                let value = rest_of_line(parts);
                let patch = match cmd {
                    "rename" => TaskPatch {
                        name: Some(value),
                        ..TaskPatch::default()
                    },
                    "assign" => TaskPatch {
                        assignee: Some(value),
                        ..TaskPatch::default()
                    },
                    _ => TaskPatch {
                        color: Some(value),
                        ..TaskPatch::default()
                    },
                };
                match planner.update_task(id, &patch) {
                    Ok(task) => println!("Updated task {}.", task.id),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "start" | "end" => {
                let id = parts.next();
                let date = parse_date(parts.next());
                match (id, date) {
                    (Some(id), Some(date)) => {
                        let result = if cmd == "start" {
                            planner.set_start_date(id, date)
                        } else {
                            planner.set_end_date(id, date)
                        };
                        match result {
                            Ok(task) => println!("Task {} now {} - {}.", task.id, task.start_date, task.end_date),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: {cmd} <id> <YYYY-MM-DD>"),
                }
            }
            "duration" => {
                let id = parts.next();
                let days = parts.next().and_then(|s| s.parse::<i64>().ok());
                match (id, days) {
                    (Some(id), Some(days)) => match planner.set_duration(id, days) {
                        Ok(task) => println!("Task {} now {} - {}.", task.id, task.start_date, task.end_date),
                        Err(e) => println!("Error: {e}"),
                    },
                    _ => println!("Usage: duration <id> <days>"),
                }
            }
            "move" | "resize-left" | "resize-right" => {
                let id = parts.next();
                let days = parts.next().and_then(|s| s.parse::<i64>().ok());
                let mode = GestureMode::parse(cmd).unwrap_or(GestureMode::Move);
                match (id, days) {
                    (Some(id), Some(days)) => match planner.shift_task(id, mode, days) {
                        Ok(task) => println!("Task {} now {} - {}.", task.id, task.start_date, task.end_date),
                        Err(e) => println!("Error: {e}"),
                    },
                    _ => println!("Usage: {cmd} <id> <days>"),
                }
            }
            "drag" => {
                let id = parts.next();
                let mode = parts.next().and_then(GestureMode::parse);
                let dx = parts.next().and_then(|s| s.parse::<f64>().ok());
                let dy = parts.next().and_then(|s| s.parse::<f64>().ok());
                let width = parts
                    .next()
                    .and_then(|s| s.parse::<f64>().ok())
                    .unwrap_or(DEFAULT_GRID_WIDTH);
                let (Some(id), Some(mode), Some(dx), Some(dy)) = (id, mode, dx, dy) else {
                    println!("Usage: drag <id> <move|left|right> <dx> <dy> [grid_width]");
                    continue;
                };
                let geometry = CellGeometry::from_grid(width, None);
                if !planner.begin_gesture(id, mode, PointerPosition::default(), geometry) {
                    println!("Error: task {id} not found");
                    continue;
                }
                let release = PointerPosition::new(dx, dy);
                if let Some(label) = planner.update_gesture(release).and_then(|p| p.label()) {
                    println!("Preview: {label}");
                }
                match planner.end_gesture(release) {
                    Ok(Some(GestureOutcome::Commit(preview))) => println!(
                        "Task {} now {} - {}.",
                        preview.task_id, preview.start_date, preview.end_date
                    ),
                    Ok(_) => println!("No change."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "delete" => match parts.next() {
                Some(id) => match planner.delete_task(id) {
                    Ok(task) => println!("Deleted task {}.", task.id),
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: delete <id>"),
            },
            "undo" => {
                if planner.undo() {
                    println!("Undone. {} more change(s) can be undone.", planner.undo_depth());
                } else {
                    println!("Nothing to undo.");
                }
            }
            "filter" => {
                let assignee = rest_of_line(parts);
                planner.set_assignee_filter(Some(assignee));
                match planner.assignee_filter() {
                    Some(a) => println!(
                        "Showing {} of {} tasks for {a}.",
                        planner.visible_count(),
                        planner.tasks().len()
                    ),
                    None => println!("Showing all {} tasks.", planner.tasks().len()),
                }
            }
            "assignees" => {
                for assignee in planner.assignees() {
                    println!("{assignee}");
                }
            }
            "list" => match task_list_frame(&planner.visible_tasks()) {
                Ok(df) => println!("{}", render_df_as_text_table(&df)),
                Err(e) => println!("Error: {e}"),
            },
            "sheet" => {
                let tasks = planner.visible_tasks();
                let key = MonthKey::of(viewing);
                let frame = build_sheet_calendar(&tasks, &planner.project().name, key, 1)
                    .and_then(|calendar| calendar_frame(&calendar));
                match frame {
                    Ok(df) => println!("{}", render_df_as_text_table(&df)),
                    Err(e) => {
                        println!("Error: {e}");
                        continue;
                    }
                }
                println!("Due in {}:", key.tab_name());
                for group in due_dates_by_assignee(tasks_due_in_month(&tasks, key)) {
                    println!("  {}", group.assignee);
                    for due in &group.tasks {
                        println!("    {} - {}", due.name, due.label());
                    }
                }
            }
            "doc" => {
                let month = planner.layout(viewing);
                let doc = document_layout(&month, &planner.project().name, Local::now().date_naive());
                println!(
                    "{}\n{} weeks, {} bars, file {}",
                    doc.title,
                    doc.weeks.len(),
                    doc.bars.len(),
                    doc.file_name
                );
            }
            "sync" => {
                let payload =
                    export::SyncPayload::new(planner.project(), planner.tasks().as_slice(), viewing);
                match payload.to_json() {
                    Ok(json) => println!("{json}"),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "save" | "load" => {
                let explicit = match explicit_store(parts.next(), parts.next()) {
                    Ok(store) => store,
                    Err(usage) => {
                        println!("{usage}");
                        continue;
                    }
                };
                let configured = match &explicit {
                    Some(_) => None,
                    None => match config.store.open() {
                        Ok(store) => Some(store),
                        Err(e) => {
                            println!("Error: {e}");
                            continue;
                        }
                    },
                };
                let store: &dyn TaskStore = match (&explicit, &configured) {
                    (Some(store), _) => store.as_ref(),
                    (None, Some(store)) => store.as_ref(),
                    (None, None) => continue,
                };
                if cmd == "save" {
                    match planner.save(store) {
                        Ok(()) => println!("Saved {} tasks.", planner.tasks().len()),
                        Err(e) => println!("Error: {e}"),
                    }
                } else {
                    match store.load_snapshot() {
                        Ok(Some(snapshot)) => match planner.replace_snapshot(snapshot) {
                            Ok(()) => println!("Project loaded with {} tasks.", planner.tasks().len()),
                            Err(e) => println!("Error: {e}"),
                        },
                        Ok(None) => println!("Nothing saved yet."),
                        Err(e) => println!("Error: {e}"),
                    }
                }
            }
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
