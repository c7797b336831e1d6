//! Printable month document geometry, in millimetres on an A4 landscape page.

use super::color::contrast_text_color;
use crate::calendar::{DAYS_PER_WEEK, WEEKDAY_LABELS};
use crate::layout::MonthLayout;
use chrono::NaiveDate;
use serde::Serialize;

pub const PAGE_WIDTH_MM: f64 = 297.0;
pub const PAGE_HEIGHT_MM: f64 = 210.0;
pub const TITLE_ORIGIN_MM: (f64, f64) = (14.0, 15.0);
pub const GRID_ORIGIN_MM: (f64, f64) = (10.0, 25.0);
pub const GRID_WIDTH_MM: f64 = PAGE_WIDTH_MM - 20.0;
pub const FOOTER_ORIGIN_MM: (f64, f64) = (14.0, 205.0);

const GRID_BOTTOM_MM: f64 = 198.0;
const HEADER_HEIGHT_MM: f64 = 8.0;
const BAR_GAP_MM: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentBar {
    pub task_id: String,
    pub name: String,
    pub rect: Rect,
    pub color: String,
    pub text_color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentWeek {
    pub rect: Rect,
    pub row_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentLayout {
    pub title: String,
    pub footer: String,
    pub file_name: String,
    pub header_cells: Vec<(String, Rect)>,
    pub weeks: Vec<DocumentWeek>,
    pub bars: Vec<DocumentBar>,
}

/// Page geometry for `month`. Each week gets one line for its dates plus one line per
/// task row (at least one), and the available height is shared out by line count.
pub fn document_layout(month: &MonthLayout, project_name: &str, generated_on: NaiveDate) -> DocumentLayout {
    let title = format!("{} - {}", project_name, month.window.title());
    let cell_width = GRID_WIDTH_MM / DAYS_PER_WEEK as f64;
    let (origin_x, origin_y) = GRID_ORIGIN_MM;

    let header_cells = WEEKDAY_LABELS
        .iter()
        .enumerate()
        .map(|(col, label)| {
            (
                (*label).to_string(),
                Rect {
                    x: origin_x + col as f64 * cell_width,
                    y: origin_y,
                    width: cell_width,
                    height: HEADER_HEIGHT_MM,
                },
            )
        })
        .collect();

    let lines: Vec<usize> = month
        .weeks
        .iter()
        .map(|week| 1 + week.row_count().max(1))
        .collect();
    let total_lines: usize = lines.iter().sum();
    let body_top = origin_y + HEADER_HEIGHT_MM;
    let line_height = if total_lines == 0 {
        0.0
    } else {
        (GRID_BOTTOM_MM - body_top) / total_lines as f64
    };

    let mut weeks = Vec::with_capacity(month.weeks.len());
    let mut bars = Vec::new();
    let mut y = body_top;
    for (week, line_count) in month.weeks.iter().zip(&lines) {
        let height = *line_count as f64 * line_height;
        weeks.push(DocumentWeek {
            rect: Rect {
                x: origin_x,
                y,
                width: GRID_WIDTH_MM,
                height,
            },
            row_count: week.row_count(),
        });

        for placement in week.placements() {
            let position = placement.position;
            bars.push(DocumentBar {
                task_id: placement.task.id.clone(),
                name: placement.task.name.clone(),
                rect: Rect {
                    x: origin_x + position.start_column as f64 * cell_width + BAR_GAP_MM,
                    y: y + (1 + position.row) as f64 * line_height + BAR_GAP_MM / 2.0,
                    width: position.span as f64 * cell_width - 2.0 * BAR_GAP_MM,
                    height: line_height - BAR_GAP_MM,
                },
                color: placement.task.color.clone(),
                text_color: contrast_text_color(&placement.task.color),
            });
        }
        y += height;
    }

    DocumentLayout {
        file_name: document_file_name(&title),
        footer: format!("Generated on {}", generated_on.format("%-m/%-d/%Y")),
        title,
        header_cells,
        weeks,
        bars,
    }
}

/// `Marketing Campaign - July 2024` becomes `marketing-campaign---july-2024.pdf`.
pub fn document_file_name(title: &str) -> String {
    let mut slug = String::with_capacity(title.len() + 4);
    let mut in_whitespace = false;
    for ch in title.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
        } else {
            slug.extend(ch.to_lowercase());
            in_whitespace = false;
        }
    }
    slug.push_str(".pdf");
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::layout;
    use crate::task::Task;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
    }

    #[test]
    fn file_name_collapses_whitespace_runs() {
        assert_eq!(
            document_file_name("Marketing Campaign - July 2024"),
            "marketing-campaign---july-2024.pdf"
        );
        assert_eq!(document_file_name("Q3  Plan"), "q3-plan.pdf");
    }

    #[test]
    fn bars_stay_inside_grid() {
        let tasks = vec![
            Task::new("a", "A", d(2), d(4)),
            Task::new("b", "B", d(3), d(3)),
            Task::new("c", "C", d(28), d(31)),
        ];
        let doc = document_layout(&layout(&tasks, d(1)), "Plan", d(1));
        assert_eq!(doc.title, "Plan - July 2024");
        assert_eq!(doc.footer, "Generated on 7/1/2024");
        assert_eq!(doc.bars.len(), 3);
        for bar in &doc.bars {
            assert!(bar.rect.x >= GRID_ORIGIN_MM.0);
            assert!(bar.rect.x + bar.rect.width <= GRID_ORIGIN_MM.0 + GRID_WIDTH_MM);
            assert!(bar.rect.y + bar.rect.height <= GRID_BOTTOM_MM + 1e-9);
        }
        let last = doc.weeks.last().unwrap();
        assert!((last.rect.y + last.rect.height - GRID_BOTTOM_MM).abs() < 1e-9);
    }
}
