use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::error::StoreError;

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// User-facing text for a failed store call. Duplicates get their own message
/// so the user knows which value to change.
pub(crate) fn describe_store_error(err: &StoreError, action: &str) -> String {
    match err {
        StoreError::Duplicate { field } => {
            format!("{field} already exists. Please enter a different value.")
        }
        other => format!("Failed to {action}: {other}"),
    }
}

/// Trim a cell to `max` characters, marking the cut with an ellipsis.
pub(crate) fn truncate_cell(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_errors_name_the_field() {
        let err = StoreError::Duplicate {
            field: "National ID",
        };
        assert_eq!(
            describe_store_error(&err, "save patient"),
            "National ID already exists. Please enter a different value."
        );
    }

    #[test]
    fn other_errors_interpolate_the_cause() {
        let err = StoreError::NotFound {
            entity: "Doctor",
            id: 4,
        };
        assert_eq!(
            describe_store_error(&err, "delete doctor"),
            "Failed to delete doctor: Doctor 4 not found"
        );
    }

    #[test]
    fn surface_error_prefers_the_root_cause() {
        let err = anyhow::anyhow!("disk full").context("failed to load patients");
        assert_eq!(surface_error(&err), "disk full");
    }

    #[test]
    fn truncate_cell_keeps_short_values() {
        assert_eq!(truncate_cell("short", 10), "short");
        assert_eq!(truncate_cell("a long address line", 6), "a lon…");
    }

    #[test]
    fn centered_rect_stays_inside_the_area() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(60, 40, area);
        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 20);
        assert!(popup.x >= area.x && popup.right() <= area.right());
    }
}
