use std::collections::HashSet;
use std::time::{Duration, Instant};

use super::classify::{classify_all, highlight_tag, DisplayTags};
use super::data::{flip_deleted, Column, UnifiedRow};

/// Two presses on the same cell closer together than this are a double-click
pub const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);

/// A press on one table cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPress {
    pub row: usize,
    pub column: Column,
    pub at: Instant,
}

/// Whether `current` completes a double-click started by `previous`
pub fn is_double_click(previous: Option<CellPress>, current: CellPress) -> bool {
    match previous {
        Some(previous) => {
            previous.row == current.row
                && previous.column == current.column
                && current.at.saturating_duration_since(previous.at) <= DOUBLE_CLICK_WINDOW
        }
        None => false,
    }
}

/// One rendered row with its computed tags
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub row: UnifiedRow,
    pub tags: DisplayTags,
}

/// A pending deletion-flag flip for one displayed row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleRequest {
    /// Result set the request was issued against
    pub generation: u64,
    pub index: usize,
    pub disk_no: String,
    pub file_name: String,
    pub new_value: String,
}

/// The result set currently shown in the pop-up.
///
/// Owned by the UI loop. Each `replace` bumps the generation, so toggles
/// finishing after a newer search can be recognized and dropped.
#[derive(Debug, Default)]
pub struct ResultSet {
    rows: Vec<DisplayRow>,
    /// Row most recently toggled to "1" in this result set
    marker: Option<usize>,
    /// Rows whose deletion-flag write has not finished yet
    pending: HashSet<usize>,
    /// Last cell press, for double-click detection
    last_press: Option<CellPress>,
    generation: u64,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Throw away the current rows and marker, classify and store the new ones
    pub fn replace(&mut self, rows: Vec<UnifiedRow>) {
        let tags = classify_all(&rows);
        self.rows = rows
            .into_iter()
            .zip(tags)
            .map(|(row, tags)| DisplayRow { row, tags })
            .collect();
        self.marker = None;
        self.pending.clear();
        self.last_press = None;
        self.generation += 1;
    }

    /// Replace everything with a single error row
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.replace(vec![UnifiedRow::error(message)]);
    }

    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn marker(&self) -> Option<usize> {
        self.marker
    }

    pub fn is_pending(&self, index: usize) -> bool {
        self.pending.contains(&index)
    }

    /// Record a press on a cell. Returns true when it completes a double-click.
    pub fn press(&mut self, row: usize, column: Column, at: Instant) -> bool {
        let current = CellPress { row, column, at };
        if is_double_click(self.last_press, current) {
            // A third press starts over instead of forming another double-click
            self.last_press = None;
            true
        } else {
            self.last_press = Some(current);
            false
        }
    }

    /// Decide whether a double-click on (row, column) should toggle.
    ///
    /// Only the is_deleted cell of a row with both disk_no and file_name
    /// qualifies, and only when its value is "0" or "1" and no earlier
    /// toggle of the row is still being written. A returned request marks
    /// the row pending until `apply_toggle` or `fail_toggle`.
    pub fn toggle_request(&mut self, index: usize, column: Column) -> Option<ToggleRequest> {
        if column != Column::IsDeleted || self.pending.contains(&index) {
            return None;
        }

        let row = &self.rows.get(index)?.row;
        if !row.is_mutable() {
            return None;
        }

        let new_value = flip_deleted(&row.is_deleted)?;
        let request = ToggleRequest {
            generation: self.generation,
            index,
            disk_no: row.disk_no.clone(),
            file_name: row.file_name.clone(),
            new_value: new_value.to_string(),
        };

        self.pending.insert(index);
        Some(request)
    }

    /// Release a row whose write failed, leaving its value untouched
    pub fn fail_toggle(&mut self, request: &ToggleRequest) {
        if request.generation == self.generation {
            self.pending.remove(&request.index);
        }
    }

    /// Patch the displayed row after the database accepted the toggle.
    ///
    /// Returns false, changing nothing, when the request belongs to an
    /// older result set.
    pub fn apply_toggle(&mut self, request: &ToggleRequest) -> bool {
        if request.generation != self.generation {
            return false;
        }
        self.pending.remove(&request.index);

        let Some(display) = self.rows.get_mut(request.index) else {
            return false;
        };
        if display.row.disk_no != request.disk_no || display.row.file_name != request.file_name {
            return false;
        }

        display.row.is_deleted = request.new_value.clone();
        display.tags.highlighted = highlight_tag(&display.row);

        if display.tags.highlighted {
            self.marker = Some(request.index);
        } else if self.marker == Some(request.index) {
            self.marker = None;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::catalog::tests::sample_catalog;
    use crate::state::classify::CategoryTag;
    use crate::state::data::{QuickFileRecord, ResourceRecord, SearchTerm};

    fn resource(disk_no: &str, file_name: &str, is_deleted: &str) -> UnifiedRow {
        UnifiedRow::from(ResourceRecord {
            disk_no: disk_no.into(),
            category2: "AV".into(),
            file_name: file_name.into(),
            is_deleted: is_deleted.into(),
            ..Default::default()
        })
    }

    fn quick(file_name: &str) -> UnifiedRow {
        UnifiedRow::from(QuickFileRecord {
            file_name: file_name.into(),
            file_size: "1".into(),
            file_link: "https://example.com".into(),
        })
    }

    #[test]
    fn test_only_is_deleted_column_toggles() {
        let mut results = ResultSet::new();
        results.replace(vec![resource("1", "a.mp4", "0")]);

        for column in Column::ALL {
            let request = results.toggle_request(0, column);
            assert_eq!(request.is_some(), column == Column::IsDeleted, "{:?}", column);
        }
    }

    #[test]
    fn test_rows_without_key_do_not_toggle() {
        let mut results = ResultSet::new();
        results.replace(vec![
            quick("q.mkv"),
            resource("", "a.mp4", "0"),
            resource("1", "", "0"),
            UnifiedRow::error("Query failed: boom"),
        ]);

        for index in 0..results.len() {
            assert!(results.toggle_request(index, Column::IsDeleted).is_none());
        }
        assert!(results.toggle_request(99, Column::IsDeleted).is_none());
    }

    #[test]
    fn test_unknown_flag_value_does_not_toggle() {
        let mut results = ResultSet::new();
        results.replace(vec![resource("1", "a.mp4", "maybe")]);
        assert!(results.toggle_request(0, Column::IsDeleted).is_none());
    }

    #[test]
    fn test_only_one_marker_at_a_time() {
        let mut results = ResultSet::new();
        results.replace(vec![resource("1", "a.mp4", "0"), resource("1", "b.mp4", "0")]);

        let first = results.toggle_request(0, Column::IsDeleted).unwrap();
        assert!(results.apply_toggle(&first));
        assert_eq!(results.marker(), Some(0));

        let second = results.toggle_request(1, Column::IsDeleted).unwrap();
        assert!(results.apply_toggle(&second));
        assert_eq!(results.marker(), Some(1));

        // Row 0 keeps its value and highlight, only the marker moved
        assert_eq!(results.rows()[0].row.is_deleted, "1");
        assert!(results.rows()[0].tags.highlighted);
    }

    #[test]
    fn test_toggling_marked_row_back_clears_marker() {
        let mut results = ResultSet::new();
        results.replace(vec![resource("1", "a.mp4", "0")]);

        let on = results.toggle_request(0, Column::IsDeleted).unwrap();
        results.apply_toggle(&on);
        let off = results.toggle_request(0, Column::IsDeleted).unwrap();
        assert_eq!(off.new_value, "0");
        results.apply_toggle(&off);

        assert_eq!(results.marker(), None);
        assert_eq!(results.rows()[0].row.is_deleted, "0");
        assert!(!results.rows()[0].tags.highlighted);
        assert_eq!(results.rows()[0].tags.category, Some(CategoryTag::ContainsAv));
    }

    #[test]
    fn test_replace_clears_marker_and_drops_stale_toggles() {
        let mut results = ResultSet::new();
        results.replace(vec![resource("1", "a.mp4", "0")]);
        let request = results.toggle_request(0, Column::IsDeleted).unwrap();
        results.apply_toggle(&request);
        assert_eq!(results.marker(), Some(0));

        let stale = results.toggle_request(0, Column::IsDeleted).unwrap();
        results.replace(vec![resource("1", "a.mp4", "1")]);
        assert_eq!(results.marker(), None);

        assert!(!results.apply_toggle(&stale));
        assert_eq!(results.rows()[0].row.is_deleted, "1");
    }

    #[test]
    fn test_row_is_locked_while_its_toggle_is_written() {
        let (_dir, catalog) = sample_catalog();
        let term = SearchTerm::parse("ABC123_clip").unwrap();
        let mut results = ResultSet::new();
        results.replace(catalog.lookup(&term));

        let first = results.toggle_request(0, Column::IsDeleted).unwrap();
        assert!(results.is_pending(0));
        // Second double-click before the first write lands
        assert!(results.toggle_request(0, Column::IsDeleted).is_none());

        catalog
            .set_deleted(&first.disk_no, &first.file_name, &first.new_value)
            .unwrap();
        assert!(results.apply_toggle(&first));
        assert!(!results.is_pending(0));

        let second = results.toggle_request(0, Column::IsDeleted).unwrap();
        catalog
            .set_deleted(&second.disk_no, &second.file_name, &second.new_value)
            .unwrap();
        results.apply_toggle(&second);

        assert_eq!(results.rows()[0].row.is_deleted, "0");
        assert_eq!(catalog.search(&term).unwrap()[0].is_deleted, "0");
    }

    #[test]
    fn test_failed_toggle_releases_row() {
        let mut results = ResultSet::new();
        results.replace(vec![resource("1", "a.mp4", "0")]);

        let request = results.toggle_request(0, Column::IsDeleted).unwrap();
        results.fail_toggle(&request);

        assert!(!results.is_pending(0));
        assert_eq!(results.rows()[0].row.is_deleted, "0");
        assert_eq!(results.toggle_request(0, Column::IsDeleted).unwrap().new_value, "1");
    }

    #[test]
    fn test_replace_releases_pending_rows() {
        let mut results = ResultSet::new();
        results.replace(vec![resource("1", "a.mp4", "0")]);
        results.toggle_request(0, Column::IsDeleted).unwrap();

        results.replace(vec![resource("1", "a.mp4", "1")]);
        assert!(!results.is_pending(0));
        assert!(results.toggle_request(0, Column::IsDeleted).is_some());
    }

    #[test]
    fn test_double_click_same_cell_within_window() {
        let start = Instant::now();
        let first = CellPress { row: 2, column: Column::IsDeleted, at: start };
        let second = CellPress { at: start + Duration::from_millis(250), ..first };

        assert!(is_double_click(Some(first), second));
        assert!(!is_double_click(None, second));
    }

    #[test]
    fn test_double_click_same_cell_too_slow() {
        let start = Instant::now();
        let first = CellPress { row: 2, column: Column::IsDeleted, at: start };
        let second = CellPress { at: start + DOUBLE_CLICK_WINDOW + Duration::from_millis(1), ..first };

        assert!(!is_double_click(Some(first), second));
    }

    #[test]
    fn test_double_click_needs_same_cell() {
        let start = Instant::now();
        let first = CellPress { row: 2, column: Column::IsDeleted, at: start };
        let other_row = CellPress { row: 3, ..first };
        let other_column = CellPress { column: Column::FileName, ..first };

        assert!(!is_double_click(Some(first), other_row));
        assert!(!is_double_click(Some(first), other_column));
    }

    #[test]
    fn test_press_tracks_pairs_and_resets_on_replace() {
        let mut results = ResultSet::new();
        results.replace(vec![resource("1", "a.mp4", "0")]);
        let start = Instant::now();
        let soon = start + Duration::from_millis(100);

        assert!(!results.press(0, Column::IsDeleted, start));
        assert!(results.press(0, Column::IsDeleted, soon));
        // Third press starts a new pair
        assert!(!results.press(0, Column::IsDeleted, soon));

        results.replace(vec![resource("1", "a.mp4", "0")]);
        assert!(!results.press(0, Column::IsDeleted, soon));
    }

    #[test]
    fn test_show_error_replaces_rows() {
        let mut results = ResultSet::new();
        results.replace(vec![resource("1", "a.mp4", "0"), quick("b.mkv")]);
        results.show_error("Update failed: disk I/O error");

        assert_eq!(results.len(), 1);
        assert!(results.rows()[0].row.is_error());
    }

    #[test]
    fn test_copy_lookup_toggle_end_to_end() {
        let (_dir, catalog) = sample_catalog();
        let term = SearchTerm::parse("  ABC123_clip  ").unwrap();

        let mut results = ResultSet::new();
        results.replace(catalog.lookup(&term));
        assert_eq!(results.len(), 1);

        let shown = &results.rows()[0];
        assert_eq!(shown.row.disk_no, "7");
        assert_eq!(shown.row.file_path, "D:/clips");
        assert_eq!(shown.row.file_link, "");
        assert_eq!(shown.tags.category, Some(CategoryTag::Contains4k));
        assert!(!shown.tags.highlighted);

        let request = results.toggle_request(0, Column::IsDeleted).unwrap();
        catalog
            .set_deleted(&request.disk_no, &request.file_name, &request.new_value)
            .unwrap();
        assert!(results.apply_toggle(&request));

        let shown = &results.rows()[0];
        assert_eq!(shown.row.is_deleted, "1");
        assert!(shown.tags.highlighted);
        assert_eq!(shown.tags.category, Some(CategoryTag::Contains4k));

        let stored = catalog.search(&term).unwrap();
        assert_eq!(stored[0].is_deleted, "1");
    }
}
