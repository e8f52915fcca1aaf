/// Row classification for display emphasis
///
/// Each result row gets at most one category tag derived from its
/// `category2` field, plus an independent highlight flag when the row is
/// marked deleted. Tags are recomputed for every result set.

use serde::{Deserialize, Serialize};

use super::data::UnifiedRow;

/// Category-derived tag, first matching rule wins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryTag {
    Contains4k,
    ContainsMosaic,
    ContainsAv,
    ContainsIdol,
    /// No recognized category, and no 4K row seen earlier in the result set
    EmptyCategory,
}

/// Everything the table needs to style one row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayTags {
    pub category: Option<CategoryTag>,
    /// is_deleted is exactly "1"
    pub highlighted: bool,
}

/// Which tag wins the row background when a row is both highlighted and categorized
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TagPrecedence {
    #[default]
    HighlightFirst,
    CategoryFirst,
}

/// Which style a row is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStyle {
    Plain,
    Highlighted,
    Category(CategoryTag),
}

impl DisplayTags {
    /// Resolve the two tags into the single style the row is drawn with
    pub fn style(&self, precedence: TagPrecedence) -> RowStyle {
        match (precedence, self.highlighted, self.category) {
            (TagPrecedence::HighlightFirst, true, _) => RowStyle::Highlighted,
            (TagPrecedence::CategoryFirst, _, Some(tag)) => RowStyle::Category(tag),
            (_, true, None) => RowStyle::Highlighted,
            (_, _, Some(tag)) => RowStyle::Category(tag),
            (_, false, None) => RowStyle::Plain,
        }
    }
}

/// Sequential classifier for one result set.
///
/// Carries the "seen a 4K row" flag from row to row, so rows must be fed
/// in display order and a fresh classifier used per result set.
#[derive(Debug, Default)]
pub struct Classifier {
    seen_4k: bool,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag the next row of the pass
    pub fn classify(&mut self, row: &UnifiedRow) -> DisplayTags {
        DisplayTags {
            category: self.category_tag(&row.category2),
            highlighted: highlight_tag(row),
        }
    }

    fn category_tag(&mut self, category2: &str) -> Option<CategoryTag> {
        let category = category2.to_uppercase();

        if category.contains("4K") {
            self.seen_4k = true;
            Some(CategoryTag::Contains4k)
        } else if category.contains("MOSAIC") {
            Some(CategoryTag::ContainsMosaic)
        } else if category.contains("AV") {
            Some(CategoryTag::ContainsAv)
        } else if category.contains("IDOL") || category.contains("REBD") {
            Some(CategoryTag::ContainsIdol)
        } else if !self.seen_4k {
            Some(CategoryTag::EmptyCategory)
        } else {
            None
        }
    }
}

/// Recompute only the highlight flag (after a toggle)
pub fn highlight_tag(row: &UnifiedRow) -> bool {
    row.is_deleted == "1"
}

/// Tag a whole result set in order
pub fn classify_all(rows: &[UnifiedRow]) -> Vec<DisplayTags> {
    let mut classifier = Classifier::new();
    rows.iter().map(|row| classifier.classify(row)).collect()
}
