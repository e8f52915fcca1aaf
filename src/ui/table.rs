/// Result table
/// Renders the current result set as an 8-column grid inside a scrollable.
/// Pressing a cell reports its (row, column) to the app, which pairs
/// presses into double-clicks.
use iced::widget::{self, container, mouse_area, scrollable, text};
use iced::{Background, Border, Color, Element, Length, Theme};

use crate::state::classify::{CategoryTag, RowStyle, TagPrecedence};
use crate::state::data::Column;
use crate::state::results::{DisplayRow, ResultSet};
use crate::Message;

const TEXT_SIZE: u16 = 13;

/// Background for each row style
fn background(style: RowStyle) -> Option<Color> {
    match style {
        RowStyle::Plain => None,
        RowStyle::Highlighted => Some(Color::from_rgb8(0xff, 0xd9, 0x66)),
        RowStyle::Category(tag) => Some(match tag {
            CategoryTag::Contains4k => Color::from_rgb8(0xcc, 0xe6, 0xff), // light blue
            CategoryTag::EmptyCategory => Color::from_rgb8(0xcc, 0xff, 0xcc), // light green
            CategoryTag::ContainsMosaic => Color::from_rgb8(0xff, 0xe5, 0xcc), // light orange
            CategoryTag::ContainsAv => Color::from_rgb8(0xe5, 0xcc, 0xff), // light purple
            CategoryTag::ContainsIdol => Color::from_rgb8(0xff, 0xff, 0xcc), // light yellow
        }),
    }
}

const MARKER_BORDER: Color = Color {
    r: 0.85,
    g: 0.2,
    b: 0.1,
    a: 1.0,
};
const ERROR_BACKGROUND: Color = Color {
    r: 1.0,
    g: 0.85,
    b: 0.85,
    a: 1.0,
};

/// Total width of all columns, used to stretch the error row
fn table_width() -> f32 {
    Column::ALL.iter().map(|c| c.width()).sum()
}

fn cell_style(background: Option<Color>, marked: bool) -> impl Fn(&Theme) -> container::Style {
    move |_theme: &Theme| container::Style {
        background: background.map(Background::Color),
        // Pastel rows need dark text regardless of theme
        text_color: background.map(|_| Color::BLACK),
        border: if marked {
            Border {
                color: MARKER_BORDER,
                width: 2.0,
                radius: 0.0.into(),
            }
        } else {
            Border::default()
        },
        ..container::Style::default()
    }
}

fn header<'a>() -> Element<'a, Message> {
    let cells = Column::ALL.into_iter().map(|column| {
        Element::from(
            container(text(column.header()).size(TEXT_SIZE))
                .width(Length::Fixed(column.width()))
                .padding([2, 4])
                .clip(true),
        )
    });

    widget::Row::with_children(cells).into()
}

fn data_row<'a>(
    index: usize,
    display: &'a DisplayRow,
    precedence: TagPrecedence,
    marked: bool,
) -> Element<'a, Message> {
    if display.row.is_error() {
        return container(text(&display.row.disk_no).size(TEXT_SIZE))
            .width(Length::Fixed(table_width()))
            .padding([2, 4])
            .style(cell_style(Some(ERROR_BACKGROUND), false))
            .into();
    }

    let bg = background(display.tags.style(precedence));

    let cells = Column::ALL.into_iter().map(|column| {
        let marked_cell = marked && column == Column::IsDeleted;
        let cell = container(text(display.row.value(column)).size(TEXT_SIZE))
            .width(Length::Fixed(column.width()))
            .padding([2, 4])
            .clip(true)
            .style(cell_style(bg, marked_cell));

        Element::from(
            mouse_area(cell).on_press(Message::CellPressed { row: index, column }),
        )
    });

    widget::Row::with_children(cells).into()
}

/// Build the whole table for the current results
pub fn view(results: &ResultSet, precedence: TagPrecedence) -> Element<'_, Message> {
    let rows = results.rows().iter().enumerate().map(|(index, display)| {
        data_row(index, display, precedence, results.marker() == Some(index))
    });

    let body = widget::Column::with_children(rows);

    scrollable(widget::column![header(), body])
        .direction(scrollable::Direction::Both {
            vertical: scrollable::Scrollbar::default(),
            horizontal: scrollable::Scrollbar::default(),
        })
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_a_color() {
        for tag in [
            CategoryTag::Contains4k,
            CategoryTag::ContainsMosaic,
            CategoryTag::ContainsAv,
            CategoryTag::ContainsIdol,
            CategoryTag::EmptyCategory,
        ] {
            assert!(background(RowStyle::Category(tag)).is_some());
        }
        assert!(background(RowStyle::Plain).is_none());
        assert_ne!(
            background(RowStyle::Highlighted),
            background(RowStyle::Category(CategoryTag::ContainsIdol))
        );
    }

    #[test]
    fn test_table_width_covers_all_columns() {
        assert_eq!(table_width(), 1120.0);
    }
}
