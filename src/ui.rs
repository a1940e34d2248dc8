use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Text},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, Wrap},
};

use crate::model::{HeaderView, Model, UIData};
use crate::state::SortDirection;
use crate::view::SelectAll;

pub const CHECKBOX_WIDTH: usize = 3;
pub const COLUMN_WIDTH_MARGIN: usize = 2;
pub const BORDER_WIDTH: usize = 2;
pub const STATUSLINE_HEIGHT: u16 = 1;
pub const FOOTER_HEIGHT: u16 = 1;

#[derive(Debug, Default)]
pub struct TableUI;

impl TableUI {
    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let [table_area, footer_area, status_area] = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(FOOTER_HEIGHT),
            Constraint::Length(STATUSLINE_HEIGHT),
        ])
        .areas(frame.area());

        frame.render_widget(Self::table(uidata), table_area);
        frame.render_widget(Self::footer(uidata), footer_area);
        frame.render_widget(
            Paragraph::new(uidata.status_message.as_str()).dark_gray(),
            status_area,
        );

        if uidata.show_popup {
            Self::popup(uidata, frame);
        }
    }

    fn table(uidata: &UIData) -> Table<'_> {
        let checkbox = match uidata.select_all {
            SelectAll::None => "[ ]",
            SelectAll::Some => "[-]",
            SelectAll::All => "[x]",
        };
        let header = Row::new(
            std::iter::once(Cell::from(checkbox)).chain(
                uidata
                    .headers
                    .iter()
                    .enumerate()
                    .map(|(cidx, h)| Self::header_cell(h, cidx == uidata.selected_column)),
            ),
        )
        .bold()
        .underlined();

        let mut rows: Vec<Row> = uidata
            .rows
            .iter()
            .enumerate()
            .map(|(ridx, row)| {
                let mark = if row.selected { "[x]" } else { "[ ]" };
                let cells = std::iter::once(Cell::from(mark)).chain(
                    row.cells.iter().zip(uidata.headers.iter()).map(|(c, h)| {
                        let line = Line::from(c.as_str());
                        Cell::from(if h.numeric {
                            line.alignment(Alignment::Right)
                        } else {
                            line
                        })
                    }),
                );
                let mut style = Style::default();
                if row.selected {
                    style = style.fg(ratatui::style::Color::Cyan);
                }
                if ridx == uidata.selected_row {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                Row::new(cells).style(style)
            })
            .collect();

        // Keep the page height constant on a short page beyond the first.
        if uidata.padding_rows > 0 {
            rows.push(Row::new(Vec::<Cell>::new()).height(uidata.padding_rows as u16));
        }

        let widths = std::iter::once(Constraint::Length(CHECKBOX_WIDTH as u16)).chain(
            uidata
                .headers
                .iter()
                .map(|h| Constraint::Length(h.width as u16)),
        );

        let title = Line::from(format!(" {} ", uidata.name).bold());
        Table::new(rows, widths).header(header).block(
            Block::bordered()
                .title(title.centered())
                .border_set(border::THICK),
        )
    }

    fn header_cell(header: &HeaderView, active: bool) -> Cell<'_> {
        let arrow = match header.sorted {
            Some(SortDirection::Ascending) => " ▲",
            Some(SortDirection::Descending) => " ▼",
            None => "",
        };
        let mut line = Line::from(format!("{}{}", header.label, arrow));
        if header.numeric {
            line = line.alignment(Alignment::Right);
        }
        if active {
            line = line.yellow();
        }
        Cell::from(line)
    }

    fn footer(uidata: &UIData) -> Paragraph<'_> {
        let line = Line::from(vec![
            format!("{} selected", uidata.selected_count).into(),
            "   Rows per page: ".into(),
            uidata.page_size.to_string().blue().bold(),
            "   ".into(),
            uidata.range_label.clone().into(),
            " ".into(),
        ]);
        Paragraph::new(line.right_aligned())
    }

    fn popup(uidata: &UIData, frame: &mut Frame) {
        let area = Self::centered(frame.area(), 60, 20);
        let block = Block::bordered()
            .title(Line::from(" Help ".bold()).centered())
            .title_bottom(Line::from(" <Esc> close ".blue()).centered())
            .border_set(border::THICK);
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(Text::from(uidata.popup_message.as_str()))
                .wrap(Wrap { trim: false })
                .block(block),
            area,
        );
    }

    fn centered(area: Rect, width: u16, height: u16) -> Rect {
        let [area] = Layout::horizontal([Constraint::Length(width)])
            .flex(Flex::Center)
            .areas(area);
        let [area] = Layout::vertical([Constraint::Length(height)])
            .flex(Flex::Center)
            .areas(area);
        area
    }
}
