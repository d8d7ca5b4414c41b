use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Cell, Clear, Paragraph, Row, Table},
};
use tracing::trace;

use crate::domain::{CEConfig, CMDMode};
use crate::model::UIData;

pub const TITLE_HEIGHT: usize = 1;
pub const DROPZONE_HEIGHT: usize = 3;
pub const TABLE_HEADER_HEIGHT: usize = 1;
pub const ACTIONBAR_HEIGHT: usize = 1;
pub const CMDLINE_HEIGH: usize = 1;
pub const COLUMN_WIDTH_MARGIN: usize = 1;
pub const MIN_COLUMN_WIDTH: usize = 3;

const POPUP_WIDTH: u16 = 60;

#[derive(Debug)]
pub struct TableUI {
    frames: u64,
}

impl TableUI {
    pub fn new(_cfg: &CEConfig) -> Self {
        Self { frames: 0 }
    }

    pub fn draw(&mut self, uidata: &UIData, frame: &mut Frame) {
        self.frames += 1;
        trace!("Drawing frame {}", self.frames);
        let [title_area, drop_area, table_area, action_area, cmdline_area] = Layout::vertical([
            Constraint::Length(TITLE_HEIGHT as u16),
            Constraint::Length(DROPZONE_HEIGHT as u16),
            Constraint::Min(0),
            Constraint::Length(ACTIONBAR_HEIGHT as u16),
            Constraint::Length(CMDLINE_HEIGH as u16),
        ])
        .areas(frame.area());

        self.render_title(uidata, frame, title_area);
        self.render_dropzone(frame, drop_area);
        if uidata.show_table {
            self.render_table(uidata, frame, table_area);
        }
        self.render_actions(uidata, frame, action_area);
        self.render_cmdline(uidata, frame, cmdline_area);
        if uidata.show_popup {
            self.render_popup(&uidata.popup_message, frame);
        }
    }

    fn render_title(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let mut spans = vec![" CSV Editor ".bold().reversed()];
        if !uidata.name.is_empty() {
            spans.push(format!(" {} ", uidata.name).yellow());
            spans.push(format!("[{} rows x {} columns]", uidata.nrows, uidata.ncolumns).into());
        }
        let position = if uidata.show_table {
            Line::from(format!(
                "{}:{} ",
                uidata.abs_selected_row + 1,
                uidata.abs_selected_column + 1
            ))
            .right_aligned()
        } else {
            Line::default()
        };
        frame.render_widget(Line::from(spans), area);
        frame.render_widget(position, area);
    }

    fn render_dropzone(&self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::new().dark_gray());
        let text = Line::from(vec![
            "Open a CSV file: start with ".into(),
            "ce <file.csv>".blue().bold(),
            " or press ".into(),
            "<o>".blue().bold(),
        ]);
        frame.render_widget(Paragraph::new(text).centered().block(block), area);
    }

    fn render_table(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let editing = uidata.editing_cell();
        let index_width = uidata.index.width;

        let header = Row::new(
            std::iter::once(Cell::from(""))
                .chain(uidata.table.iter().map(|c| Cell::from(c.name.clone())))
                .collect::<Vec<Cell>>(),
        )
        .style(Style::new().bold().underlined());

        let rows = uidata
            .index
            .data
            .iter()
            .enumerate()
            .map(|(ridx, index)| {
                let mut cells = Vec::with_capacity(uidata.table.len() + 1);
                let index_style = if ridx == uidata.selected_row {
                    Style::new().yellow()
                } else {
                    Style::new().dark_gray()
                };
                cells.push(Cell::from(index.clone()).style(index_style));
                for (cidx, column) in uidata.table.iter().enumerate() {
                    let selected = ridx == uidata.selected_row && cidx == uidata.selected_column;
                    let content = if selected && editing {
                        input_window(&uidata.cmdinput.input, uidata.cmdinput.curser_pos, column.width).0
                    } else {
                        column.data.get(ridx).cloned().unwrap_or_default()
                    };
                    let style = match (selected, editing) {
                        (true, true) => Style::new().black().on_yellow(),
                        (true, false) => Style::new().reversed(),
                        _ => Style::new(),
                    };
                    cells.push(Cell::from(content).style(style));
                }
                Row::new(cells)
            })
            .collect::<Vec<Row>>();

        let widths = std::iter::once(Constraint::Length(index_width as u16))
            .chain(
                uidata
                    .table
                    .iter()
                    .map(|c| Constraint::Length(c.width as u16)),
            )
            .collect::<Vec<Constraint>>();

        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(1)
            .flex(Flex::Start);
        frame.render_widget(table, area);

        if editing && let Some(column) = uidata.table.get(uidata.selected_column) {
            let offset_x = index_width
                + 1
                + uidata.table[..uidata.selected_column]
                    .iter()
                    .map(|c| c.width + 1)
                    .sum::<usize>();
            let (_, cursor) =
                input_window(&uidata.cmdinput.input, uidata.cmdinput.curser_pos, column.width);
            let x = area.x + (offset_x + cursor) as u16;
            let y = area.y + (TABLE_HEADER_HEIGHT + uidata.selected_row) as u16;
            trace!("Edit cursor at {x}:{y}");
            frame.set_cursor_position((x, y));
        }
    }

    fn render_actions(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let actions = if uidata.show_table {
            vec![
                ("<a>", " Add New Row  "),
                ("<d>", " Delete Row  "),
                ("<s>", " Download CSV  "),
                ("<?>", " Help "),
            ]
        } else {
            vec![("<o>", " Open  "), ("<?>", " Help  "), ("<q>", " Quit ")]
        };
        let spans = actions
            .into_iter()
            .flat_map(|(key, label)| [key.blue().bold(), Span::from(label)])
            .collect::<Vec<Span>>();
        frame.render_widget(Line::from(spans).centered(), area);
    }

    fn render_cmdline(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        if uidata.active_cmdinput && uidata.cmd_mode == Some(CMDMode::Raw) {
            let width = (area.width as usize).saturating_sub(1);
            let (visible, cursor) =
                input_window(&uidata.cmdinput.input, uidata.cmdinput.curser_pos, width);
            frame.render_widget(Line::from(vec![":".bold(), visible.into()]), area);
            frame.set_cursor_position((area.x + 1 + cursor as u16, area.y));
        } else if uidata.editing_cell() {
            let line = Line::from(vec![
                " EDIT ".black().on_yellow(),
                format!(" row {} ", uidata.abs_selected_row + 1).into(),
                "<Enter>".blue().bold(),
                " commit ".into(),
                "<Esc>".blue().bold(),
                " cancel".into(),
            ]);
            frame.render_widget(line, area);
        } else {
            frame.render_widget(Line::from(uidata.status_message.as_str()).italic(), area);
        }
    }

    fn render_popup(&self, message: &str, frame: &mut Frame) {
        let text = Text::from(message);
        let area = centered(frame.area(), POPUP_WIDTH, text.height() as u16 + 2);
        let block = Block::bordered()
            .title(Line::from(" Help ".bold()).centered())
            .title_bottom(Line::from(vec![" Close ".into(), "<Esc> ".blue().bold()]).centered())
            .border_set(border::THICK);
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(text).block(block), area);
    }
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

/// Slice of `input` that fits into `width` characters and keeps the cursor
/// in view, together with the cursor offset inside that slice.
fn input_window(input: &str, curser_pos: usize, width: usize) -> (String, usize) {
    if width == 0 {
        return (String::new(), 0);
    }
    let start = (curser_pos + 1).saturating_sub(width);
    let visible = input.chars().skip(start).take(width).collect();
    (visible, curser_pos - start)
}
