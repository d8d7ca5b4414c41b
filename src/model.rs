use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, trace, warn};

use crate::domain::{CEConfig, CEError, CMDMode, HELP_TEXT, Message};
use crate::grid::Grid;
use crate::inputter::{InputResult, Inputter};
use crate::ui::{
    ACTIONBAR_HEIGHT, CMDLINE_HEIGH, COLUMN_WIDTH_MARGIN, DROPZONE_HEIGHT, MIN_COLUMN_WIDTH,
    TABLE_HEADER_HEIGHT, TITLE_HEIGHT,
};

const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Debug, PartialEq)]
pub enum Status {
    EMPTY,
    READY,
    QUITTING,
}

#[derive(Debug)]
pub struct FileInfo {
    path: PathBuf,
    file_size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    POPUP,
    CMDINPUT,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnView {
    pub name: String,
    pub width: usize,
    pub data: Vec<String>,
}

impl ColumnView {
    fn empty() -> Self {
        ColumnView {
            name: String::new(),
            width: 0,
            data: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct TableCursor {
    row: usize,
    column: usize,
    offset_row: usize,
    offset_column: usize,
}

/// Snapshot of everything the ui needs to draw one frame.
pub struct UIData {
    pub name: String,
    pub show_table: bool,
    pub table: Vec<ColumnView>,
    pub index: ColumnView,
    pub nrows: usize,
    pub ncolumns: usize,
    pub selected_row: usize,
    pub selected_column: usize,
    pub abs_selected_row: usize,
    pub abs_selected_column: usize,
    pub show_popup: bool,
    pub popup_message: String,
    pub layout: UILayout,
    pub cmdinput: InputResult,
    pub cmd_mode: Option<CMDMode>,
    pub active_cmdinput: bool,
    pub status_message: String,
    pub last_update: Instant,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            show_table: false,
            table: Vec::new(),
            index: ColumnView::empty(),
            nrows: 0,
            ncolumns: 0,
            selected_row: 0,
            selected_column: 0,
            abs_selected_row: 0,
            abs_selected_column: 0,
            show_popup: false,
            popup_message: String::new(),
            layout: UILayout::default(),
            cmdinput: InputResult::default(),
            cmd_mode: None,
            active_cmdinput: false,
            status_message: String::new(),
            last_update: Instant::now(),
        }
    }

    /// True while the selected cell is being edited.
    pub fn editing_cell(&self) -> bool {
        self.active_cmdinput && self.cmd_mode == Some(CMDMode::EditCell)
    }
}

#[derive(Default, Clone, Debug)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
    pub table_width: usize,
    pub table_height: usize,
    pub index_width: usize,
}

impl UILayout {
    pub fn from_values(index_width: usize, ui_width: usize, ui_height: usize) -> Self {
        let reserved_height = TITLE_HEIGHT
            + DROPZONE_HEIGHT
            + TABLE_HEADER_HEIGHT
            + ACTIONBAR_HEIGHT
            + CMDLINE_HEIGH;

        // One spacer between the index and the first column
        let table_width = ui_width.saturating_sub(index_width + 1);
        let table_height = std::cmp::max(ui_height.saturating_sub(reserved_height), 1);

        let layout = UILayout {
            width: ui_width,
            height: ui_height,
            table_width,
            table_height,
            index_width,
        };
        trace!("Build UILayout: {:?}", layout);
        layout
    }
}

pub struct Model {
    file_info: Option<FileInfo>,
    config: CEConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    grid: Grid,
    cursor: TableCursor,
    column_widths: Vec<usize>,
    uilayout: UILayout,
    uidata: UIData,
    clipboard: Option<Clipboard>,
    input: Inputter,
    cmd_mode: Option<CMDMode>,
    last_input: InputResult,
    active_cmdinput: bool,
    status_message: String,
}

impl Model {
    pub fn init(config: &CEConfig, ui_width: usize, ui_height: usize) -> Result<Self, CEError> {
        let mut model = Self {
            file_info: None,
            config: config.clone(),
            status: Status::EMPTY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            grid: Grid::new(),
            cursor: TableCursor::default(),
            column_widths: Vec::new(),
            uilayout: UILayout::from_values(0, ui_width, ui_height),
            uidata: UIData::empty(),
            clipboard: None,
            input: Inputter::default(),
            cmd_mode: None,
            last_input: InputResult::default(),
            active_cmdinput: false,
            status_message: String::new(),
        };
        model.set_status_message("Press o to open a csv file, ? for help");
        model.update_uidata();
        Ok(model)
    }

    /// Read a csv file and replace the grid with its content.
    ///
    /// On failure the model stays as it was, including an already loaded grid.
    pub fn load_data_file(&mut self, path: PathBuf) -> Result<(), CEError> {
        let start_time = Instant::now();
        let file_info = Model::get_file_info(path)?;

        let bytes = fs::read(&file_info.path)?;
        let text = String::from_utf8_lossy(&bytes);
        let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(&text);

        self.grid.load(text);
        let loading_duration = start_time.elapsed().as_millis();
        info!(
            "Loaded {} ({} bytes) in {loading_duration}ms",
            file_info.path.display(),
            file_info.file_size
        );

        self.file_info = Some(file_info);
        self.status = Status::READY;
        self.cursor = TableCursor::default();
        self.update_column_widths();
        self.set_status_message(format!(
            "Loaded {} rows in {loading_duration}ms ...",
            self.grid.row_count()
        ));
        self.update_uidata();
        Ok(())
    }

    /// Like `load_data_file` but failures end up in the status line.
    pub fn open(&mut self, path: PathBuf) {
        if let Err(e) = self.load_data_file(path.clone()) {
            warn!("Failed to open {}: {e:?}", path.display());
            self.set_status_message(format!("{}: {e}", path.display()));
            self.update_uidata();
        }
    }

    /// Write the grid as `edited_data.csv` into the configured output directory.
    pub fn export(&mut self) -> Result<PathBuf, CEError> {
        let file = self.grid.export();
        let dir = &self.config.output_dir;
        fs::create_dir_all(dir)
            .map_err(|e| CEError::ExportFailed(format!("{}: {e}", dir.display())))?;

        let path = dir.join(&file.file_name);
        fs::write(&path, file.content.as_bytes())
            .map_err(|e| CEError::ExportFailed(format!("{}: {e}", path.display())))?;

        info!(
            "Exported {} bytes ({}) to {}",
            file.content.len(),
            file.mime_type,
            path.display()
        );
        self.set_status_message(format!(
            "Saved {} ({} bytes)",
            path.display(),
            file.content.len()
        ));
        Ok(path)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn selected_cell(&self) -> (usize, usize) {
        (self.cursor.row, self.cursor.column)
    }

    pub fn raw_keyevents(&self) -> bool {
        self.active_cmdinput
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    fn get_file_info(path: PathBuf) -> Result<FileInfo, CEError> {
        let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CEError::FileNotFound,
            ErrorKind::PermissionDenied => CEError::PermissionDenied,
            _ => CEError::IoError(e),
        })?;
        if !metadata.is_file() {
            return Err(CEError::LoadingFailed("Not a file!".into()));
        }
        Model::check_file_type(&path)?;

        Ok(FileInfo {
            path,
            file_size: metadata.len(),
        })
    }

    fn check_file_type(path: &Path) -> Result<(), CEError> {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_uppercase())
            .as_deref()
        {
            Some("CSV") => Ok(()),
            _ => Err(CEError::UnknownFileType),
        }
    }

    fn expand_path(input: &str) -> Result<PathBuf, CEError> {
        shellexpand::full(input)
            .map(|p| PathBuf::from(p.as_ref()))
            .map_err(|e| CEError::LoadingFailed(e.to_string()))
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        trace!("Status: {}", self.status_message);
    }

    // The table and the row actions only exist while there are data rows.
    fn table_visible(&self) -> bool {
        !self.grid.is_empty()
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout = UILayout::from_values(self.index_width(), width, height);
        self.ensure_visible();
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), CEError> {
        if let Some(msg) = message {
            match self.modus {
                Modus::TABLE if self.table_visible() => match msg {
                    Message::Quit => self.quit(),
                    Message::MoveUp => self.move_selection_up(1),
                    Message::MoveDown => self.move_selection_down(1),
                    Message::MoveLeft => self.move_selection_left(),
                    Message::MoveRight => self.move_selection_right(),
                    Message::MovePageUp => self.move_selection_up(self.uilayout.table_height),
                    Message::MovePageDown => {
                        self.move_selection_down(self.uilayout.table_height)
                    }
                    Message::MoveBeginning => self.select_cell(0, self.cursor.column),
                    Message::MoveEnd => {
                        self.select_cell(self.grid.row_count() - 1, self.cursor.column)
                    }
                    Message::MoveToFirstColumn => self.select_cell(self.cursor.row, 0),
                    Message::MoveToLastColumn => {
                        self.select_cell(self.cursor.row, self.grid.width().saturating_sub(1))
                    }
                    Message::Enter => self.start_cell_edit(),
                    Message::AddRow => self.add_row(),
                    Message::DeleteRow => {
                        let result = self.delete_row();
                        self.report_failure("delete row", result);
                    }
                    Message::Export => self.export_to_status(),
                    Message::Open => self.enter_cmd_mode(CMDMode::Raw, "open "),
                    Message::CopyCell => self.copy_table_cell(),
                    Message::CopyRow => self.copy_table_row(),
                    Message::Help => self.show_help(),
                    Message::EnterCommand => self.enter_cmd_mode(CMDMode::Raw, ""),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    _ => (),
                },
                Modus::TABLE => match msg {
                    Message::Quit => self.quit(),
                    Message::Open => self.enter_cmd_mode(CMDMode::Raw, "open "),
                    Message::Help => self.show_help(),
                    Message::EnterCommand => self.enter_cmd_mode(CMDMode::Raw, ""),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    _ => trace!("No table shown, ignoring {msg:?}"),
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    Message::Exit | Message::Help | Message::Enter => self.close_popup(),
                    _ => (),
                },
                Modus::CMDINPUT => match msg {
                    Message::RawKey(key) => self.raw_input(key),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    _ => (),
                },
            }
        }

        self.update_uidata();
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
    }

    fn close_popup(&mut self) {
        trace!("Close popup ...");
        self.modus = self.previous_modus;
        self.previous_modus = Modus::POPUP;
    }

    fn start_cell_edit(&mut self) {
        let cell = self.grid.get(self.cursor.row, self.cursor.column);
        // The carriage return of a CRLF line is not editable, commit puts it back
        let value = cell.strip_suffix('\r').unwrap_or(cell).to_string();
        debug!(
            "Editing cell {}:{} \"{}\"",
            self.cursor.row, self.cursor.column, value
        );
        self.enter_cmd_mode(CMDMode::EditCell, &value);
    }

    fn enter_cmd_mode(&mut self, mode: CMDMode, preset: &str) {
        trace!("Entering command mode {mode:?} ...");
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.cmd_mode = Some(mode);

        self.active_cmdinput = true;
        self.input.clear();
        self.input.set(preset);
        self.last_input = self.input.get();
    }

    fn raw_input(&mut self, key: KeyEvent) {
        if self.active_cmdinput {
            self.last_input = self.input.read(key);
            if self.last_input.finished {
                self.handle_cmd_input();
            }
        }
    }

    fn handle_cmd_input(&mut self) {
        trace!("Handle cmd input {:?}", self.last_input);

        self.active_cmdinput = false;
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CMDINPUT;

        let mode = self.cmd_mode.take();
        if self.last_input.canceled {
            if mode == Some(CMDMode::EditCell) {
                self.set_status_message("Edit canceled");
            }
            return;
        }

        let cmd_input = self.last_input.input.clone();
        match mode {
            Some(CMDMode::EditCell) => {
                let result = self.commit_cell_edit(cmd_input);
                self.report_failure("edit", result);
            }
            Some(CMDMode::Raw) => self.run_command(&cmd_input),
            None => info!("Cmd mode is none!"),
        }
    }

    fn commit_cell_edit(&mut self, mut value: String) -> Result<(), CEError> {
        let (row, column) = (self.cursor.row, self.cursor.column);
        if self.grid.get(row, column).ends_with('\r') {
            value.push('\r');
        }
        // Ragged rows can be shorter than the header
        self.grid.edit_cell(row, column, value)?;
        self.update_column_widths();
        self.ensure_visible();
        Ok(())
    }

    fn report_failure(&mut self, action: &str, result: Result<(), CEError>) {
        if let Err(e) = result {
            warn!("Failed to {action}: {e:?}");
            self.set_status_message(format!("Can not {action}: {e}"));
        }
    }

    fn run_command(&mut self, cmd_input: &str) {
        let cmd_input = cmd_input.trim();
        let (cmd, argument) = match cmd_input.split_once(char::is_whitespace) {
            Some((cmd, argument)) => (cmd, argument.trim()),
            None => (cmd_input, ""),
        };
        debug!("Running command \"{cmd}\" with \"{argument}\"");

        match cmd {
            "" => {}
            "open" | "o" => {
                if argument.is_empty() {
                    self.set_status_message("Usage: open <path>");
                } else {
                    match Model::expand_path(argument) {
                        Ok(path) => self.open(path),
                        Err(e) => self.set_status_message(e.to_string()),
                    }
                }
            }
            "write" | "w" if self.table_visible() => self.export_to_status(),
            "add" if self.table_visible() => self.add_row(),
            "delete" | "d" if self.table_visible() => {
                let result = self.delete_row();
                self.report_failure("delete row", result);
            }
            "write" | "w" | "add" | "delete" | "d" => {
                self.set_status_message("Nothing loaded, open a csv file first")
            }
            "quit" | "q" => self.quit(),
            "help" | "h" => self.show_help(),
            _ => self.set_status_message(format!("Unknown command: {cmd}")),
        }
    }

    fn add_row(&mut self) {
        let row = self.grid.add_row();
        self.update_column_widths();
        self.select_cell(row, self.cursor.column);
        self.set_status_message(format!("Added row {}", row + 1));
    }

    fn delete_row(&mut self) -> Result<(), CEError> {
        let row = self.cursor.row;
        self.grid.delete_row(row)?;
        self.cursor.row = std::cmp::min(row, self.grid.row_count().saturating_sub(1));
        self.update_column_widths();
        self.ensure_visible();
        self.set_status_message(format!("Deleted row {}", row + 1));
        Ok(())
    }

    fn export_to_status(&mut self) {
        if let Err(e) = self.export() {
            error!("Export failed: {e:?}");
            self.set_status_message(e.to_string());
        }
    }

    fn clipboard(&mut self) -> Option<&mut Clipboard> {
        if self.clipboard.is_none() {
            match Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => warn!("Clipboard not available: {e:?}"),
            }
        }
        self.clipboard.as_mut()
    }

    fn copy_to_clipboard(&mut self, content: String) {
        trace!("Copy content: {}", content);
        let copied = match self.clipboard() {
            Some(clipboard) => clipboard.set_text(content).map_err(|e| format!("{e}")),
            None => Err("no clipboard".to_string()),
        };
        match copied {
            Ok(_) => self.set_status_message("Copied to clipboard."),
            Err(e) => {
                trace!("Error copying to clipboard: {:?}", e);
                self.set_status_message(format!("Copy failed: {e}"));
            }
        }
    }

    fn copy_table_cell(&mut self) {
        let cell = self.grid.get(self.cursor.row, self.cursor.column).to_string();
        self.copy_to_clipboard(cell);
    }

    fn copy_table_row(&mut self) {
        let row = self
            .grid
            .row(self.cursor.row)
            .map(|r| r.join(","))
            .unwrap_or_default();
        self.copy_to_clipboard(row);
    }

    // ------------------------ Cursor and viewport ------------------------- //

    fn move_selection_up(&mut self, size: usize) {
        self.select_cell(self.cursor.row.saturating_sub(size), self.cursor.column);
    }

    fn move_selection_down(&mut self, size: usize) {
        self.select_cell(self.cursor.row + size, self.cursor.column);
    }

    fn move_selection_left(&mut self) {
        self.select_cell(self.cursor.row, self.cursor.column.saturating_sub(1));
    }

    fn move_selection_right(&mut self) {
        self.select_cell(self.cursor.row, self.cursor.column + 1);
    }

    fn select_cell(&mut self, row: usize, column: usize) {
        let max_row = self.grid.row_count().saturating_sub(1);
        let max_column = self.grid.width().saturating_sub(1);
        self.cursor.row = std::cmp::min(row, max_row);
        self.cursor.column = std::cmp::min(column, max_column);
        trace!("Select cell {}:{}", self.cursor.row, self.cursor.column);
        self.ensure_visible();
    }

    fn ensure_visible(&mut self) {
        let height = self.uilayout.table_height;
        let cursor = &mut self.cursor;
        if cursor.row < cursor.offset_row {
            cursor.offset_row = cursor.row;
        } else if cursor.row >= cursor.offset_row + height {
            cursor.offset_row = cursor.row + 1 - height;
        }

        let column = self.cursor.column;
        if column < self.cursor.offset_column {
            self.cursor.offset_column = column;
        } else {
            // Scroll right until the selected column is shown in full width
            while self.cursor.offset_column < column {
                let fully_visible = self
                    .visible_columns(self.cursor.offset_column)
                    .iter()
                    .any(|&(c, w)| c == column && w == self.column_widths[c]);
                if fully_visible {
                    break;
                }
                self.cursor.offset_column += 1;
            }
        }
    }

    /// Columns starting at `offset` that fit into the table width, as (index, render width).
    /// The last one may be cut.
    fn visible_columns(&self, offset: usize) -> Vec<(usize, usize)> {
        let table_width = self.uilayout.table_width;
        let mut visible = Vec::new();
        let mut used = 0;
        for (cidx, &width) in self.column_widths.iter().enumerate().skip(offset) {
            if used + width + 1 <= table_width {
                visible.push((cidx, width));
                used += width + 1;
            } else {
                let remaining = table_width.saturating_sub(used + 1);
                if remaining > 0 {
                    visible.push((cidx, remaining));
                }
                break;
            }
        }
        visible
    }

    fn index_width(&self) -> usize {
        if self.table_visible() {
            self.grid.row_count().to_string().len()
        } else {
            0
        }
    }

    fn update_column_widths(&mut self) {
        let max_column_width = self.config.max_column_width;
        self.column_widths = (0..self.grid.width())
            .map(|cidx| {
                let content = self
                    .grid
                    .rows()
                    .iter()
                    .filter_map(|row| row.get(cidx))
                    .map(|cell| display_width(cell))
                    .max()
                    .unwrap_or(0);
                let name = display_width(self.grid.header(cidx));
                let width = std::cmp::max(name, content) + COLUMN_WIDTH_MARGIN;
                width.clamp(MIN_COLUMN_WIDTH, std::cmp::max(max_column_width, MIN_COLUMN_WIDTH))
            })
            .collect();

        // The index grows with the number of rows
        self.uilayout =
            UILayout::from_values(self.index_width(), self.uilayout.width, self.uilayout.height);
    }

    fn update_uidata(&mut self) {
        let show_table = self.table_visible();
        let mut table = Vec::new();
        let mut index = ColumnView::empty();

        let cursor = self.cursor;
        let visible = self.visible_columns(cursor.offset_column);
        if show_table {
            let rbegin = cursor.offset_row;
            let rend = std::cmp::min(rbegin + self.uilayout.table_height, self.grid.row_count());

            table = visible
                .iter()
                .map(|&(cidx, width)| ColumnView {
                    name: Model::get_visible_name(self.grid.header(cidx), width),
                    width,
                    data: (rbegin..rend)
                        .map(|ridx| Model::get_visible_name(self.grid.get(ridx, cidx), width))
                        .collect(),
                })
                .collect();

            index = ColumnView {
                name: String::new(),
                width: self.uilayout.index_width,
                data: (rbegin..rend).map(|ridx| (ridx + 1).to_string()).collect(),
            };
        }

        let selected_column = visible
            .iter()
            .position(|&(c, _)| c == cursor.column)
            .unwrap_or(0);

        self.uidata = UIData {
            name: self
                .file_info
                .as_ref()
                .and_then(|f| f.path.file_name())
                .and_then(|s| s.to_str())
                .unwrap_or("")
                .to_string(),
            show_table,
            table,
            index,
            nrows: self.grid.row_count(),
            ncolumns: self.grid.width(),
            selected_row: cursor.row.saturating_sub(cursor.offset_row),
            selected_column,
            abs_selected_row: cursor.row,
            abs_selected_column: cursor.column,
            show_popup: self.modus == Modus::POPUP,
            popup_message: HELP_TEXT.to_string(),
            layout: self.uilayout.clone(),
            cmdinput: self.last_input.clone(),
            cmd_mode: self.cmd_mode,
            active_cmdinput: self.active_cmdinput,
            status_message: self.status_message.clone(),
            last_update: Instant::now(),
        };
    }

    fn get_visible_name(name: &str, width: usize) -> String {
        let name = name.replace('\r', "↵");
        if display_width(&name) <= width {
            return name;
        }
        if width < 3 {
            return name.chars().take(width).collect();
        }
        let mut reduced_name: String = name.chars().take(width - 3).collect();
        reduced_name.push_str("...");
        reduced_name
    }
}

fn display_width(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridError;
    use ratatui::crossterm::event::{KeyCode, KeyModifiers};
    use std::io::Write;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn loaded_model(dir: &TempDir, content: &str) -> Model {
        let config = CEConfig::default().with_output_dir(dir.path().join("out"));
        let mut model = Model::init(&config, 80, 24).unwrap();
        let path = write_csv(dir, "data.csv", content);
        model.load_data_file(path).unwrap();
        model
    }

    fn send(model: &mut Model, message: Message) {
        model.update(Some(message)).unwrap();
    }

    fn key(model: &mut Model, code: KeyCode) {
        send(
            model,
            Message::RawKey(KeyEvent::new(code, KeyModifiers::NONE)),
        );
    }

    fn type_str(model: &mut Model, s: &str) {
        for c in s.chars() {
            key(model, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_starts_empty() {
        let model = Model::init(&CEConfig::default(), 80, 24).unwrap();
        assert_eq!(model.status, Status::EMPTY);
        assert!(!model.get_uidata().show_table);
    }

    #[test]
    fn test_load_switches_to_ready() {
        let dir = TempDir::new().unwrap();
        let model = loaded_model(&dir, "name,age\nAl,30\nBo,25\n");
        assert_eq!(model.status, Status::READY);
        assert_eq!(model.grid().row_count(), 2);
        assert!(model.get_uidata().show_table);
        assert_eq!(model.get_uidata().name, "data.csv");
    }

    #[test]
    fn test_unknown_extension_keeps_model_empty() {
        let dir = TempDir::new().unwrap();
        let mut model = Model::init(&CEConfig::default(), 80, 24).unwrap();
        let path = write_csv(&dir, "data.txt", "a,b\n1,2");
        assert!(matches!(
            model.load_data_file(path),
            Err(CEError::UnknownFileType)
        ));
        assert_eq!(model.status, Status::EMPTY);
    }

    #[test]
    fn test_missing_file_keeps_loaded_grid() {
        let dir = TempDir::new().unwrap();
        let mut model = loaded_model(&dir, "a,b\n1,2");
        assert!(matches!(
            model.load_data_file(dir.path().join("missing.csv")),
            Err(CEError::FileNotFound)
        ));
        assert_eq!(model.status, Status::READY);
        assert_eq!(model.grid().get(0, 1), "2");
    }

    #[test]
    fn test_uppercase_extension_is_accepted() {
        let dir = TempDir::new().unwrap();
        let mut model = Model::init(&CEConfig::default(), 80, 24).unwrap();
        let path = write_csv(&dir, "DATA.CSV", "a\n1");
        model.load_data_file(path).unwrap();
        assert_eq!(model.status, Status::READY);
    }

    #[test]
    fn test_bom_is_stripped_and_invalid_utf8_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bom.csv");
        fs::write(&path, b"\xef\xbb\xbfname,age\n\xffAl,30").unwrap();
        let mut model = Model::init(&CEConfig::default(), 80, 24).unwrap();
        model.load_data_file(path).unwrap();
        assert_eq!(model.grid().headers()[0], "name");
        assert_eq!(model.grid().get(0, 0), "\u{fffd}Al");
    }

    #[test]
    fn test_second_load_replaces_grid() {
        let dir = TempDir::new().unwrap();
        let mut model = loaded_model(&dir, "a,b\n1,2\n3,4\n5,6");
        send(&mut model, Message::MoveEnd);
        let path = write_csv(&dir, "other.csv", "x\nonly");
        model.load_data_file(path).unwrap();
        assert_eq!(model.grid().headers(), ["x"]);
        assert_eq!(model.grid().row_count(), 1);
        assert_eq!(model.selected_cell(), (0, 0));
    }

    #[test]
    fn test_edit_cell_commit() {
        let dir = TempDir::new().unwrap();
        let mut model = loaded_model(&dir, "name,age\nAl,30\nBo,25");
        send(&mut model, Message::MoveDown);
        send(&mut model, Message::Enter);
        assert!(model.raw_keyevents());
        assert!(model.get_uidata().editing_cell());
        assert_eq!(model.get_uidata().cmdinput.input, "Bo");

        key(&mut model, KeyCode::Backspace);
        key(&mut model, KeyCode::Backspace);
        type_str(&mut model, "Bea");
        key(&mut model, KeyCode::Enter);

        assert!(!model.raw_keyevents());
        assert_eq!(model.grid().get(1, 0), "Bea");
        assert_eq!(model.grid().get(0, 0), "Al");
        assert_eq!(model.grid().row_count(), 2);
    }

    #[test]
    fn test_cells_beyond_header_are_shown_and_editable() {
        let dir = TempDir::new().unwrap();
        let mut model = loaded_model(&dir, "a,b\n1,2,EXTRA");
        send(&mut model, Message::MoveRight);
        send(&mut model, Message::MoveRight);
        assert_eq!(model.selected_cell(), (0, 2));

        let ui = model.get_uidata();
        assert_eq!(ui.ncolumns, 3);
        assert_eq!(ui.table[ui.selected_column].name, "");
        assert_eq!(ui.table[ui.selected_column].data[0], "EXTRA");

        // The cursor stops at the last cell of the longest row
        send(&mut model, Message::MoveRight);
        assert_eq!(model.selected_cell(), (0, 2));

        send(&mut model, Message::Enter);
        assert_eq!(model.get_uidata().cmdinput.input, "EXTRA");
        send(
            &mut model,
            Message::RawKey(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)),
        );
        type_str(&mut model, "more");
        key(&mut model, KeyCode::Enter);
        send(&mut model, Message::Export);

        let written = fs::read_to_string(dir.path().join("out").join("edited_data.csv")).unwrap();
        assert_eq!(written, "a,b\n1,2,more");
    }

    #[test]
    fn test_edit_of_unreached_cell_is_reported() {
        let dir = TempDir::new().unwrap();
        let mut model = loaded_model(&dir, "a,b,c\n1,2,3\n4");
        send(&mut model, Message::MoveDown);
        send(&mut model, Message::MoveRight);
        assert_eq!(model.selected_cell(), (1, 1));
        assert!(matches!(
            model.commit_cell_edit("x".into()),
            Err(CEError::GridError(GridError::CellOutOfBounds { row: 1, column: 1 }))
        ));

        send(&mut model, Message::Enter);
        type_str(&mut model, "x");
        key(&mut model, KeyCode::Enter);
        assert_eq!(
            model.get_uidata().status_message,
            "Can not edit: cell 1:1 is outside of the grid"
        );
        assert_eq!(model.grid().rows()[1], vec!["4".to_string()]);
    }

    #[test]
    fn test_crlf_cell_edit_keeps_carriage_return() {
        let dir = TempDir::new().unwrap();
        let mut model = loaded_model(&dir, "a,b\r\n1,2\r\n");
        send(&mut model, Message::MoveRight);
        send(&mut model, Message::Enter);
        let input = &model.get_uidata().cmdinput;
        assert_eq!(input.input, "2");
        assert_eq!(input.curser_pos, 1);

        key(&mut model, KeyCode::Backspace);
        type_str(&mut model, "5");
        key(&mut model, KeyCode::Enter);
        assert_eq!(model.grid().get(0, 1), "5\r");
        assert_eq!(model.grid().export().content, "a,b\r\n1,5\r");
    }

    #[test]
    fn test_edit_cell_cancel() {
        let dir = TempDir::new().unwrap();
        let mut model = loaded_model(&dir, "name,age\nAl,30");
        send(&mut model, Message::Enter);
        type_str(&mut model, "xyz");
        key(&mut model, KeyCode::Esc);
        assert_eq!(model.grid().get(0, 0), "Al");
        assert!(!model.raw_keyevents());
    }

    #[test]
    fn test_add_row_moves_cursor() {
        let dir = TempDir::new().unwrap();
        let mut model = loaded_model(&dir, "name,age\nAl,30");
        send(&mut model, Message::AddRow);
        assert_eq!(model.grid().row_count(), 2);
        assert_eq!(model.grid().rows()[1], vec![String::new(), String::new()]);
        assert_eq!(model.selected_cell().0, 1);
    }

    #[test]
    fn test_delete_last_row_clamps_cursor() {
        let dir = TempDir::new().unwrap();
        let mut model = loaded_model(&dir, "n\n1\n2\n3");
        send(&mut model, Message::MoveEnd);
        send(&mut model, Message::DeleteRow);
        assert_eq!(model.grid().row_count(), 2);
        assert_eq!(model.selected_cell().0, 1);
        assert_eq!(model.grid().get(1, 0), "2");
    }

    #[test]
    fn test_row_actions_ignored_without_rows() {
        let dir = TempDir::new().unwrap();
        let mut model = loaded_model(&dir, "a,b\n");
        assert_eq!(model.status, Status::READY);
        assert!(!model.get_uidata().show_table);

        send(&mut model, Message::AddRow);
        send(&mut model, Message::Export);
        assert_eq!(model.grid().row_count(), 0);
        assert!(!dir.path().join("out").join("edited_data.csv").exists());
    }

    #[test]
    fn test_deleting_all_rows_hides_table() {
        let dir = TempDir::new().unwrap();
        let mut model = loaded_model(&dir, "a\n1");
        send(&mut model, Message::DeleteRow);
        assert!(!model.get_uidata().show_table);
        send(&mut model, Message::AddRow);
        assert_eq!(model.grid().row_count(), 0);
    }

    #[test]
    fn test_export_writes_file() {
        let dir = TempDir::new().unwrap();
        let mut model = loaded_model(&dir, "name,age\nAl,30\nBo,25\n");
        send(&mut model, Message::Export);
        let written = fs::read_to_string(dir.path().join("out").join("edited_data.csv")).unwrap();
        assert_eq!(written, "name,age\nAl,30\nBo,25");
    }

    #[test]
    fn test_open_command() {
        let dir = TempDir::new().unwrap();
        let mut model = Model::init(&CEConfig::default(), 80, 24).unwrap();
        let path = write_csv(&dir, "cmd.csv", "a,b\n1,2");

        send(&mut model, Message::Open);
        assert_eq!(model.get_uidata().cmdinput.input, "open ");
        type_str(&mut model, path.to_str().unwrap());
        key(&mut model, KeyCode::Enter);

        assert_eq!(model.status, Status::READY);
        assert_eq!(model.grid().get(0, 0), "1");
    }

    #[test]
    fn test_unknown_command() {
        let mut model = Model::init(&CEConfig::default(), 80, 24).unwrap();
        send(&mut model, Message::EnterCommand);
        type_str(&mut model, "frobnicate");
        key(&mut model, KeyCode::Enter);
        assert_eq!(
            model.get_uidata().status_message,
            "Unknown command: frobnicate"
        );
    }

    #[test]
    fn test_quit_command() {
        let mut model = Model::init(&CEConfig::default(), 80, 24).unwrap();
        send(&mut model, Message::EnterCommand);
        type_str(&mut model, "q");
        key(&mut model, KeyCode::Enter);
        assert_eq!(model.status, Status::QUITTING);
    }

    #[test]
    fn test_navigation_scrolls_viewport() {
        let dir = TempDir::new().unwrap();
        let content = std::iter::once("n".to_string())
            .chain((1..=100).map(|i| i.to_string()))
            .collect::<Vec<_>>()
            .join("\n");
        let mut model = loaded_model(&dir, &content);
        let height = model.get_uidata().layout.table_height;

        send(&mut model, Message::MoveEnd);
        let ui = model.get_uidata();
        assert_eq!(ui.abs_selected_row, 99);
        assert_eq!(ui.selected_row, height - 1);
        assert_eq!(ui.index.data.last().unwrap(), "100");

        send(&mut model, Message::MoveBeginning);
        assert_eq!(model.get_uidata().selected_row, 0);
        assert_eq!(model.get_uidata().index.data[0], "1");
    }

    #[test]
    fn test_horizontal_scrolling() {
        let dir = TempDir::new().unwrap();
        let header = (0..20)
            .map(|i| format!("column_{i:02}"))
            .collect::<Vec<_>>()
            .join(",");
        let mut model = loaded_model(&dir, &format!("{header}\n{}", vec!["x"; 20].join(",")));

        send(&mut model, Message::MoveToLastColumn);
        let ui = model.get_uidata();
        assert_eq!(ui.abs_selected_column, 19);
        assert_eq!(ui.table[ui.selected_column].name, "column_19");

        send(&mut model, Message::MoveToFirstColumn);
        let ui = model.get_uidata();
        assert_eq!(ui.table[0].name, "column_00");
    }

    #[test]
    fn test_help_popup() {
        let mut model = Model::init(&CEConfig::default(), 80, 24).unwrap();
        send(&mut model, Message::Help);
        assert!(model.get_uidata().show_popup);
        send(&mut model, Message::Exit);
        assert!(!model.get_uidata().show_popup);
    }

    #[test]
    fn test_visible_name_is_truncated() {
        assert_eq!(Model::get_visible_name("Vienna", 10), "Vienna");
        assert_eq!(Model::get_visible_name("Vienna", 5), "Vi...");
        assert_eq!(Model::get_visible_name("Wien\r", 10), "Wien↵");
    }
}
