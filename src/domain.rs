use std::fmt;
use std::io::Error;
use std::path::PathBuf;

use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;

use crate::grid::GridError;

#[derive(Debug)]
pub enum CEError {
    IoError(Error),
    GridError(GridError),
    LoadingFailed(String),
    ExportFailed(String),
    SetupFailed(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
}

impl fmt::Display for CEError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CEError::IoError(e) => write!(f, "I/O error: {e}"),
            CEError::GridError(e) => write!(f, "{e}"),
            CEError::LoadingFailed(reason) => write!(f, "Loading failed: {reason}"),
            CEError::ExportFailed(reason) => write!(f, "Export failed: {reason}"),
            CEError::SetupFailed(reason) => write!(f, "Setup failed: {reason}"),
            CEError::FileNotFound => write!(f, "File not found!"),
            CEError::PermissionDenied => write!(f, "Permission denied!"),
            CEError::UnknownFileType => write!(f, "Not a .csv file!"),
        }
    }
}

impl std::error::Error for CEError {}

impl From<Error> for CEError {
    fn from(err: Error) -> Self {
        CEError::IoError(err)
    }
}

impl From<GridError> for CEError {
    fn from(err: GridError) -> Self {
        CEError::GridError(err)
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct CEConfig {
    pub event_poll_time: u64,
    pub max_column_width: usize,
    #[setters(into)]
    pub output_dir: PathBuf,
}

impl Default for CEConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            max_column_width: 30,
            output_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    MoveToFirstColumn,
    MoveToLastColumn,
    Enter,
    Exit,
    AddRow,
    DeleteRow,
    Export,
    Open,
    CopyCell,
    CopyRow,
    Help,
    EnterCommand,
    Resize(usize, usize),
    RawKey(KeyEvent),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CMDMode {
    Raw,
    EditCell,
}

pub const HELP_TEXT: &str = "\
ce - terminal csv editor

Navigation
  arrows, h j k l     move between cells
  PgUp / PgDown       move one page
  g / G               first / last row
  0 / $               first / last column

Editing
  Enter, e            edit the selected cell
  Enter / Esc         commit / cancel the edit
  a                   add a new row
  d, Del              delete the selected row
  s                   download as edited_data.csv
  y / Y               copy cell / row

Commands
  o                   open another csv file
  :open <path>        open a csv file
  :write              download as edited_data.csv
  :add  :delete       add / delete a row
  :quit               quit

  ?                   this help, Esc closes it
  q                   quit";
