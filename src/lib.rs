pub mod cli;
pub mod controller;
pub mod csv;
pub mod domain;
pub mod grid;
pub mod inputter;
pub mod logging;
pub mod model;
pub mod ui;
