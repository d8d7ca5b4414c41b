use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use ce::cli::CliArgs;
use ce::controller::Controller;
use ce::domain::CEError;
use ce::logging;
use ce::model::{Model, Status};
use ce::ui::TableUI;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    if let Err(e) = logging::init(&args.log_file()) {
        eprintln!("Warning: {e}");
    }

    let mut terminal = ratatui::init();
    let result = run(&args, &mut terminal);
    ratatui::restore();

    match result {
        Err(e) => {
            error!("Terminated with {e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run(args: &CliArgs, terminal: &mut ratatui::DefaultTerminal) -> Result<(), CEError> {
    info!("Starting ce!");
    let cfg = args.config();

    let size = terminal.size()?;
    let mut model = Model::init(&cfg, size.width as usize, size.height as usize)?;
    if let Some(path) = &args.path {
        model.open(path.clone());
    }

    let mut ui = TableUI::new(&cfg);
    let controller = Controller::new(&cfg);

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(model.get_uidata(), f))?;

        // Handle events and map to a Message
        let message = controller.handle_event(&model)?;
        model.update(message)?;
    }

    info!("Quitting ce");
    Ok(())
}
