mod cli;

use std::process::ExitCode;

use colored::Colorize;

fn main() -> ExitCode {
    let command_line_interface = cli::CommandLineInterface::load();

    env_logger::Builder::new()
        .filter_level(command_line_interface.log_level_filter())
        .format_timestamp(None)
        .format_module_path(false)
        .init();

    match command_line_interface.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
