use std::process::ExitCode;

fn main() -> ExitCode {
  match tasklist_cli::run(std::env::args_os()) {
    | Ok(()) => ExitCode::SUCCESS,
    | Err(err) => {
      eprintln!("tasks: {err:#}");
      ExitCode::FAILURE
    }
  }
}
