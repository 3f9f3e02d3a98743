use std::process::ExitCode;

fn main() -> ExitCode {
    glassquote_cli::run()
}
