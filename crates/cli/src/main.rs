use std::process::ExitCode;

fn main() -> ExitCode {
    agrichat_cli::run()
}
