use std::process::ExitCode;

fn main() -> ExitCode {
    printshop_cli::run()
}
