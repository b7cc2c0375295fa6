use std::process::ExitCode;

fn main() -> ExitCode {
    httpmsg::app::run()
}
