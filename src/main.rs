//! rAttendance main entrypoint.

use rattendance::run;
use rattendance::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        error(format!("Error: {}", e.operator_message()));
        std::process::exit(1);
    }
}
