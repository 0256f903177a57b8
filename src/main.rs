//! rTimeTracker main entrypoint.

use env_logger::Env;
use rtimetracker::run;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    println!();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
