//! `vc` entry point: hand-rolled argument dispatch over the compilation
//! pipeline (see `cli::run`).

mod cli;

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    cli::run(&args);
}
