#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

fn main() {
    if let Err(e) = stellar_watch::run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
