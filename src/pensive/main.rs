mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        // 2 when the environment (disk, database, config) failed rather than the request
        let code = if e.is_recoverable() { 1 } else { 2 };
        std::process::exit(code);
    }
}
