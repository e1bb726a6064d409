// Module declarations
mod cli;

fn main() {
    // Run the CLI
    let code = cli::run();
    std::process::exit(code);
}
