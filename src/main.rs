use colored::Colorize;

fn main() {
    if let Err(e) = mortydex::run() {
        eprintln!("{} {}", "Error:".bright_red(), e);
        std::process::exit(1);
    }
}
