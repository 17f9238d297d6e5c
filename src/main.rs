fn main() {
    if let Err(e) = jokebox::cli::main() {
        eprintln!("❌ Error: {e}");
        std::process::exit(1);
    }
}
