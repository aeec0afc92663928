fn main() {
    if let Err(err) = lead_managed::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
