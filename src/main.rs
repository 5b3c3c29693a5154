fn main() {
    if let Err(err) = datashare::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
