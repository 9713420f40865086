/// Initializes the global tracing subscriber, defaulting to INFO when
/// `RUST_LOG` is unset. Call once from the embedding binary.
pub fn init() {
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "INFO");
        }
    }
    tracing_subscriber::fmt::init();
}
