fn main() {
    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = symbol_renderer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
