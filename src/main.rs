mod app;
mod cli;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    app::run(cli::parse());
}
