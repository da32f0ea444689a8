//! Lore index builder - embed the stories directory into a snapshot.

use lore_cli::{logging, render_error, run_build, AppConfig, Formatter, Secrets};
use lore_store::DefaultEmbedderFactory;
use std::io::{self, IsTerminal};

fn main() {
    if let Err(e) = run() {
        let formatter = Formatter::new(io::stderr().is_terminal());
        eprintln!("{}", render_error(&formatter, &e));
        std::process::exit(1);
    }
}

fn run() -> lore_cli::Result<()> {
    logging::init();

    let config = AppConfig::load(&AppConfig::path())?;
    let secrets = Secrets::from_env();
    let formatter = Formatter::new(config.color);

    println!("{}", formatter.banner("STORY EMBEDDINGS GENERATOR"));

    let factory = DefaultEmbedderFactory::new(secrets.huggingface_token);
    run_build(config.pipeline, factory, &formatter)?;

    println!("{}", formatter.banner("PROCESS COMPLETED SUCCESSFULLY"));
    Ok(())
}
