//! Lore - extract structured character details from the indexed stories.

use lore_cli::{input, logging, render_error, run_query, AppConfig, Formatter, Secrets};
use lore_extractor::Extractor;
use lore_llm::ConfiguredProvider;
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

    println!("{}", formatter.banner("CHARACTER DETAILS EXTRACTOR"));
    let character_name = input::read_character_name()?;

    let llm = ConfiguredProvider::from_settings(&config.generation, secrets.mistral_key)?;
    let factory = DefaultEmbedderFactory::new(secrets.huggingface_token);
    let extractor = Extractor::new(llm, factory, config.pipeline);

    run_query(&extractor, &character_name, &config.output_file, &formatter)?;
    Ok(())
}
