//! `makepin <key> <label> [options]` - generate a password and store its card.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use pincard::cli::{self, CliError, MakeCommand, Parsed};
use pincard::{
    logging, resolve_root, CardConfig, CardError, CardManager, CardStore, DirStore, InMemoryStore,
    Key, WordList,
};

fn main() -> Result<()> {
    let command = match cli::parse_make(std::env::args_os()) {
        Ok(Parsed::Run(command)) => command,
        Ok(Parsed::Usage(help)) => {
            println!("{help}");
            return Ok(());
        }
        Err(CliError::Clap(e)) => e.exit(),
        Err(e) => return Err(e.into()),
    };
    logging::init(command.args.verbose);

    let root = resolve_root(command.args.root.clone())?;
    let config = CardConfig::load(&root)?;
    let words = config.load_words(&root)?;

    if command.options.no_write {
        make(InMemoryStore::new(), &command, &config, words, &root)
    } else {
        let store = DirStore::open(&root)
            .with_context(|| format!("opening storage root {}", root.display()))?;
        make(store, &command, &config, words, &root)
    }
}

fn make<S: CardStore>(
    store: S,
    command: &MakeCommand,
    config: &CardConfig,
    words: WordList,
    root: &Path,
) -> Result<()> {
    let key = Key::new(command.args.key.as_str()).ok_or(CardError::EmptyKey)?;
    let label = command.args.label.as_str();

    let mut manager = CardManager::with_config(store, config.cipher, words);
    let card = manager
        .generate(&key, label, &command.options)
        .with_context(|| format!("generating card for {label:?}"))?;

    let mut out = io::stdout().lock();
    card.write_report(&mut out, root)?;
    out.flush()?;
    Ok(())
}
