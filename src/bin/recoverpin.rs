//! `recoverpin <key> <label> <length> [-s] [-e | -eN]` - recover a password.

use std::io::{self, Write};

use anyhow::{Context, Result};
use pincard::cli::{self, CliError, Parsed};
use pincard::{
    deliver, logging, resolve_root, CardConfig, CardError, CardManager, CommandClipboard,
    DirStore, Key, RecoverRequest, WordList,
};

fn main() -> Result<()> {
    let args = match cli::parse_recover(std::env::args_os()) {
        Ok(Parsed::Run(args)) => args,
        Ok(Parsed::Usage(help)) => {
            println!("{help}");
            return Ok(());
        }
        Err(CliError::Clap(e)) => e.exit(),
        Err(e) => return Err(e.into()),
    };
    logging::init(args.verbose);

    let root = resolve_root(args.root.clone())?;
    let config = CardConfig::load(&root)?;
    let flags = args.resolve(config.recover);

    let store = DirStore::existing(&root)
        .with_context(|| format!("opening storage root {}", root.display()))?;
    let manager = CardManager::with_config(store, config.cipher, WordList::default());

    let key = Key::new(args.key.as_str()).ok_or(CardError::EmptyKey)?;
    let request = RecoverRequest {
        key: &key,
        label: &args.label,
        length: args.length,
        encrypted: flags.encrypted,
    };
    let password = manager
        .recover(&request)
        .with_context(|| format!("recovering {}", request.file_name()))?;

    let mut clipboard = CommandClipboard::configured(config.clipboard_command.clone());
    let mut out = io::stdout().lock();
    deliver(&password, flags.show_in_clear, &mut clipboard, &mut out)?;
    out.flush()?;
    Ok(())
}
