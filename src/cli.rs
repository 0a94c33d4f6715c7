//! Command-line models for `makepin` and `recoverpin`.
//!
//! The historical two-letter flags (`-sA`, `-sR`, `-qW`, `-eN`) are not
//! expressible as clap shorts, so `normalize_legacy_flags` rewrites them to
//! long flags before parsing.
//!
//! Missing positional arguments print the help text and exit with status 0.
//! Scripts cannot rely on the exit code to detect that case.

use std::ffi::OsString;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::builder::RangedI64ValueParser;
use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};

use crate::alphabet::SymbolPolicy;
use crate::card::MakeOptions;
use crate::config::RecoverDefaults;
use crate::generator::{GenerateError, Growth, WordMode};
use crate::preset::Preset;

/// `-w` with no count; must equal `generator::DEFAULT_WORD_COUNT`
const DEFAULT_WORD_COUNT_ARG: &str = "3";

/// Error types for argument handling
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Clap(#[from] clap::Error),
    #[error(transparent)]
    Generate(#[from] GenerateError),
}

/// Result of parsing a command line
#[derive(Debug)]
pub enum Parsed<T> {
    Run(T),
    /// Required arguments were missing; print this and exit 0
    Usage(String),
}

/// Rewrite legacy flags to their long forms. Tokens after `--` are kept.
pub fn normalize_legacy_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg: OsString| {
            if passthrough {
                return arg;
            }
            let replacement = match arg.to_str() {
                Some("--") => {
                    passthrough = true;
                    None
                }
                Some("-sA") => Some("--all-symbols"),
                Some("-sR") => Some("--exclude-symbols"),
                Some("-qW") => Some("--quick-words"),
                Some("-eN") => Some("--plain"),
                _ => None,
            };
            replacement.map_or(arg, OsString::from)
        })
        .collect()
}

// ============================================================
// MAKEPIN
// ============================================================

/// Generate a password and hide it in a padded card
#[derive(Parser, Debug, Clone)]
#[command(name = "makepin", version, about)]
pub struct MakeArgs {
    /// Secret key. Never stored.
    pub key: String,

    /// Save location. Names the card file and feeds the offset.
    pub label: String,

    /// Symbols to mix into the alphabet [none by default]
    #[arg(short = 's', long, value_name = "SYMBOLS")]
    pub symbols: Option<String>,

    /// Use every non-alphanumeric ASCII symbol (`-sA`)
    #[arg(long)]
    pub all_symbols: bool,

    /// Use every symbol except these (`-sR`)
    #[arg(long, value_name = "SYMBOLS")]
    pub exclude_symbols: Option<String>,

    /// Growth factor in [-3, 3]; scales the output length
    #[arg(
        short = 'g',
        long,
        default_value_t = 0,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i8).range(-3..=3)
    )]
    pub growth: i8,

    /// Truncate output to this many characters (words in word mode)
    #[arg(
        short = 'l',
        long,
        value_name = "N",
        value_parser = RangedI64ValueParser::<usize>::new().range(1..)
    )]
    pub length_limit: Option<usize>,

    /// Pad with filler whose length only the key and label reveal
    #[arg(short = 'p', long)]
    pub pad: bool,

    /// Pad, pack as byte records and seal with the configured cipher
    #[arg(short = 'e', long)]
    pub encrypt: bool,

    /// Build the password from words; COUNT defaults to 3
    #[arg(
        short = 'w',
        long,
        value_name = "COUNT",
        num_args = 0..=1,
        default_missing_value = DEFAULT_WORD_COUNT_ARG
    )]
    pub words: Option<NonZeroUsize>,

    /// All symbols, padded, growth 3, limit 32
    #[arg(short = 'q', long)]
    pub quick: bool,

    /// Quick preset with five words (`-qW`)
    #[arg(long)]
    pub quick_words: bool,

    /// Print the password without writing a card
    #[arg(short = 'o', long)]
    pub no_write: bool,

    /// Storage root [default: platform data directory]
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Parsed `makepin` invocation
#[derive(Debug, Clone)]
pub struct MakeCommand {
    pub args: MakeArgs,
    pub options: MakeOptions,
}

pub fn parse_make<I, T>(args: I) -> Result<Parsed<MakeCommand>, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut command = MakeArgs::command();
    let matches = match command.try_get_matches_from_mut(normalize_legacy_flags(args)) {
        Ok(matches) => matches,
        Err(e) if e.kind() == ErrorKind::MissingRequiredArgument => {
            return Ok(Parsed::Usage(command.render_help().to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    let args = MakeArgs::from_arg_matches(&matches)?;
    let options = make_options(&args, &matches)?;
    Ok(Parsed::Run(MakeCommand { args, options }))
}

fn given(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

/// Preset first, then every flag given on the command line
fn make_options(args: &MakeArgs, matches: &ArgMatches) -> Result<MakeOptions, GenerateError> {
    let mut options = if args.quick_words {
        Preset::QuickWords.expand()
    } else if args.quick {
        Preset::Quick.expand()
    } else {
        MakeOptions::default()
    };

    if let Some(policy) = symbol_policy(args, matches) {
        options.generator.symbols = policy;
    }
    if given(matches, "growth") {
        options.generator.growth = Growth::new(args.growth)?;
    }
    if let Some(limit) = args.length_limit {
        options.generator.length_limit = Some(limit);
    }
    if let Some(count) = args.words {
        options.generator.word_mode = Some(WordMode { count: count.get() });
    }
    options.pad |= args.pad;
    options.encrypt |= args.encrypt;
    options.no_write |= args.no_write;
    Ok(options)
}

/// The symbol flag given last wins
fn symbol_policy(args: &MakeArgs, matches: &ArgMatches) -> Option<SymbolPolicy> {
    let last = ["symbols", "all_symbols", "exclude_symbols"]
        .into_iter()
        .filter(|id| given(matches, id))
        .max_by_key(|id| matches.index_of(id))?;
    Some(match last {
        "symbols" => SymbolPolicy::only(args.symbols.as_deref().unwrap_or_default()),
        "exclude_symbols" => {
            SymbolPolicy::all_except(args.exclude_symbols.as_deref().unwrap_or_default())
        }
        _ => SymbolPolicy::All,
    })
}

// ============================================================
// RECOVERPIN
// ============================================================

/// Recover a password from its card
#[derive(Parser, Debug, Clone)]
#[command(name = "recoverpin", version, about)]
pub struct RecoverArgs {
    /// Secret key used at generation
    pub key: String,

    /// Save location used at generation
    pub label: String,

    /// Length of the original password
    pub length: usize,

    /// Show the recovered password in the shell instead of the clipboard
    #[arg(short = 's', long)]
    pub show: bool,

    /// Recover from the encrypted `.enc` card
    #[arg(short = 'e', long, overrides_with = "plain")]
    pub encrypted: bool,

    /// Recover from the padded `.pad` card (`-eN`)
    #[arg(long, overrides_with = "encrypted")]
    pub plain: bool,

    /// Storage root [default: platform data directory]
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl RecoverArgs {
    /// Flags override configured defaults
    #[must_use]
    pub fn resolve(&self, defaults: RecoverDefaults) -> RecoverDefaults {
        RecoverDefaults {
            show_in_clear: self.show || defaults.show_in_clear,
            encrypted: self.encrypted || (!self.plain && defaults.encrypted),
        }
    }
}

pub fn parse_recover<I, T>(args: I) -> Result<Parsed<RecoverArgs>, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut command = RecoverArgs::command();
    match command.try_get_matches_from_mut(normalize_legacy_flags(args)) {
        Ok(matches) => Ok(Parsed::Run(RecoverArgs::from_arg_matches(&matches)?)),
        Err(e) if e.kind() == ErrorKind::MissingRequiredArgument => {
            Ok(Parsed::Usage(command.render_help().to_string()))
        }
        Err(e) => Err(e.into()),
    }
}
