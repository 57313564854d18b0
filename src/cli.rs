//! Line-oriented command interpreter for [`Session`].
//!
//! Each input line is split into words (double or single quotes group words) and parsed with
//! clap as one command.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::error::ErrorKind as ClapErrorKind;
use clap::{Parser, Subcommand, ValueEnum};

use crate::processing::{Comparison, Predicate, SortKey};
use crate::session::Session;
use crate::types::Value;

pub const PROMPT: &str = "data-filter> ";

const HELP: &str = "\
Commands:
  load <file>                         load a .csv, .json or .xml file
  display [--limit N]                 print the current data (0 = all)
  stats [field] [--json]              numeric, boolean and list statistics
  sort <key[:asc|:desc]>... [--reverse]
                                      sort by one or more keys
  filter <field> <value>... [--comparison eq|lt|gt] [--mode MODE]
                                      keep matching records; MODE is one of compare, contains,
                                      starts-with, ends-with, all-elements, list-min, list-max,
                                      list-average, list-size
  reset                               undo every filter and sort
  save <file>                         write the current data (format from the extension)
  help                                show this message
  exit | quit                         leave
";

#[derive(Debug, Parser)]
#[command(multicall = true, disable_help_subcommand = true)]
struct ReplLine {
    #[command(subcommand)]
    command: ReplCommand,
}

/// One interactive command.
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum ReplCommand {
    /// Load a .csv, .json or .xml file
    Load { file: PathBuf },
    /// Print the current data
    Display {
        /// Maximum rows or records to print; 0 prints everything
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show statistics for the current data
    Stats {
        field: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Sort by one or more keys
    Sort {
        #[arg(required = true)]
        keys: Vec<SortKey>,
        #[arg(long)]
        reverse: bool,
    },
    /// Keep matching records
    Filter {
        field: String,
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<String>,
        #[arg(long, default_value = "eq")]
        comparison: Comparison,
        #[arg(long, value_enum, default_value_t = FilterMode::Compare)]
        mode: FilterMode,
    },
    /// Restore the loaded data
    Reset,
    /// Write the current data to a file
    Save { file: PathBuf },
    /// Show available commands
    Help,
    /// Leave the session
    #[command(alias = "quit")]
    Exit,
}

/// Which predicate a `filter` command builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterMode {
    Compare,
    Contains,
    StartsWith,
    EndsWith,
    AllElements,
    ListMin,
    ListMax,
    ListAverage,
    ListSize,
}

/// Build the predicate for `filter <field> <values>...`.
///
/// A single value is coerced with [`Value::from_token`]; several values are joined with spaces
/// into one string, except for `all-elements` where each value is one list element.
pub fn build_predicate(
    field: &str,
    values: &[String],
    comparison: Comparison,
    mode: FilterMode,
) -> anyhow::Result<Predicate> {
    let joined = values.join(" ");
    let scalar = match values {
        [single] => Value::from_token(single),
        _ => Value::Utf8(joined.clone()),
    };

    Ok(match mode {
        FilterMode::Compare => Predicate::compare(field, comparison, scalar),
        FilterMode::Contains => Predicate::contains(field, joined),
        FilterMode::StartsWith => Predicate::starts_with(field, joined),
        FilterMode::EndsWith => Predicate::ends_with(field, joined),
        FilterMode::AllElements => {
            Predicate::list_contains_all(field, values.iter().map(|v| Value::from_token(v)).collect())
        }
        FilterMode::ListMin => Predicate::list_min(field, scalar),
        FilterMode::ListMax => Predicate::list_max(field, scalar),
        FilterMode::ListAverage => {
            let bound = joined
                .parse::<f64>()
                .with_context(|| format!("list-average needs a number, got '{joined}'"))?;
            Predicate::list_average(field, comparison, bound)
        }
        FilterMode::ListSize => {
            let bound = joined
                .parse::<usize>()
                .with_context(|| format!("list-size needs a non-negative integer, got '{joined}'"))?;
            Predicate::list_size(field, comparison, bound)
        }
    })
}

/// Split a command line into words. Quotes group words and are removed.
pub fn split_line(line: &str) -> anyhow::Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if let Some(q) = quote {
        anyhow::bail!("unterminated {q} quote");
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Parse one line into a command. `Ok(None)` for a blank line.
pub fn parse_line(line: &str) -> anyhow::Result<Option<ReplCommand>> {
    let words = split_line(line)?;
    if words.is_empty() {
        return Ok(None);
    }
    let mut words = words;
    words[0] = words[0].to_ascii_lowercase();
    let parsed = ReplLine::try_parse_from(words)?;
    Ok(Some(parsed.command))
}

/// What the loop should do after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Output(String),
    Exit,
}

/// Run one parsed command against the session.
pub fn execute(session: &mut Session, command: ReplCommand) -> anyhow::Result<Reply> {
    log::debug!("executing {command:?}");
    let text = match command {
        ReplCommand::Load { file } => session.load(&file)?,
        ReplCommand::Display { limit } => session.display(limit)?,
        ReplCommand::Stats { field, json } => session.stats(field.as_deref(), json)?,
        ReplCommand::Sort { keys, reverse } => session.sort(&keys, reverse)?,
        ReplCommand::Filter {
            field,
            values,
            comparison,
            mode,
        } => {
            let predicate = build_predicate(&field, &values, comparison, mode)?;
            session.filter(&predicate)?
        }
        ReplCommand::Reset => session.reset()?,
        ReplCommand::Save { file } => session.save(&file)?,
        ReplCommand::Help => HELP.to_string(),
        ReplCommand::Exit => return Ok(Reply::Exit),
    };
    Ok(Reply::Output(text))
}

/// Read commands from `input` until `exit`, `quit` or end of input.
///
/// Command failures are written as `error: ...` and the loop continues.
pub fn run_repl<R: BufRead, W: Write>(session: &mut Session, mut input: R, mut output: W) -> anyhow::Result<()> {
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }

        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                match err.downcast_ref::<clap::Error>() {
                    Some(clap_err) if clap_err.kind() == ClapErrorKind::DisplayHelp => {
                        write!(output, "{clap_err}")?;
                    }
                    Some(clap_err) => write!(output, "{}", clap_err.render())?,
                    None => writeln!(output, "error: {err:#}")?,
                }
                continue;
            }
        };

        match execute(session, command) {
            Ok(Reply::Exit) => break,
            Ok(Reply::Output(text)) => {
                output.write_all(text.as_bytes())?;
                if !text.ends_with('\n') {
                    writeln!(output)?;
                }
            }
            Err(err) => {
                log::debug!("command failed: {err:?}");
                writeln!(output, "error: {err:#}")?;
            }
        }
    }
    Ok(())
}
