//! Line-oriented prompt over a single open corpus.

use crate::output;
use anyhow::Result;
use docrank_core::{Corpus, DEFAULT_TOP_N};
use std::io::{BufRead, Write};
use std::path::PathBuf;

const HELP: &str = "\
Commands:
  index <path>       (1) index a file or directory
  search <query>     (2) rank documents against a query
  list               (3) list indexed documents
  stats <filename>   (4) show document statistics
  quit               (5) leave the shell";

#[derive(Debug, PartialEq)]
pub enum Command {
    Index(PathBuf),
    Search(String),
    List,
    Stats(String),
    Help,
    Quit,
}

impl Command {
    /// `Ok(None)` for a blank line, `Err` with a user-facing message for anything unusable.
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (verb, arg) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let verb = verb.to_ascii_lowercase();
        let cmd = match (verb.as_str(), arg.is_empty()) {
            ("index" | "1", false) => Command::Index(PathBuf::from(arg)),
            ("search" | "2", false) => Command::Search(arg.to_string()),
            ("list" | "3", true) => Command::List,
            ("stats" | "4", false) => Command::Stats(arg.to_string()),
            ("quit" | "exit" | "5", true) => Command::Quit,
            ("help" | "?", true) => Command::Help,
            ("search" | "2", true) => return Err("Please enter a valid search query.".into()),
            ("index" | "1" | "stats" | "4", true) => return Err(format!("`{verb}` needs an argument")),
            ("list" | "3" | "quit" | "exit" | "5" | "help" | "?", false) => {
                return Err(format!("`{verb}` takes no argument"))
            }
            _ => return Err(format!("unknown command `{verb}`, try `help`")),
        };
        Ok(Some(cmd))
    }
}

pub fn run<R: BufRead, W: Write>(corpus: &mut Corpus, input: R, out: &mut W) -> Result<()> {
    writeln!(out, "{HELP}")?;
    let mut lines = input.lines();
    loop {
        write!(out, "\ndocrank> ")?;
        out.flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        match Command::parse(&line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => break,
            Ok(Some(cmd)) => {
                tracing::debug!(?cmd, "shell command");
                // A failing command is reported and the session continues.
                if let Err(e) = execute(corpus, cmd, out) {
                    writeln!(out, "error: {e:#}")?;
                }
            }
            Err(msg) => writeln!(out, "{msg}")?,
        }
    }
    writeln!(out, "Goodbye!")?;
    Ok(())
}

fn execute<W: Write>(corpus: &mut Corpus, cmd: Command, out: &mut W) -> Result<()> {
    match cmd {
        Command::Index(path) if path.is_dir() => {
            let report = corpus.index_paths(&[path]);
            output::batch(out, &report)?;
        }
        Command::Index(path) => {
            let doc = corpus.index_file(&path)?;
            output::indexed(out, &doc)?;
        }
        Command::Search(query) => {
            let results = corpus.search(&query, DEFAULT_TOP_N)?;
            output::results(out, &query, DEFAULT_TOP_N, &results)?;
        }
        Command::List => output::documents(out, &corpus.list_documents()?)?,
        Command::Stats(filename) => output::stats(out, &corpus.stats(&filename, 10)?)?,
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => {}
    }
    Ok(())
}
