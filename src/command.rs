//! Line-oriented command language driving a [`Sheet`].
//!
//! ```text
//! A1 = =B1 * 2     set a cell (empty text deletes it)
//! del A1           delete a cell
//! show A1          display string
//! get A1           raw contents
//! up A1 / down A1  upstream / downstream identifiers
//! print            the whole store
//! graph            the dependency graph
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use crate::error::{CommandError, Result};
use cellsheet_core::{CellId, Sheet};
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Set { id: CellId, text: String },
    Delete(CellId),
    Show(CellId),
    Get(CellId),
    Upstream(CellId),
    Downstream(CellId),
    Print,
    Graph,
}

/// Parse one line. Returns `Ok(None)` for blank lines and comments.
///
/// With `validate_ids`, identifiers must follow the `A1` syntax; otherwise
/// any whitespace-free word is accepted as-is.
pub fn parse_line(line: &str, validate_ids: bool) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    if let Some((lhs, rhs)) = line.split_once('=') {
        let lhs = lhs.trim();
        if !lhs.is_empty() && !lhs.contains(char::is_whitespace) {
            let id = cell_id(lhs, validate_ids)?;
            return Ok(Some(Command::Set {
                id,
                text: rhs.to_string(),
            }));
        }
    }

    let mut words = line.split_whitespace();
    let keyword = words.next().unwrap_or_default();
    let (name, command) = match keyword {
        "print" => ("print", Command::Print),
        "graph" => ("graph", Command::Graph),
        "del" | "delete" => ("del", Command::Delete(take_id(&mut words, "del", validate_ids)?)),
        "show" => ("show", Command::Show(take_id(&mut words, "show", validate_ids)?)),
        "get" => ("get", Command::Get(take_id(&mut words, "get", validate_ids)?)),
        "up" => ("up", Command::Upstream(take_id(&mut words, "up", validate_ids)?)),
        "down" => ("down", Command::Downstream(take_id(&mut words, "down", validate_ids)?)),
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    let rest: Vec<&str> = words.collect();
    if !rest.is_empty() {
        return Err(CommandError::Trailing {
            command: name,
            extra: rest.join(" "),
        });
    }
    Ok(Some(command))
}

fn take_id<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    validate_ids: bool,
) -> Result<CellId> {
    let word = words.next().ok_or(CommandError::MissingId(command))?;
    cell_id(word, validate_ids)
}

fn cell_id(word: &str, validate_ids: bool) -> Result<CellId> {
    if validate_ids {
        Ok(word.parse::<CellId>()?)
    } else {
        Ok(CellId::new(word))
    }
}

fn join_ids(ids: &BTreeSet<CellId>) -> String {
    ids.iter()
        .map(CellId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A store plus the options commands run with.
#[derive(Debug, Default)]
pub struct Session {
    pub sheet: Sheet,
    pub validate_ids: bool,
    /// Print the resulting display string after every set.
    pub echo: bool,
}

impl Session {
    pub fn new(sheet: Sheet, validate_ids: bool, echo: bool) -> Self {
        Session {
            sheet,
            validate_ids,
            echo,
        }
    }

    /// Run one command, returning the text it prints, if any.
    pub fn execute(&mut self, command: Command) -> Result<Option<String>> {
        let output = match command {
            Command::Set { id, text } => {
                self.sheet.set_cell(&id, text.as_str())?;
                self.echo.then(|| self.sheet.display_string(&id))
            }
            Command::Delete(id) => {
                self.sheet.delete_cell(&id);
                None
            }
            Command::Show(id) => Some(self.sheet.display_string(&id)),
            Command::Get(id) => Some(self.sheet.contents(&id)),
            Command::Upstream(id) => Some(join_ids(self.sheet.upstream_of(&id))),
            Command::Downstream(id) => Some(join_ids(self.sheet.downstream_of(&id))),
            Command::Print => Some(self.sheet.to_string().trim_end().to_string()),
            Command::Graph => Some(self.sheet.graph().to_string().trim_end().to_string()),
        };
        Ok(output)
    }

    /// Parse and run a single line.
    pub fn run_line(&mut self, line: &str) -> Result<Option<String>> {
        match parse_line(line, self.validate_ids)? {
            Some(command) => {
                debug!(?command, "running");
                self.execute(command)
            }
            None => Ok(None),
        }
    }
}
