// Host command scripts: one command per line, '#' starts a comment

use anyhow::{anyhow, bail, Context, Result};
use std::fmt;

use crate::tour::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptCommand {
    Start(usize),
    Advance(Action, Option<usize>),
    Press(Action),
    Open,
    Settle,
    Reset,
}

impl fmt::Display for ScriptCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptCommand::Start(index) => write!(f, "start {index}"),
            ScriptCommand::Advance(action, Some(index)) => write!(f, "{action} {index}"),
            ScriptCommand::Advance(action, None) => write!(f, "{action}"),
            ScriptCommand::Press(action) => write!(f, "press {action}"),
            ScriptCommand::Open => f.write_str("open"),
            ScriptCommand::Settle => f.write_str("settle"),
            ScriptCommand::Reset => f.write_str("reset"),
        }
    }
}

fn parse_action(word: &str) -> Result<Action> {
    let action = match word {
        "start" => Action::Start,
        "stop" => Action::Stop,
        "next" => Action::Next,
        "prev" => Action::Prev,
        "go" => Action::Go,
        "update" => Action::Update,
        "close" => Action::Close,
        "skip" => Action::Skip,
        "reset" => Action::Reset,
        other => bail!("unknown action '{}'", other),
    };
    Ok(action)
}

fn parse_line(line: &str) -> Result<Option<ScriptCommand>> {
    let line = line.split('#').next().unwrap_or_default().trim();
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&keyword, args)) = words.split_first() else {
        return Ok(None);
    };

    let index = match args {
        [] => None,
        [value] if keyword != "press" => Some(
            value
                .parse::<usize>()
                .with_context(|| format!("'{}' is not a step index", value))?,
        ),
        [_] => None,
        _ => bail!("too many arguments for '{}'", keyword),
    };

    let command = match (keyword, index, args) {
        ("start", index, _) => ScriptCommand::Start(index.unwrap_or(0)),
        ("open", None, _) => ScriptCommand::Open,
        ("settle", None, _) => ScriptCommand::Settle,
        ("reset", None, _) => ScriptCommand::Reset,
        ("press", _, [action]) => ScriptCommand::Press(parse_action(action)?),
        ("press", _, _) => bail!("'press' needs a control: next, prev, close or skip"),
        ("go" | "update", None, _) => bail!("'{}' needs a step index", keyword),
        ("stop" | "skip" | "open" | "settle" | "reset", Some(_), _) => {
            bail!("'{}' takes no index", keyword)
        }
        ("next" | "prev" | "go" | "update" | "close" | "stop" | "skip", index, _) => {
            ScriptCommand::Advance(parse_action(keyword)?, index)
        }
        (other, _, _) => bail!("unknown command '{}'", other),
    };
    Ok(Some(command))
}

/// Parse a whole script. Errors name the offending line.
pub fn parse_script(content: &str) -> Result<Vec<ScriptCommand>> {
    content
        .lines()
        .enumerate()
        .filter_map(|(number, line)| {
            parse_line(line)
                .map_err(|e| anyhow!("line {}: {}", number + 1, e))
                .transpose()
        })
        .collect()
}
