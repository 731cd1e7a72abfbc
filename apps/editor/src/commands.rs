//! Line-oriented commands for the terminal front end.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::backend::ExportFormat;
use crate::dispatch::{EditorEvent, EntryRef};
use crate::models::resume::{CollectionKind, EntryKey, FieldPath};

pub const HELP: &str = "\
Commands:
  set <field> <value>                 personal field, e.g. set full_name Ada Lovelace
  title <value>                       document title
  style <modern|professional|creative|ats|dark>
  add <kind> [field=value ...]        kinds: experiences education skills projects certifications
  edit <kind> <pos|#key> <field> <value>
  rm <kind> <pos|#key>
  blur                                leave the current field (saves pending edits)
  preview                             save pending edits and show the preview
  export <pdf|docx|png>
  score [job description]
  status
  help
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Edit(EditorEvent),
    Preview,
    Export(ExportFormat),
    Score(Option<String>),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("unknown collection '{0}'")]
    UnknownCollection(String),
    #[error("'{0}' is not a position or #key")]
    BadTarget(String),
    #[error("unknown export format '{0}'")]
    UnknownFormat(String),
}

pub fn parse(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let (verb, rest) = split_word(line);
    if verb.is_empty() {
        return Err(ParseError::Empty);
    }

    match verb {
        "set" => {
            let (field, value) = split_word(rest);
            if field.is_empty() {
                return Err(ParseError::Usage("set <field> <value>"));
            }
            let path =
                FieldPath::parse(field).ok_or_else(|| ParseError::UnknownField(field.to_string()))?;
            Ok(Command::Edit(EditorEvent::SetField {
                path,
                value: value.to_string(),
            }))
        }
        "title" => Ok(Command::Edit(EditorEvent::SetField {
            path: FieldPath::Title,
            value: rest.to_string(),
        })),
        "style" => {
            if rest.is_empty() {
                return Err(ParseError::Usage("style <id>"));
            }
            Ok(Command::Edit(EditorEvent::SetField {
                path: FieldPath::Style,
                value: rest.to_string(),
            }))
        }
        "add" => {
            let (kind, rest) = split_word(rest);
            let kind = collection(kind, "add <kind> [field=value ...]")?;
            Ok(Command::Edit(EditorEvent::AddEntry {
                kind,
                defaults: assignments(rest),
            }))
        }
        "edit" => {
            const USAGE: &str = "edit <kind> <pos|#key> <field> <value>";
            let (kind, rest) = split_word(rest);
            let (target, rest) = split_word(rest);
            let (field, value) = split_word(rest);
            if field.is_empty() {
                return Err(ParseError::Usage(USAGE));
            }
            Ok(Command::Edit(EditorEvent::EditEntry {
                kind: collection(kind, USAGE)?,
                target: entry_ref(target, USAGE)?,
                field: field.to_string(),
                value: value.to_string(),
            }))
        }
        "rm" | "remove" => {
            const USAGE: &str = "rm <kind> <pos|#key>";
            let (kind, target) = split_word(rest);
            Ok(Command::Edit(EditorEvent::RemoveEntry {
                kind: collection(kind, USAGE)?,
                target: entry_ref(target, USAGE)?,
            }))
        }
        "blur" => Ok(Command::Edit(EditorEvent::Blur)),
        "preview" => Ok(Command::Preview),
        "export" => {
            let format = ExportFormat::parse(rest)
                .ok_or_else(|| ParseError::UnknownFormat(rest.to_string()))?;
            Ok(Command::Export(format))
        }
        "score" => Ok(Command::Score((!rest.is_empty()).then(|| rest.to_string()))),
        "status" => Ok(Command::Status),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

fn collection(name: &str, usage: &'static str) -> Result<CollectionKind, ParseError> {
    if name.is_empty() {
        return Err(ParseError::Usage(usage));
    }
    CollectionKind::parse(name).ok_or_else(|| ParseError::UnknownCollection(name.to_string()))
}

fn entry_ref(token: &str, usage: &'static str) -> Result<EntryRef, ParseError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(ParseError::Usage(usage));
    }
    let bad = || ParseError::BadTarget(token.to_string());
    match token.strip_prefix('#') {
        Some(raw) => raw
            .parse()
            .map(|raw| EntryRef::Key(EntryKey::from_raw(raw)))
            .map_err(|_| bad()),
        None => token.parse().map(EntryRef::Position).map_err(|_| bad()),
    }
}

/// `field=value` pairs; a value runs until the next `word=`.
fn assignments(input: &str) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for word in input.split_whitespace() {
        match word.split_once('=') {
            Some((field, value)) if !field.is_empty() => {
                if let Some((field, words)) = current.take() {
                    fields.insert(field, words.join(" "));
                }
                let words = if value.is_empty() { Vec::new() } else { vec![value] };
                current = Some((field.to_string(), words));
            }
            _ => {
                if let Some((_, words)) = current.as_mut() {
                    words.push(word);
                }
            }
        }
    }
    if let Some((field, words)) = current {
        fields.insert(field, words.join(" "));
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::PersonalField;

    #[test]
    fn test_set_keeps_value_spaces() {
        assert_eq!(
            parse("set full_name Ada  King Lovelace").unwrap(),
            Command::Edit(EditorEvent::SetField {
                path: FieldPath::Personal(PersonalField::FullName),
                value: "Ada  King Lovelace".to_string(),
            })
        );
    }

    #[test]
    fn test_add_parses_multi_word_assignments() {
        let command = parse("add experience position=Senior Engineer company=Acme Corp").unwrap();
        let Command::Edit(EditorEvent::AddEntry { kind, defaults }) = command else {
            panic!("expected add, got {command:?}");
        };
        assert_eq!(kind, CollectionKind::Experiences);
        assert_eq!(defaults["position"], "Senior Engineer");
        assert_eq!(defaults["company"], "Acme Corp");
    }

    #[test]
    fn test_edit_accepts_position_or_key() {
        assert_eq!(
            parse("edit skills 1 level expert").unwrap(),
            Command::Edit(EditorEvent::EditEntry {
                kind: CollectionKind::Skills,
                target: EntryRef::Position(1),
                field: "level".to_string(),
                value: "expert".to_string(),
            })
        );
        assert_eq!(
            parse("rm projects #4").unwrap(),
            Command::Edit(EditorEvent::RemoveEntry {
                kind: CollectionKind::Projects,
                target: EntryRef::Key(EntryKey::from_raw(4)),
            })
        );
    }

    #[test]
    fn test_score_takes_optional_job_description() {
        assert_eq!(parse("score").unwrap(), Command::Score(None));
        assert_eq!(
            parse("score Rust backend engineer").unwrap(),
            Command::Score(Some("Rust backend engineer".to_string()))
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert_eq!(
            parse("export odt"),
            Err(ParseError::UnknownFormat("odt".to_string()))
        );
        assert_eq!(
            parse("rm hobbies 0"),
            Err(ParseError::UnknownCollection("hobbies".to_string()))
        );
        assert_eq!(
            parse("rm skills first"),
            Err(ParseError::BadTarget("first".to_string()))
        );
        assert_eq!(
            parse("set nickname Ada"),
            Err(ParseError::UnknownField("nickname".to_string()))
        );
        assert!(matches!(parse("edit skills 0"), Err(ParseError::Usage(_))));
    }
}
