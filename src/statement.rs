use thiserror::Error;

use crate::error::{ExecuteError, RowError};
use crate::pager::DbFile;
use crate::row::Row;
use crate::table::{DecodePolicy, Table};

// Non-SQL statements like .exit are called “meta-commands”.
#[derive(Debug, PartialEq, Eq)]
pub enum MetaCommand {
    Exit,
    Unrecognized,
}

impl MetaCommand {
    pub fn parse(input: &str) -> Option<MetaCommand> {
        match input {
            ".exit" => Some(MetaCommand::Exit),
            _ => {
                if input.starts_with('.') {
                    Some(MetaCommand::Unrecognized)
                } else {
                    None
                }
            }
        }
    }
}

/// Why a line could not be turned into a [`Statement`]. All of these are
/// reported to the user and the session goes on.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PrepareError {
    #[error("Syntax error. Could not parse statement.")]
    Syntax,

    #[error("ID must be positive.")]
    NegativeId,

    #[error("String is too long.")]
    StringTooLong(#[source] RowError),

    #[error("Unrecognized command: {0}")]
    Unrecognized(String),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Statement {
    Insert(Row),
    Select,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ExecuteOutcome {
    Inserted,
    Selected(Vec<Row>),
}

impl Statement {
    /// Parses `insert <id> <username> <email>` or `select`.
    ///
    /// Only the leading keyword of a select is looked at.
    pub fn prepare(input: &str) -> Result<Statement, PrepareError> {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        match tokens.first().copied() {
            Some("insert") => {
                let [_, id, username, email] = tokens[..] else {
                    return Err(PrepareError::Syntax);
                };
                let id = parse_id(id)?;
                let row = Row::new(id, username, email).map_err(|e| match e {
                    RowError::StringTooLong { .. } => PrepareError::StringTooLong(e),
                    RowError::Decode { .. } => PrepareError::Syntax,
                })?;
                Ok(Statement::Insert(row))
            }
            Some("select") => Ok(Statement::Select),
            _ => Err(PrepareError::Unrecognized(input.to_string())),
        }
    }

    pub fn execute<F: DbFile>(
        &self,
        table: &mut Table<F>,
        policy: DecodePolicy,
    ) -> Result<ExecuteOutcome, ExecuteError> {
        match self {
            Statement::Insert(row) => {
                table.insert(row)?;
                Ok(ExecuteOutcome::Inserted)
            }
            Statement::Select => Ok(ExecuteOutcome::Selected(table.select_all(policy)?)),
        }
    }
}

fn parse_id(token: &str) -> Result<u32, PrepareError> {
    if let Some(digits) = token.strip_prefix('-') {
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PrepareError::NegativeId);
        }
    }
    token.parse().map_err(|_| PrepareError::Syntax)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::{EMAIL_SIZE, USERNAME_SIZE};

    #[test]
    fn test_meta_command() {
        assert_eq!(MetaCommand::parse(".exit"), Some(MetaCommand::Exit));
        assert_eq!(MetaCommand::parse(".tables"), Some(MetaCommand::Unrecognized));
        assert_eq!(MetaCommand::parse("select"), None);
    }

    #[test]
    fn test_prepare_select() {
        assert_eq!(Statement::prepare("select"), Ok(Statement::Select));
        assert_eq!(Statement::prepare("select * from"), Ok(Statement::Select));
        assert_eq!(
            Statement::prepare("selec"),
            Err(PrepareError::Unrecognized("selec".to_string()))
        );
        assert_eq!(
            Statement::prepare("se"),
            Err(PrepareError::Unrecognized("se".to_string()))
        );
    }

    #[test]
    fn test_prepare_insert() {
        let stmt = Statement::prepare("insert 1 user1 person1@example.com").unwrap();
        assert_eq!(
            stmt,
            Statement::Insert(Row::new(1, "user1", "person1@example.com").unwrap())
        );
    }

    #[test]
    fn test_prepare_insert_wrong_token_count() {
        assert_eq!(Statement::prepare("insert 1 user1"), Err(PrepareError::Syntax));
        assert_eq!(
            Statement::prepare("insert 1 user1 a@b.c extra"),
            Err(PrepareError::Syntax)
        );
    }

    #[test]
    fn test_prepare_insert_bad_id() {
        assert_eq!(
            Statement::prepare("insert abc user1 a@b.c"),
            Err(PrepareError::Syntax)
        );
        assert_eq!(
            Statement::prepare("insert -1 user1 a@b.c"),
            Err(PrepareError::NegativeId)
        );
        assert_eq!(
            Statement::prepare("insert 4294967296 user1 a@b.c"),
            Err(PrepareError::Syntax)
        );
    }

    #[test]
    fn test_prepare_insert_string_length() {
        let username = "a".repeat(USERNAME_SIZE);
        let email = "a".repeat(EMAIL_SIZE);
        assert!(Statement::prepare(&format!("insert 1 {username} {email}")).is_ok());

        let result = Statement::prepare(&format!("insert 1 {username}a {email}"));
        assert!(matches!(result, Err(PrepareError::StringTooLong(_))));
        let result = Statement::prepare(&format!("insert 1 {username} {email}a"));
        assert_eq!(
            result,
            Err(PrepareError::StringTooLong(RowError::StringTooLong {
                field: "email",
                len: EMAIL_SIZE + 1,
                max: EMAIL_SIZE,
            }))
        );
    }

    #[test]
    fn test_execute() -> anyhow::Result<()> {
        let mut table = Table::with_file(Cursor::new(Vec::new()))?;

        let insert = Statement::prepare("insert 5 eve eve@example.com")?;
        assert_eq!(
            insert.execute(&mut table, DecodePolicy::Abort)?,
            ExecuteOutcome::Inserted
        );

        let outcome = Statement::Select.execute(&mut table, DecodePolicy::Abort)?;
        assert_eq!(
            outcome,
            ExecuteOutcome::Selected(vec![Row::new(5, "eve", "eve@example.com")?])
        );

        Ok(())
    }
}
