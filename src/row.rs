use std::fmt;

use crate::error::RowError;
use crate::{EMAIL_OFFSET, EMAIL_SIZE, ID_OFFSET, ID_SIZE, ROW_SIZE, USERNAME_OFFSET, USERNAME_SIZE};

/// A single record of the fixed `(id, username, email)` schema.
///
/// Text fields are stored as zero-padded byte arrays of their column capacity,
/// so a `Row` always encodes to exactly [`ROW_SIZE`] bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    id: u32,
    username: [u8; USERNAME_SIZE],
    email: [u8; EMAIL_SIZE],
}

impl Row {
    /// Builds a row, rejecting text that does not fit its column.
    pub fn new(id: u32, username: &str, email: &str) -> Result<Self, RowError> {
        Ok(Self {
            id,
            username: fixed_field("username", username.as_bytes())?,
            email: fixed_field("email", email.as_bytes())?,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn username(&self) -> &[u8] {
        trim_padding(&self.username)
    }

    pub fn email(&self) -> &[u8] {
        trim_padding(&self.email)
    }

    pub fn encode(&self) -> [u8; ROW_SIZE] {
        let mut buf = [0u8; ROW_SIZE];
        buf[ID_OFFSET..ID_OFFSET + ID_SIZE].copy_from_slice(&self.id.to_be_bytes());
        buf[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE].copy_from_slice(&self.username);
        buf[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE].copy_from_slice(&self.email);
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, RowError> {
        if bytes.len() < ROW_SIZE {
            return Err(RowError::Decode {
                expected: ROW_SIZE,
                actual: bytes.len(),
            });
        }

        let mut id = [0u8; ID_SIZE];
        id.copy_from_slice(&bytes[ID_OFFSET..ID_OFFSET + ID_SIZE]);
        let mut username = [0u8; USERNAME_SIZE];
        username.copy_from_slice(&bytes[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE]);
        let mut email = [0u8; EMAIL_SIZE];
        email.copy_from_slice(&bytes[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE]);

        Ok(Self {
            id: u32::from_be_bytes(id),
            username,
            email,
        })
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.id,
            String::from_utf8_lossy(self.username()),
            String::from_utf8_lossy(self.email())
        )
    }
}

fn fixed_field<const N: usize>(field: &'static str, value: &[u8]) -> Result<[u8; N], RowError> {
    if value.len() > N {
        return Err(RowError::StringTooLong {
            field,
            len: value.len(),
            max: N,
        });
    }
    let mut buf = [0u8; N];
    buf[..value.len()].copy_from_slice(value);
    Ok(buf)
}

// Display-only: the stored field keeps its padding.
fn trim_padding(field: &[u8]) -> &[u8] {
    let end = field.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &field[..end]
}
