//! Stateless identifiers for a single RRset member.
//!
//! A [`RecordId`] is `<name>|<TYPE>|<base64(content)>`. It is derived from the record itself
//! and never stored, so it stays valid for as long as the name, type and content don't change.
//! Content is base64 encoded because it may itself contain `|`, quotes or spaces.

use crate::error::RecordIdError;
use crate::records::RecordType;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;
use std::str::FromStr;

const SEPARATOR: char = '|';

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId {
    pub name: String,
    pub rtype: RecordType,
    pub content: String,
}

impl RecordId {
    pub fn new(name: impl Into<String>, rtype: RecordType, content: impl Into<String>) -> Self {
        RecordId {
            name: name.into(),
            rtype,
            content: content.into(),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.name,
            self.rtype,
            STANDARD.encode(self.content.as_bytes())
        )
    }
}

impl FromStr for RecordId {
    type Err = RecordIdError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = id.split(SEPARATOR).collect();
        let &[name, rtype, content] = parts.as_slice() else {
            return Err(RecordIdError::WrongPartCount {
                id: id.to_string(),
                parts: parts.len(),
            });
        };
        let rtype = rtype
            .parse::<RecordType>()
            .map_err(|_| RecordIdError::UnknownType {
                id: id.to_string(),
                rtype: rtype.to_string(),
            })?;
        let content = STANDARD
            .decode(content)
            .map_err(|source| RecordIdError::InvalidBase64 {
                id: id.to_string(),
                source,
            })?;
        let content =
            String::from_utf8(content).map_err(|_| RecordIdError::InvalidUtf8 { id: id.to_string() })?;
        Ok(RecordId::new(name, rtype, content))
    }
}
