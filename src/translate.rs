//! Rewrites zone store rejections into messages a person poking at DNS can act on.
//!
//! The zone store only reports failures as free text, so recognition is by substring. Anything
//! unrecognised passes through untouched.

use crate::error::Error;
use crate::zone::ZoneRecord;

const CNAME_CONFLICT: &str = "Conflicts with pre-existing";
const DUPLICATE: &str = "Duplicate record in RRset";
const SINGLETON: &str = "has more than one record";

/// Translate `err`, raised while pushing `record`, into an [`Error::Conflict`] when it's one of
/// the rejections we know how to explain.
pub fn translate(err: Error, record: &ZoneRecord) -> Error {
    let conflict = match &err {
        Error::Backend { message, .. } => explain(message, record),
        _ => None,
    };
    conflict.map_or(err, Error::Conflict)
}

fn explain(message: &str, record: &ZoneRecord) -> Option<String> {
    let ZoneRecord {
        name,
        rtype,
        content,
        ..
    } = record;
    if message.contains(CNAME_CONFLICT) {
        Some(format!(
            "can't create record for {name}: CNAME records aren't allowed to coexist with other records"
        ))
    } else if message.contains(DUPLICATE) {
        Some(format!(
            "there's already a record with name {name}, type {rtype}, and content {content}"
        ))
    } else if message.contains(SINGLETON) {
        Some(format!(
            "a name is only allowed to have one {rtype} record, and {name} already has one"
        ))
    } else {
        None
    }
}
