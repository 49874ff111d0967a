//! Composite cache keys

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tessera_core::TokenType;

/// Separates the parts of a key
const PART_SEPARATOR: char = '\u{1f}';
/// Separates the items of a list part
const ITEM_SEPARATOR: char = '\u{1e}';

/// `type`, `subject`, exclusions, request chain and target.
///
/// Every part keeps its position, so no two distinct requests can run
/// together into one key. Absent and empty lists are the same empty part.
/// Exclusions are always joined in sorted order so that two requests differing
/// only in the order their caller built the set share one entry. The chain
/// keeps caller order since hop order is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(
        token_type: TokenType,
        subject: &str,
        exclude: Option<&BTreeSet<String>>,
        request_chain: Option<&[String]>,
        target: &str,
    ) -> Self {
        let mut key = String::new();
        key.push_str(token_type.as_str());
        key.push(PART_SEPARATOR);
        key.push_str(subject);
        key.push(PART_SEPARATOR);
        push_items(&mut key, exclude.into_iter().flatten());
        key.push(PART_SEPARATOR);
        push_items(&mut key, request_chain.into_iter().flatten());
        key.push(PART_SEPARATOR);
        key.push_str(target);
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn push_items<'a>(key: &mut String, items: impl Iterator<Item = &'a String>) {
    for (i, item) in items.enumerate() {
        if i > 0 {
            key.push(ITEM_SEPARATOR);
        }
        key.push_str(item);
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = self.0.split(PART_SEPARATOR);
        if let Some(first) = parts.next() {
            f.write_str(first)?;
        }
        for part in parts {
            write!(f, "|{}", part.replace(ITEM_SEPARATOR, ","))?;
        }
        Ok(())
    }
}
