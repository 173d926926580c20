//! Book identity and identifier generation.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Source of opaque `urn:uuid:` identifier tokens.
///
/// Each call must return a fresh token; the package writer never reuses
/// one token across identifier slots.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random version 4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        format!("urn:uuid:{}", Uuid::new_v4())
    }
}

/// Deterministic tokens counting up from 1, for reproducible output.
#[derive(Debug, Default)]
pub struct SequentialIds {
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("urn:uuid:00000000-0000-4000-8000-{:012x}", n)
    }
}

/// Title and identifier tokens for one converted book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookIdentity {
    pub title: String,
    /// Declared `unique-identifier` of the package.
    pub package_id: String,
    /// `kobo:book-id`
    pub book_id: String,
    /// `kobo:content-id`
    pub content_id: String,
}

impl BookIdentity {
    /// Draw three independent tokens: package id, book-id, content-id.
    pub fn generate(title: impl Into<String>, ids: &dyn IdGenerator) -> Self {
        Self {
            title: title.into(),
            package_id: ids.next_id(),
            book_id: ids.next_id(),
            content_id: ids.next_id(),
        }
    }
}
