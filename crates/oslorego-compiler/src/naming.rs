//! Names for the rules generated from parenthesized groups.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::warn;

/// Default prefix of generated rule names.
pub const DEFAULT_ALIAS_PREFIX: &str = "openstack_rule";

/// Hands out rule names that are unique within one compilation run.
pub trait AliasAllocator: Send + Sync {
    /// Returns a name never returned before by this allocator.
    fn allocate(&self) -> String;
}

/// Allocates `<prefix>_1`, `<prefix>_2`, ... in order.
///
/// # Examples
///
/// ```
/// use oslorego_compiler::naming::{AliasAllocator, SequentialAliases};
///
/// let aliases = SequentialAliases::new("group");
/// assert_eq!(aliases.allocate(), "group_1");
/// assert_eq!(aliases.allocate(), "group_2");
/// ```
pub struct SequentialAliases {
    prefix: String,
    next: AtomicUsize,
}

impl SequentialAliases {
    /// Creates an allocator starting at 1.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicUsize::new(1),
        }
    }

    /// Number of names handed out so far.
    #[must_use]
    pub fn allocated(&self) -> usize {
        self.next.load(Ordering::Relaxed) - 1
    }
}

impl Default for SequentialAliases {
    fn default() -> Self {
        Self::new(DEFAULT_ALIAS_PREFIX)
    }
}

impl fmt::Debug for SequentialAliases {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequentialAliases")
            .field("prefix", &self.prefix)
            .field("allocated", &self.allocated())
            .finish()
    }
}

impl AliasAllocator for SequentialAliases {
    fn allocate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}_{n}", self.prefix)
    }
}

/// Wraps an allocator and skips names that are already taken by policy keys.
///
/// An allocator that keeps repeating a reserved name is asked at most once
/// per reserved name plus one; after that the last candidate gets a numeric
/// suffix until it is free.
pub struct ReservedAliases<'a> {
    inner: &'a dyn AliasAllocator,
    reserved: HashSet<&'a str>,
}

impl<'a> ReservedAliases<'a> {
    /// Creates a wrapper that never returns any of `reserved`.
    pub fn new(inner: &'a dyn AliasAllocator, reserved: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            inner,
            reserved: reserved.into_iter().collect(),
        }
    }
}

impl AliasAllocator for ReservedAliases<'_> {
    fn allocate(&self) -> String {
        let mut candidate = String::new();
        for _ in 0..=self.reserved.len() {
            candidate = self.inner.allocate();
            if !self.reserved.contains(candidate.as_str()) {
                return candidate;
            }
        }

        warn!(name = %candidate, "Alias allocator keeps returning reserved names");
        let free = (1..)
            .map(|n: usize| format!("{candidate}_{n}"))
            .find(|name| !self.reserved.contains(name.as_str()));
        free.unwrap_or(candidate)
    }
}
