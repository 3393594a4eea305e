//! Bone-name interner.
//!
//! Bone names are compared and hashed on every blend, so they are interned
//! once into compact [`BoneName`] symbols. The table is append-only and shared
//! by every skeleton and motion in the process.

use std::sync::LazyLock;

use lasso::{Spur, ThreadedRodeo};

static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::new);

/// Interned bone name.
pub type BoneName = Spur;

/// Interns a name, returning the existing symbol if it was seen before.
#[inline]
pub fn intern(name: &str) -> BoneName {
    INTERNER.get_or_intern(name)
}

/// Looks up a name without interning it.
///
/// A name that was never interned cannot belong to any skeleton or motion, so
/// `None` doubles as a cheap "unknown bone" answer.
#[inline]
pub fn get(name: &str) -> Option<BoneName> {
    INTERNER.get(name)
}

/// Resolves a symbol back to its string.
#[inline]
pub fn resolve(name: BoneName) -> &'static str {
    INTERNER.resolve(&name)
}
