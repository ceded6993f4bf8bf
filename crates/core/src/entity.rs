//! Records with a stable identity.

/// Something the catalog stores under a key that never changes.
///
/// The id is assigned once at creation; updates replace every other field.
pub trait Entity {
    type Id: Copy + Ord + core::fmt::Display + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Owned copy of the id, for use as a map key.
    fn key(&self) -> Self::Id {
        *self.id()
    }
}
