use super::Revision;

/// A value together with the revision it was read at.
///
/// Writes against the store are compare-and-swap; the version carried here is
/// the revision the write expects to replace.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    value: T,
    version: Revision,
}

impl<T> Versioned<T> {
    pub fn new(value: T, version: Revision) -> Self {
        Self { value, version }
    }

    pub fn into_parts(self) -> (T, Revision) {
        (self.value, self.version)
    }
}
