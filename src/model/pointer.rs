//! JSON pointer locations inside an authored remapper tree
//!
//! Rendered per RFC 6901: the root is the empty string, every segment is
//! prefixed with `/`, and `~` / `/` inside keys are escaped as `~0` / `~1`.

use serde::{Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;

/// A single step in a [`JsonPointer`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object member name
    Key(String),
    /// Array position
    Index(usize),
}

/// Location of a node in a remapper tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPointer {
    segments: SmallVec<[PathSegment; 8]>,
}

impl JsonPointer {
    /// Pointer to the root of the tree
    pub fn root() -> Self {
        Self::default()
    }

    /// Whether this pointer addresses the root
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Pointer to a member of the object at this location
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.into()));
        Self { segments }
    }

    /// Pointer to an element of the array at this location
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    /// Segments from the root down
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                PathSegment::Key(key) => {
                    write!(f, "/{}", key.replace('~', "~0").replace('/', "~1"))?
                }
                PathSegment::Index(index) => write!(f, "/{index}")?,
            }
        }
        Ok(())
    }
}

impl Serialize for JsonPointer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_renders_empty() {
        let root = JsonPointer::root();
        assert!(root.is_root());
        assert_eq!(root.to_string(), "");
    }

    #[test]
    fn test_nested_pointer() {
        let pointer = JsonPointer::root().index(2).key("object.from").key("a/b~c");
        assert_eq!(pointer.to_string(), "/2/object.from/a~1b~0c");
        assert_eq!(pointer.segments().len(), 3);
    }
}
