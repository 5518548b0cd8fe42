//! Data model for remapper trees and the values flowing through them

pub mod number;
pub mod pointer;
pub mod remapper;
pub mod types;
pub mod value;

pub use number::Numeric;
pub use pointer::{JsonPointer, PathSegment};
pub use remapper::{Remapper, Step, is_mixed_sequence, is_sequence};
pub use types::ValueKind;
pub use value::{ValueExt, resolve_path, split_path};
