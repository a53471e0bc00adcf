//! SignatureKind enumeration and type-signature helpers
//!
//! Type signatures use the field-descriptor grammar of the traced runtime:
//! a single character for primitives, `L<binary/name>;` for objects and a
//! leading `[` per array dimension.

use serde::{Deserialize, Serialize};

/// Marker that opens an object type signature (`Ljava/lang/String;`)
pub const OBJECT_MARKER: char = 'L';
/// Marker that opens an array type signature (`[I`, `[[Ljava/lang/Object;`)
pub const ARRAY_MARKER: char = '[';

/// Classification of a type signature
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureKind {
    Byte = 0x01,
    Char = 0x02,
    Double = 0x03,
    Float = 0x04,
    Int = 0x05,
    Long = 0x06,
    Short = 0x07,
    Boolean = 0x08,
    Void = 0x09,

    Object = 0x20,
    Array = 0x21,

    Invalid = 0x80,
}

impl SignatureKind {
    /// Classify a type signature by its leading character
    pub fn classify(signature: &str) -> Self {
        match signature.chars().next() {
            Some('B') => SignatureKind::Byte,
            Some('C') => SignatureKind::Char,
            Some('D') => SignatureKind::Double,
            Some('F') => SignatureKind::Float,
            Some('I') => SignatureKind::Int,
            Some('J') => SignatureKind::Long,
            Some('S') => SignatureKind::Short,
            Some('Z') => SignatureKind::Boolean,
            Some('V') => SignatureKind::Void,
            Some(OBJECT_MARKER) => SignatureKind::Object,
            Some(ARRAY_MARKER) => SignatureKind::Array,
            _ => SignatureKind::Invalid,
        }
    }

    /// Whether values of this kind are references (objects or arrays)
    pub fn is_reference(self) -> bool {
        matches!(self, SignatureKind::Object | SignatureKind::Array)
    }
}

/// Convert a class signature into a dotted display name.
///
/// `Ljava/lang/String;` becomes `java.lang.String`, `[[I` becomes `int[][]`.
/// Input that does not parse as a signature is returned unchanged.
pub fn class_display_name(signature: &str) -> String {
    let dims = signature.chars().take_while(|c| *c == ARRAY_MARKER).count();
    let element = &signature[dims..];

    let base = match SignatureKind::classify(element) {
        SignatureKind::Object => match element
            .strip_prefix(OBJECT_MARKER)
            .and_then(|rest| rest.strip_suffix(';'))
        {
            Some(binary_name) if !binary_name.is_empty() => binary_name.replace('/', "."),
            _ => return signature.to_string(),
        },
        SignatureKind::Invalid | SignatureKind::Array => return signature.to_string(),
        kind if element.len() == 1 => primitive_name(kind).to_string(),
        _ => return signature.to_string(),
    };

    let mut name = base;
    for _ in 0..dims {
        name.push_str("[]");
    }
    name
}

fn primitive_name(kind: SignatureKind) -> &'static str {
    match kind {
        SignatureKind::Byte => "byte",
        SignatureKind::Char => "char",
        SignatureKind::Double => "double",
        SignatureKind::Float => "float",
        SignatureKind::Int => "int",
        SignatureKind::Long => "long",
        SignatureKind::Short => "short",
        SignatureKind::Boolean => "boolean",
        SignatureKind::Void => "void",
        _ => "?",
    }
}
