/// Top-level error type. All public API functions return this.
#[derive(Debug, thiserror::Error)]
pub enum NapfixError {
    #[error("Union type definition failed: {0}")]
    Definition(#[from] DefinitionError),

    #[error("Union value construction failed: {0}")]
    Construction(#[from] ConstructionError),

    #[error("Field access failed: {0}")]
    FieldAccess(#[from] FieldAccessError),

    #[error("Internal error: {0}")]
    Internal(#[from] InternalError),

    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Detection error: {0}")]
    Detect(#[from] DetectError),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Repair error: {0}")]
    Repair(#[from] RepairError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Raised at `build_union_type` time. No partial registry is ever produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("No variants specified for union type {type_name}")]
    NoVariants { type_name: String },

    #[error("Duplicate variant {variant} in union type {type_name}")]
    DuplicateVariant { type_name: String, variant: String },

    #[error("Duplicate field {field} in variant {type_name}.{variant}")]
    DuplicateField {
        type_name: String,
        variant: String,
        field: String,
    },
}

/// Raised by a variant constructor (or `replace`). Fatal to that one
/// construction attempt only; the registry and existing values are untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    #[error("{type_name}.{variant}'s constructor expected {expected} args, got {got}")]
    ArityMismatch {
        type_name: String,
        variant: String,
        expected: usize,
        got: usize,
    },

    #[error("{type_name}.{variant}'s constructor got unexpected field '{field}'")]
    UnknownField {
        type_name: String,
        variant: String,
        field: String,
    },

    #[error("{type_name}.{variant}'s constructor got field '{field}' more than once")]
    DuplicateField {
        type_name: String,
        variant: String,
        field: String,
    },
}

/// Raised by a field accessor invoked on a value holding a different variant.
/// Always recoverable; guard with `UnionValue::is` first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldAccessError {
    #[error("{type_name}.{variant} value has no field '{field}'")]
    NoSuchField {
        type_name: String,
        variant: String,
        field: String,
    },
}

/// A bug in the facility itself, not a caller error. No public path can
/// produce a value with an out-of-range discriminant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InternalError {
    #[error(
        "Illegal discriminant {discriminant} for union type {type_name} ({variant_count} variants)"
    )]
    BadDiscriminant {
        type_name: String,
        discriminant: usize,
        variant_count: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error("Character {ch:?} has no windows-1252 encoding")]
    Unmappable { ch: char },
}

#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("File {path} is not valid UTF-8: {detail}")]
    InvalidUtf8 { path: String, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("No such file or directory: {path}")]
    NoSuchPath { path: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum RepairError {
    #[error("Backup of {path} failed: {detail}")]
    BackupFailed { path: String, detail: String },

    #[error(transparent)]
    Detect(#[from] DetectError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
