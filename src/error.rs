//! Rich diagnostic error types for the Lego classifier.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so users know exactly which part of a
//! document failed to compile and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the Lego classifier.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, sources) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum LegoError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Reasoner(#[from] ReasonerError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Document(#[from] DocumentError),
}

// ---------------------------------------------------------------------------
// Compile errors
// ---------------------------------------------------------------------------

/// Structural failures raised while compiling one assertion or expression.
///
/// All of these are fatal to the assertion being compiled, never to the batch:
/// the batch driver decides whether to skip the assertion or abort the pass.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq)]
pub enum CompileError {
    #[error("no identity for concept \"{description}\"")]
    #[diagnostic(
        code(lego::compile::missing_identity),
        help(
            "Every concept reference needs either a non-empty `uuid` or a coded \
             `sctid`. Add one of them to the concept in the source document."
        )
    )]
    MissingIdentity { description: String },

    #[error("invalid measurement: {reason}")]
    #[diagnostic(
        code(lego::compile::invalid_measurement),
        help(
            "A measurement needs a point, a bound with at least one limit, or an \
             interval with an outer limit. Units, when given on several points, \
             must name the same concept."
        )
    )]
    InvalidMeasurement { reason: String },

    #[error("invalid relation of type {relation_type}: {reason}")]
    #[diagnostic(
        code(lego::compile::invalid_relation),
        help("A relation destination must be an expression, a measurement, text, or a boolean.")
    )]
    InvalidRelation { relation_type: String, reason: String },

    #[error("malformed expression: {reason}")]
    #[diagnostic(
        code(lego::compile::malformed_expression),
        help(
            "An expression node carries exactly one of: a focus concept, or a \
             non-empty list of child expressions."
        )
    )]
    MalformedExpression { reason: String },

    #[error("assertion has no value")]
    #[diagnostic(
        code(lego::compile::missing_value),
        help("Give the assertion an expression, a measurement, non-empty text, or a boolean.")
    )]
    MissingValue,
}

/// Result type for compilation of a single assertion or expression.
pub type CompileResult<T> = std::result::Result<T, CompileError>;

// ---------------------------------------------------------------------------
// Batch errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum BatchError {
    #[error("compilation aborted at assertion {index} of lego {lego}")]
    #[diagnostic(
        code(lego::batch::aborted),
        help(
            "The batch runs with `error_policy = \"abort\"`, so the first failing \
             assertion discards the whole pass. Fix the assertion, or switch to \
             `error_policy = \"skip\"` to classify the remaining assertions."
        )
    )]
    Aborted {
        lego: String,
        index: usize,
        #[source]
        #[diagnostic_source]
        source: CompileError,
    },
}

// ---------------------------------------------------------------------------
// Reasoner errors
// ---------------------------------------------------------------------------

/// Failures reported by a classification engine.
///
/// These are opaque to the compiler and surfaced unchanged to the caller.
#[derive(Debug, Error, Diagnostic)]
pub enum ReasonerError {
    #[error("classification failed: {message}")]
    #[diagnostic(
        code(lego::reasoner::classification),
        help("The engine rejected the axiom set. The pending axioms were kept; fix and resubmit.")
    )]
    Classification { message: String },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    #[diagnostic(
        code(lego::config::io),
        help("Check that the config file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {message}")]
    #[diagnostic(
        code(lego::config::parse),
        help("The config file must be valid TOML matching the CompilerConfig fields.")
    )]
    Parse { message: String },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(lego::config::invalid), help("Check the CompilerConfig fields. {message}"))]
    Invalid { message: String },
}

// ---------------------------------------------------------------------------
// Document errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum DocumentError {
    #[error("failed to read document {path}")]
    #[diagnostic(
        code(lego::document::io),
        help("Check that the document exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse lego document: {message}")]
    #[diagnostic(
        code(lego::document::parse),
        help("Expected a JSON lego list: {{ \"legos\": [ {{ \"assertions\": [...] }} ] }}.")
    )]
    Parse { message: String },
}

/// Convenience alias for functions returning crate-level results.
pub type LegoResult<T> = std::result::Result<T, LegoError>;
