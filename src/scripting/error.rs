/// `scripting/error.rs` — diagnostics reported to the host
///
/// Compile and top-level evaluation failures are recovered by the loader and
/// handed back as `ScriptError`. Primitive argument errors are raised inside
/// Lua as `PrimitiveError` so script code can catch them with `pcall`.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    SyntaxError,
    EvaluationError,
    UnknownError,
    MissingFunction,
    InvalidArgument,
    StackImbalance,
    NotImplemented,
    Engine,
}

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("Lua Syntax Error: {message}")]
    Syntax { message: String },

    /// Compile failure that is not a syntax error (e.g. out of memory).
    #[error("Lua Unknown Error: {message}")]
    Unknown { message: String },

    /// The chunk compiled but its top-level body raised.
    #[error("Lua Evaluation Error: {message}")]
    Evaluation { message: String },

    #[error("function `{name}` is not defined by the script")]
    MissingFunction { name: String },

    #[error(transparent)]
    Lua(#[from] mlua::Error),
}

impl ScriptError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScriptError::Syntax { .. } => ErrorKind::SyntaxError,
            ScriptError::Unknown { .. } => ErrorKind::UnknownError,
            ScriptError::Evaluation { .. } => ErrorKind::EvaluationError,
            ScriptError::MissingFunction { .. } => ErrorKind::MissingFunction,
            ScriptError::Lua(_) => ErrorKind::Engine,
        }
    }

    /// Classify a failed `load(...).into_function()`.
    pub(crate) fn from_compile(err: mlua::Error) -> Self {
        match err {
            mlua::Error::SyntaxError { message, .. } => ScriptError::Syntax { message },
            other => ScriptError::Unknown {
                message: other.to_string(),
            },
        }
    }

    pub(crate) fn from_evaluation(err: mlua::Error) -> Self {
        ScriptError::Evaluation {
            message: err.to_string(),
        }
    }

    pub fn diagnostic(&self) -> Diagnostic {
        let message = self.to_string();
        Diagnostic {
            kind: self.kind(),
            line: parse_error_line(&message),
            message,
        }
    }
}

/// Errors raised by host primitives into the calling script.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrimitiveError {
    #[error("{function}: {reason}")]
    InvalidArgument {
        function: &'static str,
        reason: String,
    },
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

impl PrimitiveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PrimitiveError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            PrimitiveError::NotImplemented(_) => ErrorKind::NotImplemented,
        }
    }
}

impl From<PrimitiveError> for mlua::Error {
    fn from(err: PrimitiveError) -> Self {
        mlua::Error::external(err)
    }
}

/// Serialisable form of a failure, for hosts that show errors to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    pub line: Option<u32>,
}

/// Parse a line number from an mlua error message (e.g. `[string "lua-script"]:5: ...`).
pub fn parse_error_line(err: &str) -> Option<u32> {
    let start = err.find("\"]:")? + 3;
    let rest = &err[start..];
    let end = rest.find(':')?;
    rest[..end].trim().parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_is_parsed_from_chunk_prefix() {
        let msg = r#"Lua Syntax Error: [string "lua-script"]:3: unexpected symbol near 'x'"#;
        assert_eq!(parse_error_line(msg), Some(3));
    }

    #[test]
    fn missing_line_is_none() {
        assert_eq!(parse_error_line("function `f` is not defined"), None);
        assert_eq!(parse_error_line(r#"[string "x"]:abc: nope"#), None);
    }

    #[test]
    fn diagnostic_carries_kind_and_line() {
        let err = ScriptError::Evaluation {
            message: r#"runtime error: [string "lua-script"]:12: boom"#.into(),
        };
        let diag = err.diagnostic();
        assert_eq!(diag.kind, ErrorKind::EvaluationError);
        assert_eq!(diag.line, Some(12));
        assert!(diag.message.starts_with("Lua Evaluation Error:"));

        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["kind"], "evaluation_error");
    }

    #[test]
    fn primitive_errors_are_classified() {
        let err = PrimitiveError::InvalidArgument {
            function: "fft_forward",
            reason: "size 7 is not a power of two".into(),
        };
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            err.to_string(),
            "fft_forward: size 7 is not a power of two"
        );
        assert_eq!(
            PrimitiveError::NotImplemented("fft_inverse").kind(),
            ErrorKind::NotImplemented
        );
    }
}
