use thiserror::Error;

/// Input at `offset` matches no token pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}, column {column}: no token matches input starting at {snippet:?}")]
pub struct LexError {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    pub snippet: String,
}

impl LexError {
    pub(crate) fn at(input: &str, offset: usize) -> Self {
        let (line, column) = line_col(input, offset);
        let snippet: String = input[offset..].chars().take(16).collect();
        Self {
            offset,
            line,
            column,
            snippet,
        }
    }
}

/// Statement-level grammar violation. Always fatal for the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{uri}: {source}")]
    Lex {
        uri: String,
        #[source]
        source: LexError,
    },

    #[error("{uri}:{line}: prefix `{prefix}` not defined")]
    UndefinedPrefix {
        uri: String,
        line: usize,
        prefix: String,
    },

    #[error("{uri}:{line}: unexpected {token}, expected {expected}")]
    UnexpectedToken {
        uri: String,
        line: usize,
        token: String,
        expected: &'static str,
    },

    #[error("{uri}:{line}: `{terminator}` ends an incomplete statement")]
    IncompleteStatement {
        uri: String,
        line: usize,
        terminator: char,
    },

    #[error("{uri}:{line}: unbalanced `{bracket}`")]
    UnbalancedBracket {
        uri: String,
        line: usize,
        bracket: char,
    },

    #[error("{uri}: unexpected end of input: {reason}")]
    UnexpectedEof { uri: String, reason: &'static str },

    #[error("{uri}:{line}: literal not allowed in {position} position")]
    LiteralNotAllowed {
        uri: String,
        line: usize,
        position: &'static str,
    },
}

impl ParseError {
    /// The document the error was raised for.
    pub fn uri(&self) -> &str {
        match self {
            ParseError::Lex { uri, .. }
            | ParseError::UndefinedPrefix { uri, .. }
            | ParseError::UnexpectedToken { uri, .. }
            | ParseError::IncompleteStatement { uri, .. }
            | ParseError::UnbalancedBracket { uri, .. }
            | ParseError::UnexpectedEof { uri, .. }
            | ParseError::LiteralNotAllowed { uri, .. } => uri,
        }
    }
}

/// 1-based line and column (in chars) of a byte offset.
pub(crate) fn line_col(input: &str, offset: usize) -> (usize, usize) {
    let before = &input[..offset.min(input.len())];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rsplit('\n')
        .next()
        .map_or(0, |tail| tail.chars().count())
        + 1;
    (line, column)
}
