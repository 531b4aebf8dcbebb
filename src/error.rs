use thiserror::Error;

/// Errors raised by the table engine (parsing, editing and exporting).
#[derive(Error, Debug)]
pub enum TableError {
    #[error("{}", parse_message(.message, .line))]
    Parse { message: String, line: Option<usize> },

    #[error("cell ({row}, {col}) is out of range")]
    Index { row: usize, col: usize },

    #[error("flag cell expects true or false, got {0:?}")]
    InvalidFlag(String),

    #[error("{0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

impl TableError {
    pub fn parse(message: impl Into<String>) -> Self {
        TableError::Parse {
            message: message.into(),
            line: None,
        }
    }
}

fn parse_message(message: &str, line: &Option<usize>) -> String {
    match line {
        Some(line) => format!("CSV parse error at line {line}: {message}"),
        None => format!("CSV parse error: {message}"),
    }
}

pub type Result<T> = std::result::Result<T, TableError>;
