/// Fatal compile or runtime error.
///
/// There is exactly one kind of error in Rill. Everything that goes wrong,
/// from a stray token to a division by zero, carries the offending line
/// number and a short message, and stops the pipeline.
pub struct Error {
    line: Option<usize>,
    message: String,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::lang::Error::new(format!($($arg)*))
    };
}

impl Error {
    pub fn new(message: String) -> Error {
        Error {
            line: None,
            message,
        }
    }

    /// Attach a line number, replacing any previous one.
    pub fn in_line(mut self, line: usize) -> Error {
        self.line = Some(line);
        self
    }

    /// Attach a line number only if none is set yet. Inner layers raise
    /// bare errors; the compile/check/execute boundary knows the line.
    pub fn or_line(self, line: usize) -> Error {
        match self.line {
            Some(_) => self,
            None => self.in_line(line),
        }
    }

    pub fn line(&self) -> Option<usize> {
        self.line
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} }}", self)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "line:{} ERROR {}", line, self.message),
            None => write!(f, "ERROR {}", self.message),
        }
    }
}
