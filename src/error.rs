#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Bad CLI arguments, unreadable files, malformed tables (exit code 2).
    pub fn input(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    /// Bad observation data, e.g. an unknown satellite id or a pixel missing a
    /// mandatory channel (exit code 3).
    pub fn data(message: impl Into<String>) -> Self {
        Self::new(3, message)
    }

    /// Database errors (exit code 4).
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(4, message)
    }

    /// Internal consistency errors: the algorithm selector and the retrieval
    /// dispatch have drifted out of sync. Never expected in correct operation
    /// (exit code 70).
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(70, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
