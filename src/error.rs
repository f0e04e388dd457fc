/// Errors returned when reconfiguring a table.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// The requested maximum load factor is outside the open interval
    /// `(0.1, 0.95)`.
    #[error("invalid max load factor {factor}: must lie strictly between 0.1 and 0.95")]
    InvalidConfiguration {
        /// The rejected factor.
        factor: f32,
    },
}
