//! Chart configuration errors.

use thiserror::Error;

/// Errors raised while resolving the role map against the chart.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChartError {
    /// A role name in configuration does not match any known role.
    #[error("Unknown account role: {0}")]
    UnknownRole(String),

    /// A role resolves to a code that is not in the chart.
    #[error("Account role {role} maps to missing account {code}")]
    MissingAccount {
        /// The role name.
        role: &'static str,
        /// The configured code.
        code: String,
    },

    /// A role resolves to an account of the wrong type.
    #[error("Account role {role} requires a {expected} account, but {code} is {actual}")]
    WrongAccountType {
        /// The role name.
        role: &'static str,
        /// The configured code.
        code: String,
        /// Required account type.
        expected: &'static str,
        /// Actual account type.
        actual: &'static str,
    },
}
