//! Auth configuration types

/// Authentication configuration
#[derive(Clone, Default, PartialEq, Eq)]
pub enum AuthConfig {
    /// No authentication (used against local mock servers)
    #[default]
    None,

    /// OAuth access token sent as `Authorization: Bearer`
    Bearer {
        /// The access token
        token: String,
    },
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bearer { .. } => f.debug_struct("Bearer").finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_debug_hides_token() {
        let bearer = AuthConfig::Bearer {
            token: "token-secret".into(),
        };
        assert_eq!(format!("{bearer:?}"), "Bearer { .. }");
    }
}
