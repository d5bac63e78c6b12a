//! Connection parameters for one projector

/// Everything needed to open a session with one projector
///
/// Immutable once built. An empty password is stored as `None`, so the
/// device client never sees a literal empty credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    host: String,
    port: u16,
    name: String,
    encoding: String,
    password: Option<String>,
}

impl ConnectionParams {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        name: impl Into<String>,
        encoding: impl Into<String>,
        password: Option<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            name: name.into(),
            encoding: encoding.into(),
            password: normalize_password(password),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Display name chosen by the user
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

/// Treat an empty password as no password
pub fn normalize_password(password: Option<String>) -> Option<String> {
    password.filter(|p| !p.is_empty())
}
