//! Scoped projector session

use std::ops::{Deref, DerefMut};

use pjlink_client::{Connector, Projector};
use tracing::trace;

use crate::error::Result;
use crate::params::ConnectionParams;

/// An authenticated session that closes itself when dropped
pub(crate) struct Session {
    projector: Box<dyn Projector>,
}

impl Session {
    /// Connect and authenticate
    ///
    /// A failure to authenticate still closes the freshly opened connection.
    pub(crate) fn open(connector: &dyn Connector, params: &ConnectionParams) -> Result<Self> {
        trace!("Opening session to {}:{}", params.host(), params.port());
        let projector = connector.connect(params.host(), params.port(), params.encoding())?;

        let mut session = Self { projector };
        session.projector.authenticate(params.password())?;
        Ok(session)
    }
}

impl Deref for Session {
    type Target = dyn Projector;

    fn deref(&self) -> &Self::Target {
        self.projector.as_ref()
    }
}

impl DerefMut for Session {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.projector.as_mut()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.projector.close();
    }
}
