use std::sync::Arc;

use self::adapters::HttpRemote;
use crate::{config::ServerSettings, internals::core::ports::RemotePorts, error::RemoteError};

pub mod adapters;

pub struct RemoteModule {
    pub ports: RemotePorts,
}

impl RemoteModule {
    pub fn initialize(settings: &ServerSettings) -> Result<Self, RemoteError> {
        let remote = Arc::new(HttpRemote::new(settings)?);
        Ok(Self {
            ports: RemotePorts::from_remote(remote),
        })
    }
}
