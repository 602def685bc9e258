pub mod persistence;
pub mod protocol;
pub mod settings;
pub mod transport;

pub use persistence::PersistenceError;
pub use protocol::ProtocolError;
pub use settings::SettingsError;
pub use transport::TransportError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}
