//! The user-triggered "send" action.

use crate::error::CoreError;
use crate::events::ConnectionStatus;
use crate::settings::Settings;
use crate::store::ConfigState;
use crate::transport::client;

use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundAction {
    /// Nothing has been received yet, so the peer was asked for its configuration.
    Requested,

    /// The current configuration was sent.
    Sent { bytes: usize },
}

/// Send the current configuration to the remote peer, or request it first.
///
/// Until a configuration has been received there is no baseline worth sending,
/// so a zero-length request goes out instead. Otherwise the `CONFIG_SYNC`
/// ports are refreshed, the wire text is sent and the local file is saved.
///
/// # Errors
///
/// Transport failures are returned; the caller initiated this and must react.
/// A failed local save after a successful send is only logged.
pub async fn send_or_request(
    state: &ConfigState,
    settings: &Settings,
) -> Result<OutboundAction, CoreError> {
    let events = state.events();
    let addr = settings.remote_addr();
    events.status(ConnectionStatus::Sending { addr: addr.clone() });

    if !state.has_baseline().await {
        info!("No configuration received yet; requesting one from {}", addr);
        return match client::request_config(&settings.remote_host, settings.remote_port).await {
            Ok(()) => {
                events.status(ConnectionStatus::Sent { bytes: 0 });
                Ok(OutboundAction::Requested)
            }
            Err(e) => {
                events.status(ConnectionStatus::SendFailed {
                    message: e.to_string(),
                });
                Err(e.into())
            }
        };
    }

    let text = state
        .prepare_outbound(settings.listen_port, settings.remote_port)
        .await;

    let bytes = match client::send_config(&settings.remote_host, settings.remote_port, &text).await
    {
        Ok(bytes) => bytes,
        Err(e) => {
            events.status(ConnectionStatus::SendFailed {
                message: e.to_string(),
            });
            return Err(e.into());
        }
    };
    events.status(ConnectionStatus::Sent { bytes });

    if let Err(e) = state.save().await {
        warn!("Config sent but local save failed: {}", e);
    }

    info!("Configuration sent to {}", addr);
    Ok(OutboundAction::Sent { bytes })
}
