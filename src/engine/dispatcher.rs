//! # Command Dispatcher
//!
//! Routes a decoded inbound frame to the AT parameter engine, the transmit path
//! or the loopback echo. Identifiers the engine does not serve are reported back
//! as ignored and never answered.

use crate::api::at::{read_parameter, set_parameter, AtAction, AtContext, AtParameterTable, AtTarget};
use crate::api::command::Command;
use crate::api::frame::ApiFrame;
use crate::engine::transmit::TransmitPath;
use crate::error::BeeError;
use crate::radio::driver::{RadioConfig, RadioLayer};
use log::debug;

/// Engine state a command may read or change.
pub struct DispatchContext<'a, R> {
    pub radio_config: &'a mut RadioConfig,
    pub transmit: &'a mut TransmitPath<R>,
    pub at_table: &'a AtParameterTable,
    /// Buffer for the reply, if the command has one
    pub response: &'a mut ApiFrame,
}

/// What happened to a dispatched frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// `response` holds a reply for the host
    Respond,
    /// Reply, then reset the node
    RespondThenReset,
    /// Handed to the radio
    Transmitted,
    /// Accepted without a reply
    Consumed,
    /// Identifier not served here
    Ignored(u8),
}

/// Dispatches one inbound frame.
pub fn dispatch<R: RadioLayer>(
    frame: &ApiFrame,
    ctx: &mut DispatchContext<'_, R>,
) -> Result<DispatchOutcome, BeeError> {
    let command = Command::parse(frame.payload())?;

    let outcome = match command {
        Command::AtRead(request) => {
            debug!("AT read {} (frame id {})", request.code, request.frame_id);
            let at = AtContext {
                radio: &*ctx.radio_config,
                template: ctx.transmit.template(),
            };
            match read_parameter(ctx.at_table, &request, &at, ctx.response)? {
                AtAction::SoftwareReset => DispatchOutcome::RespondThenReset,
                AtAction::None => DispatchOutcome::Respond,
            }
        }
        Command::AtWrite(request) => {
            debug!("AT write {} (frame id {})", request.code, request.frame_id);
            let (template, _) = ctx.transmit.parts_mut();
            let mut target = AtTarget {
                radio: &mut *ctx.radio_config,
                template,
            };
            if set_parameter(ctx.at_table, &request, &mut target, ctx.response)? {
                DispatchOutcome::Respond
            } else {
                DispatchOutcome::Consumed
            }
        }
        Command::Transmit(request) => {
            debug!(
                "Transmit request {} to {}",
                request.frame_id, request.destination
            );
            ctx.transmit.send(&request)?;
            DispatchOutcome::Transmitted
        }
        Command::Loopback(payload) => {
            debug!("Loopback of {} bytes", payload.len());
            ctx.response.clear();
            ctx.response.extend_from_slice(payload)?;
            ctx.response.seal();
            DispatchOutcome::Respond
        }
        Command::Unhandled(identifier) => {
            debug!("Identifier 0x{:02X} not handled, frame dropped", identifier);
            DispatchOutcome::Ignored(identifier)
        }
    };
    Ok(outcome)
}
