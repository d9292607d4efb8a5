use crate::application::engine::DispatchEngine;
use crate::error::{DeliveryError, Result};
use crate::interfaces::json::commands::{CheckedCommand, Command};
use crate::interfaces::json::responses::{
    AssignResponse, CompleteResponse, CourierInfoResponse, CourierProfile, CouriersResponse,
    OrdersResponse,
};
use std::io::{BufRead, BufReader, Read};

/// Reads boundary commands from a JSON-lines source, one command object per
/// line. Blank lines are skipped.
pub struct ScriptReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> ScriptReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: BufReader::new(source),
        }
    }

    /// Returns an iterator that lazily reads and deserializes commands.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .lines()
            .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
            .map(|line| {
                let line = line?;
                serde_json::from_str(&line).map_err(DeliveryError::from)
            })
    }
}

/// Runs one already-validated command against the engine and serializes the
/// result the way the original service's response schemas did.
pub async fn execute(engine: &DispatchEngine, command: CheckedCommand) -> Result<String> {
    let line = match command {
        CheckedCommand::AddCouriers(batch) => {
            let ids = engine.add_couriers(batch).await?;
            serde_json::to_string(&CouriersResponse::from(ids.as_slice()))?
        }
        CheckedCommand::AddOrders(batch) => {
            let ids = engine.add_orders(batch).await?;
            serde_json::to_string(&OrdersResponse::from(ids.as_slice()))?
        }
        CheckedCommand::Assign { courier_id, time } => {
            let outcome = engine.assign_orders(courier_id, time).await?;
            serde_json::to_string(&AssignResponse::from(&outcome))?
        }
        CheckedCommand::PatchCourier { courier_id, patch } => {
            let courier = engine.patch_courier(courier_id, patch).await?;
            serde_json::to_string(&CourierProfile::from(&courier))?
        }
        CheckedCommand::Complete {
            courier_id,
            order_id,
            complete_time,
        } => {
            let order_id = engine.complete_order(courier_id, order_id, complete_time).await?;
            serde_json::to_string(&CompleteResponse { order_id })?
        }
        CheckedCommand::CourierInfo { courier_id } => {
            let info = engine.courier_info(courier_id).await?;
            serde_json::to_string(&CourierInfoResponse::from(&info))?
        }
    };
    Ok(line)
}
