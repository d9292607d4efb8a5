use crate::domain::courier::{CourierPatch, CourierType, NewCourier};
use crate::domain::interval::TimeInterval;
use crate::domain::order::NewOrder;
use crate::error::{DeliveryError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;

/// One boundary command, in the shape the original HTTP API accepted.
///
/// Raw DTOs only mirror the wire shape; [`Command::validate`] turns them
/// into typed commands so the engine never re-checks input shape.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    AddCouriers {
        data: Vec<CourierDto>,
    },
    AddOrders {
        data: Vec<OrderDto>,
    },
    Assign {
        courier_id: i64,
        time: String,
    },
    PatchCourier {
        courier_id: i64,
        #[serde(default)]
        courier_type: Option<String>,
        #[serde(default)]
        regions: Option<Vec<i64>>,
        #[serde(default)]
        working_hours: Option<Vec<String>>,
    },
    Complete {
        courier_id: i64,
        order_id: i64,
        complete_time: String,
    },
    CourierInfo {
        courier_id: i64,
    },
}

#[derive(Debug, Deserialize)]
pub struct CourierDto {
    pub courier_id: i64,
    pub courier_type: String,
    pub regions: Vec<i64>,
    pub working_hours: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderDto {
    pub order_id: i64,
    pub weight: Decimal,
    pub region: i64,
    pub delivery_hours: Vec<String>,
}

/// A command with all shape validation already done.
#[derive(Debug)]
pub enum CheckedCommand {
    AddCouriers(Vec<NewCourier>),
    AddOrders(Vec<NewOrder>),
    Assign {
        courier_id: u32,
        time: i64,
    },
    PatchCourier {
        courier_id: u32,
        patch: CourierPatch,
    },
    Complete {
        courier_id: u32,
        order_id: u32,
        complete_time: i64,
    },
    CourierInfo {
        courier_id: u32,
    },
}

impl Command {
    pub fn validate(self) -> Result<CheckedCommand> {
        match self {
            Command::AddCouriers { data } => {
                let couriers = data
                    .into_iter()
                    .map(CourierDto::validate)
                    .collect::<Result<Vec<_>>>()?;
                Ok(CheckedCommand::AddCouriers(couriers))
            }
            Command::AddOrders { data } => {
                let orders = data
                    .into_iter()
                    .map(OrderDto::validate)
                    .collect::<Result<Vec<_>>>()?;
                Ok(CheckedCommand::AddOrders(orders))
            }
            Command::Assign { courier_id, time } => Ok(CheckedCommand::Assign {
                courier_id: positive_id(courier_id, "courier id")?,
                time: super::time::parse_timestamp(&time)?,
            }),
            Command::PatchCourier {
                courier_id,
                courier_type,
                regions,
                working_hours,
            } => {
                let patch = CourierPatch::new(
                    courier_type.map(|t| t.parse::<CourierType>()).transpose()?,
                    regions.map(positive_ids).transpose()?,
                    working_hours.map(parse_intervals).transpose()?,
                )?;
                if patch.is_empty() {
                    return Err(DeliveryError::ValidationError(
                        "patch must change at least one field".to_string(),
                    ));
                }
                Ok(CheckedCommand::PatchCourier {
                    courier_id: positive_id(courier_id, "courier id")?,
                    patch,
                })
            }
            Command::Complete {
                courier_id,
                order_id,
                complete_time,
            } => Ok(CheckedCommand::Complete {
                courier_id: positive_id(courier_id, "courier id")?,
                order_id: positive_id(order_id, "order id")?,
                complete_time: super::time::parse_timestamp(&complete_time)?,
            }),
            Command::CourierInfo { courier_id } => Ok(CheckedCommand::CourierInfo {
                courier_id: positive_id(courier_id, "courier id")?,
            }),
        }
    }
}

impl CourierDto {
    pub fn validate(self) -> Result<NewCourier> {
        NewCourier::new(
            positive_id(self.courier_id, "courier id")?,
            self.courier_type.parse::<CourierType>()?,
            positive_ids(self.regions)?,
            parse_intervals(self.working_hours)?,
        )
    }
}

impl OrderDto {
    pub fn validate(self) -> Result<NewOrder> {
        NewOrder::new(
            positive_id(self.order_id, "order id")?,
            self.weight,
            positive_id(self.region, "region")?,
            parse_intervals(self.delivery_hours)?,
        )
    }
}

fn positive_id(value: i64, what: &str) -> Result<u32> {
    u32::try_from(value)
        .ok()
        .filter(|&id| id > 0)
        .ok_or_else(|| DeliveryError::ValidationError(format!("{what} must be positive: {value}")))
}

fn positive_ids(values: Vec<i64>) -> Result<Vec<u32>> {
    values
        .into_iter()
        .map(|v| positive_id(v, "region"))
        .collect()
}

fn parse_intervals(texts: Vec<String>) -> Result<Vec<TimeInterval>> {
    texts.iter().map(|text| text.parse()).collect()
}
