use crate::domain::interval::TimeInterval;
use crate::error::{DeliveryError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Pay per batch is `salary_coeff * BATCH_BASE_PAY`.
const BATCH_BASE_PAY: u64 = 500;

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CourierType {
    Foot,
    Bike,
    Car,
}

impl CourierType {
    /// Maximum total weight of simultaneously assigned orders.
    pub fn capacity(&self) -> Decimal {
        match self {
            CourierType::Foot => dec!(10),
            CourierType::Bike => dec!(15),
            CourierType::Car => dec!(50),
        }
    }

    /// Salary multiplier applied to the per-batch base pay.
    pub fn salary_coeff(&self) -> u64 {
        match self {
            CourierType::Foot => 2,
            CourierType::Bike => 5,
            CourierType::Car => 9,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CourierType::Foot => "foot",
            CourierType::Bike => "bike",
            CourierType::Car => "car",
        }
    }
}

impl FromStr for CourierType {
    type Err = DeliveryError;

    fn from_str(text: &str) -> Result<Self> {
        match text {
            "foot" => Ok(CourierType::Foot),
            "bike" => Ok(CourierType::Bike),
            "car" => Ok(CourierType::Car),
            other => Err(DeliveryError::ValidationError(format!(
                "unknown courier type: {other:?}"
            ))),
        }
    }
}

/// A validated registration command for one courier.
///
/// Construction is the only shape check: once a `NewCourier` exists, the
/// engine trusts its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourier {
    pub id: u32,
    pub r#type: CourierType,
    pub regions: BTreeSet<u32>,
    pub working_hours: Vec<TimeInterval>,
}

impl NewCourier {
    pub fn new(
        id: u32,
        r#type: CourierType,
        regions: Vec<u32>,
        working_hours: Vec<TimeInterval>,
    ) -> Result<Self> {
        if id == 0 {
            return Err(DeliveryError::ValidationError(
                "courier id must be positive".to_string(),
            ));
        }
        Ok(Self {
            id,
            r#type,
            regions: unique_regions(regions)?,
            working_hours,
        })
    }
}

/// A validated profile-change command. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourierPatch {
    pub r#type: Option<CourierType>,
    pub regions: Option<BTreeSet<u32>>,
    pub working_hours: Option<Vec<TimeInterval>>,
}

impl CourierPatch {
    pub fn new(
        r#type: Option<CourierType>,
        regions: Option<Vec<u32>>,
        working_hours: Option<Vec<TimeInterval>>,
    ) -> Result<Self> {
        Ok(Self {
            r#type,
            regions: regions.map(unique_regions).transpose()?,
            working_hours,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.r#type.is_none() && self.regions.is_none() && self.working_hours.is_none()
    }
}

fn unique_regions(regions: Vec<u32>) -> Result<BTreeSet<u32>> {
    if regions.iter().any(|&r| r == 0) {
        return Err(DeliveryError::ValidationError(
            "regions must be positive".to_string(),
        ));
    }
    let unique: BTreeSet<u32> = regions.iter().copied().collect();
    if unique.len() != regions.len() {
        return Err(DeliveryError::ValidationError(
            "regions must be unique".to_string(),
        ));
    }
    Ok(unique)
}

/// A courier aggregate.
///
/// `current_weight` tracks the summed weight of the courier's assigned
/// orders; it may exceed capacity only transiently, between a profile change
/// and the reconciliation that runs in the same operation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Courier {
    pub id: u32,
    pub r#type: CourierType,
    pub regions: BTreeSet<u32>,
    pub working_hours: Vec<TimeInterval>,
    pub current_weight: Decimal,
    /// Accumulated pay over all finished batches. Never decreases.
    pub earnings: u64,
    /// Pay for the current batch, fixed when the batch is assigned.
    pub salary: u64,
    /// When the current batch was assigned (epoch seconds).
    pub assign_time: Option<i64>,
    /// Lead-time base for the next completion in the current batch.
    pub start_time: Option<i64>,
}

impl Courier {
    pub fn new(courier: NewCourier) -> Self {
        Self {
            id: courier.id,
            r#type: courier.r#type,
            regions: courier.regions,
            working_hours: courier.working_hours,
            current_weight: Decimal::ZERO,
            earnings: 0,
            salary: 0,
            assign_time: None,
            start_time: None,
        }
    }

    pub fn capacity(&self) -> Decimal {
        self.r#type.capacity()
    }

    pub fn salary_coeff(&self) -> u64 {
        self.r#type.salary_coeff()
    }

    pub fn overloaded(&self) -> bool {
        self.current_weight > self.capacity()
    }

    /// Opens a new assignment batch: both timestamps start at `now` and the
    /// batch salary is locked in at the courier's current type. This is the
    /// only place `salary` is set.
    pub fn begin_assignment_batch(&mut self, now: i64) {
        self.assign_time = Some(now);
        self.start_time = Some(now);
        self.salary = self.salary_coeff() * BATCH_BASE_PAY;
    }
}
