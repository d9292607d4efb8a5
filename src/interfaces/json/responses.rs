use crate::application::engine::{AssignmentOutcome, CourierInfo};
use crate::domain::courier::{Courier, CourierType};
use crate::domain::interval::TimeInterval;
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct IdRef {
    pub id: u32,
}

#[derive(Debug, Serialize)]
pub struct CouriersResponse {
    pub couriers: Vec<IdRef>,
}

#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub orders: Vec<IdRef>,
}

/// Assignment result; `assign_time` is present only when the batch is
/// non-empty.
#[derive(Debug, Serialize)]
pub struct AssignResponse {
    pub orders: Vec<IdRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assign_time: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompleteResponse {
    pub order_id: u32,
}

/// The courier projection returned by profile patches.
#[derive(Debug, Serialize)]
pub struct CourierProfile {
    pub courier_id: u32,
    pub courier_type: CourierType,
    pub regions: Vec<u32>,
    pub working_hours: Vec<TimeInterval>,
}

/// Profile plus financials; `rating` is omitted when undefined.
#[derive(Debug, Serialize)]
pub struct CourierInfoResponse {
    #[serde(flatten)]
    pub profile: CourierProfile,
    pub earnings: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

fn ids(order_ids: &[u32]) -> Vec<IdRef> {
    order_ids.iter().map(|&id| IdRef { id }).collect()
}

impl From<&[u32]> for CouriersResponse {
    fn from(courier_ids: &[u32]) -> Self {
        Self {
            couriers: ids(courier_ids),
        }
    }
}

impl From<&[u32]> for OrdersResponse {
    fn from(order_ids: &[u32]) -> Self {
        Self {
            orders: ids(order_ids),
        }
    }
}

impl From<&AssignmentOutcome> for AssignResponse {
    fn from(outcome: &AssignmentOutcome) -> Self {
        Self {
            orders: ids(&outcome.order_ids),
            assign_time: outcome.assign_time.map(super::time::format_timestamp),
        }
    }
}

impl From<&Courier> for CourierProfile {
    fn from(courier: &Courier) -> Self {
        Self {
            courier_id: courier.id,
            courier_type: courier.r#type,
            regions: courier.regions.iter().copied().collect(),
            working_hours: courier.working_hours.clone(),
        }
    }
}

impl From<&CourierInfo> for CourierInfoResponse {
    fn from(info: &CourierInfo) -> Self {
        Self {
            profile: CourierProfile::from(&info.courier),
            earnings: info.courier.earnings,
            rating: info.rating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::courier::NewCourier;

    #[test]
    fn test_assign_time_omitted_for_empty_batch() {
        let outcome = AssignmentOutcome {
            order_ids: vec![],
            assign_time: None,
        };
        let json = serde_json::to_string(&AssignResponse::from(&outcome)).unwrap();
        assert_eq!(json, r#"{"orders":[]}"#);
    }

    #[test]
    fn test_assign_response_with_batch() {
        let outcome = AssignmentOutcome {
            order_ids: vec![1, 2],
            assign_time: Some(0),
        };
        let json = serde_json::to_string(&AssignResponse::from(&outcome)).unwrap();
        assert_eq!(
            json,
            r#"{"orders":[{"id":1},{"id":2}],"assign_time":"1970-01-01T00:00:00.000"}"#
        );
    }

    #[test]
    fn test_courier_info_omits_missing_rating() {
        let courier = Courier::new(
            NewCourier::new(
                1,
                CourierType::Bike,
                vec![3, 1],
                vec!["09:00-18:00".parse().unwrap()],
            )
            .unwrap(),
        );
        let info = CourierInfo {
            courier,
            rating: None,
        };
        let json = serde_json::to_value(CourierInfoResponse::from(&info)).unwrap();

        assert_eq!(json["courier_id"], 1);
        assert_eq!(json["courier_type"], "bike");
        assert_eq!(json["regions"][0], 1);
        assert_eq!(json["working_hours"][0], "09:00-18:00");
        assert_eq!(json["earnings"], 0);
        assert!(json.get("rating").is_none());
    }

    #[test]
    fn test_courier_info_with_rating() {
        let courier = Courier::new(
            NewCourier::new(1, CourierType::Foot, vec![1], vec![]).unwrap(),
        );
        let info = CourierInfo {
            courier,
            rating: Some(4.17),
        };
        let json = serde_json::to_value(CourierInfoResponse::from(&info)).unwrap();
        assert_eq!(json["rating"], 4.17);
    }
}
