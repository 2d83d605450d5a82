use std::fmt::Display;

use serde::{Deserialize, Serialize};
use steps_engine::{
    db_types::{Points, WalkForm},
    walk::LocationUpdate,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub telegram_id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChooseFormRequest {
    pub form: WalkForm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkGoal {
    pub subject: i64,
    pub form: WalkForm,
    pub goal: i64,
}

/// A location share, as forwarded by the chat front end. The server stamps it with the time of receipt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LocationReport {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub live: bool,
}

impl LocationReport {
    pub fn into_update(self, subject: i64) -> LocationUpdate {
        LocationUpdate { subject, lat: self.lat, lon: self.lon, timestamp: chrono::Utc::now(), live: self.live }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contribution {
    pub telegram_id: i64,
    pub total: Points,
}

/// Identifies the walker making a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyerRequest {
    pub telegram_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFamilyRequest {
    pub telegram_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteRequest {
    pub telegram_id: i64,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationResponse {
    pub telegram_id: i64,
    pub accept: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveResult {
    /// The family the walker left, if it still exists.
    pub family_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisbandResult {
    /// The pool balance paid to the owner.
    pub returned: Points,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralRequest {
    pub referred_telegram_id: i64,
    pub inviter_telegram_id: i64,
}
