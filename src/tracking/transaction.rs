//! Tracked bridge transaction record

use crate::error::{BridgeError, BridgeResult};
use crate::types::{BridgeRoute, BridgeStatus, BridgeStatusResponse};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Highest progress a non-terminal transaction can report
pub const MAX_IN_FLIGHT_PROGRESS: u8 = 94;

/// A submitted transfer and its last known status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeTransaction {
    /// Source-chain transaction hash
    pub id: String,
    pub from_chain: u64,
    pub to_chain: u64,
    pub from_token: String,
    pub to_token: String,
    pub amount: String,
    pub provider: String,
    pub status: BridgeStatus,
    pub source_tx_hash: String,
    pub destination_tx_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Minutes
    pub estimated_completion_time: u32,
    pub progress: u8,
    pub error_message: Option<String>,
}

impl BridgeTransaction {
    /// New pending record for a route whose execution returned `tx_hash`
    pub fn from_execution(route: &BridgeRoute, tx_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: tx_hash.clone(),
            from_chain: route.from_chain,
            to_chain: route.to_chain,
            from_token: route.from_token.clone(),
            to_token: route.to_token.clone(),
            amount: route.from_amount.clone(),
            provider: route.provider.clone(),
            status: BridgeStatus::Pending,
            source_tx_hash: tx_hash,
            destination_tx_hash: None,
            created_at: now,
            completed_at: None,
            estimated_completion_time: route.estimated_time,
            progress: 0,
            error_message: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Apply a status snapshot.
    ///
    /// Terminal records accept only a repeat of their own status, which is a
    /// no-op. A pending snapshot never moves a processing record backwards.
    pub fn apply(&mut self, snapshot: &BridgeStatusResponse, now: DateTime<Utc>) -> BridgeResult<()> {
        if self.is_terminal() {
            if snapshot.status == self.status {
                return Ok(());
            }
            return Err(BridgeError::InvalidStateTransition {
                from: self.status.to_string(),
                to: snapshot.status.to_string(),
            });
        }

        let next = match (self.status, snapshot.status) {
            (BridgeStatus::Processing, BridgeStatus::Pending) => BridgeStatus::Processing,
            (_, status) => status,
        };

        if next != self.status {
            debug!("Transaction {} {} -> {}", self.id, self.status, next);
        }

        if let Some(dest) = &snapshot.destination_tx_hash {
            self.destination_tx_hash = Some(dest.clone());
        }
        if self.estimated_completion_time == 0 {
            self.estimated_completion_time = snapshot.estimated_completion_time;
        }

        self.status = next;
        if next.is_terminal() {
            self.progress = snapshot.progress;
            self.completed_at = Some(now);
            self.error_message = snapshot.error_message.clone();
        } else {
            self.progress = self.progress.max(snapshot.progress);
        }

        Ok(())
    }

    /// Progress for display, interpolated from elapsed time while in flight
    pub fn display_progress(&self, now: DateTime<Utc>) -> u8 {
        if self.is_terminal() {
            return self.progress;
        }
        let interpolated =
            interpolate_progress(self.created_at, self.estimated_completion_time, now);
        self.progress.max(interpolated).min(MAX_IN_FLIGHT_PROGRESS)
    }

    /// In flight past its estimated completion time
    pub fn is_delayed(&self, now: DateTime<Utc>) -> bool {
        !self.is_terminal()
            && now >= self.created_at + Duration::minutes(self.estimated_completion_time as i64)
    }
}

/// Elapsed share of the estimate as a whole percent, never above
/// [`MAX_IN_FLIGHT_PROGRESS`]
pub fn interpolate_progress(created_at: DateTime<Utc>, estimated_minutes: u32, now: DateTime<Utc>) -> u8 {
    let elapsed_ms = (now - created_at).num_milliseconds();
    if elapsed_ms <= 0 {
        return 0;
    }
    if estimated_minutes == 0 {
        return MAX_IN_FLIGHT_PROGRESS;
    }

    let estimate_ms = estimated_minutes as f64 * 60_000.0;
    let percent = (elapsed_ms as f64 / estimate_ms * 100.0).floor();
    percent.min(MAX_IN_FLIGHT_PROGRESS as f64) as u8
}
