#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the Atelier marketplace API.
//!
//! Every shape the console exchanges with the server lives here so the
//! client, the state core and the CLI agree on one contract. Responses are
//! parsed into these closed types at the network boundary; a malformed
//! payload fails loudly at the edge instead of leaking `null`s into views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error body carried by every non-2xx API response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    /// Human-readable message surfaced verbatim to the operator.
    pub error: String,
}

/// Lifecycle states for studio-submitted catalog content.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    /// Editable by the studio, not yet submitted.
    Draft,
    /// Submitted and waiting in the review queue.
    Pending,
    /// Claimed by a reviewer but not yet decided.
    UnderReview,
    /// Approved and visible in the storefront.
    Published,
    /// Declined with a reason attached.
    Rejected,
    /// Withdrawn from the storefront permanently.
    Archived,
}

impl ModerationStatus {
    /// Stable snake_case label used in query strings and log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::UnderReview => "under_review",
            Self::Published => "published",
            Self::Rejected => "rejected",
            Self::Archived => "archived",
        }
    }

    /// Parse a status label as it appears in query strings.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "pending" => Some(Self::Pending),
            "under_review" => Some(Self::UnderReview),
            "published" => Some(Self::Published),
            "rejected" => Some(Self::Rejected),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// Lifecycle states for returns and payouts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStatus {
    /// Awaiting an administrator decision.
    Pending,
    /// Approved and queued for processing.
    Approved,
    /// Declined with a reason attached.
    Rejected,
    /// Transfer or refund is in flight.
    Processing,
    /// Settled; terminal.
    Completed,
}

impl FulfillmentStatus {
    /// Stable snake_case label used in query strings and log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Processing => "processing",
            Self::Completed => "completed",
        }
    }

    /// Parse a status label as it appears in query strings.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Display-only state derived from a promo code's stored fields.
///
/// The server stores `is_active` and the activation window; this value is
/// recomputed at render time and never written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoState {
    /// Within its window and switched on.
    Active,
    /// Switched off by the studio or admin.
    Paused,
    /// Past its end date regardless of the active flag.
    Expired,
}

impl PromoState {
    /// Label used by table renderers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Expired => "expired",
        }
    }
}

/// Identity accessor the generic collection store needs from every entity.
pub trait Identified {
    /// Opaque server-assigned identifier.
    fn entity_id(&self) -> &str;
}

/// Accessors the status workflow and dispatcher need from entities that
/// carry a moderation lifecycle.
pub trait Moderated: Identified {
    /// Current status as a stable label.
    fn status_label(&self) -> &'static str;
    /// Reason attached to a rejection, when present.
    fn rejection_reason(&self) -> Option<&str>;
}

/// Course summary returned by list and detail endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CourseSummary {
    /// Opaque course identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Owning studio identifier.
    pub studio_id: String,
    /// Price in the smallest currency unit.
    pub price_cents: u64,
    /// Number of published lessons.
    pub lesson_count: u32,
    /// Current moderation status.
    pub status: ModerationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Reviewer's reason; present only when rejected.
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// When the course last entered the review queue.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Timestamp of the latest server-side change.
    pub updated_at: DateTime<Utc>,
}

/// Product summary returned by list and detail endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductSummary {
    /// Opaque product identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Owning studio identifier.
    pub studio_id: String,
    /// Price in the smallest currency unit.
    pub price_cents: u64,
    /// Units in stock.
    pub stock: u32,
    /// Current moderation status.
    pub status: ModerationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Reviewer's reason; present only when rejected.
    pub rejection_reason: Option<String>,
    /// Timestamp of the latest server-side change.
    pub updated_at: DateTime<Utc>,
}

/// Workshop summary returned by list and detail endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkshopSummary {
    /// Opaque workshop identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Owning studio identifier.
    pub studio_id: String,
    /// Scheduled start time.
    pub starts_at: DateTime<Utc>,
    /// Maximum number of attendees.
    pub capacity: u32,
    /// Seats already booked.
    pub seats_taken: u32,
    /// Current moderation status.
    pub status: ModerationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Reviewer's reason; present only when rejected.
    pub rejection_reason: Option<String>,
    /// Timestamp of the latest server-side change.
    pub updated_at: DateTime<Utc>,
}

/// Promo code as stored by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromoCode {
    /// Opaque promo code identifier.
    pub id: String,
    /// Customer-facing code string.
    pub code: String,
    /// Discount percentage applied at checkout.
    pub percent_off: u8,
    /// Whether the code is currently switched on.
    pub is_active: bool,
    /// Start of the activation window.
    pub starts_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// End of the activation window; open-ended when absent.
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Maximum number of redemptions; unlimited when absent.
    pub usage_limit: Option<u32>,
    /// Redemptions so far.
    pub times_used: u32,
    /// Timestamp of the latest server-side change.
    pub updated_at: DateTime<Utc>,
}

impl PromoCode {
    /// Derive the display state from the stored fields at `now`.
    #[must_use]
    pub fn display_state(&self, now: DateTime<Utc>) -> PromoState {
        if self.ends_at.is_some_and(|ends| ends < now) {
            PromoState::Expired
        } else if self.is_active {
            PromoState::Active
        } else {
            PromoState::Paused
        }
    }
}

/// Return request raised against a purchased product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReturnRequest {
    /// Opaque return identifier.
    pub id: String,
    /// Order the return belongs to.
    pub order_id: String,
    /// Product being returned.
    pub product_id: String,
    /// Customer-provided reason for the return.
    pub customer_reason: String,
    /// Current fulfillment status.
    pub status: FulfillmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Administrator's reason; present only when rejected.
    pub rejection_reason: Option<String>,
    /// When the customer raised the request.
    pub requested_at: DateTime<Utc>,
}

/// Scheduled transfer of accumulated studio earnings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Payout {
    /// Opaque payout identifier.
    pub id: String,
    /// Studio receiving the transfer.
    pub studio_id: String,
    /// Amount in the smallest currency unit.
    pub amount_cents: u64,
    /// Current fulfillment status.
    pub status: FulfillmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Administrator's reason; present only when rejected.
    pub rejection_reason: Option<String>,
    /// Date the transfer is scheduled for.
    pub scheduled_for: DateTime<Utc>,
    /// Timestamp of the latest server-side change.
    pub updated_at: DateTime<Utc>,
}

macro_rules! impl_moderated {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Identified for $ty {
                fn entity_id(&self) -> &str {
                    &self.id
                }
            }

            impl Moderated for $ty {
                fn status_label(&self) -> &'static str {
                    self.status.as_str()
                }

                fn rejection_reason(&self) -> Option<&str> {
                    self.rejection_reason.as_deref()
                }
            }
        )+
    };
}

impl_moderated!(
    CourseSummary,
    ProductSummary,
    WorkshopSummary,
    ReturnRequest,
    Payout,
);

impl Identified for PromoCode {
    fn entity_id(&self) -> &str {
        &self.id
    }
}

/// Pagination metadata carried alongside every list response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PageInfo {
    /// Total number of items across all pages.
    pub total: u64,
    /// Total number of pages at the requested page size.
    pub pages: u32,
}

/// Wire envelope for paginated list responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageEnvelope<T> {
    /// Items for the requested page, in server order.
    pub items: Vec<T>,
    /// Pagination metadata for the whole collection.
    pub pagination: PageInfo,
}

/// Status transition requested via `POST .../{id}/action`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StatusAction {
    /// Studio submits a draft for review.
    Submit,
    /// Admin approves a pending submission.
    Approve,
    /// Admin rejects a pending submission; requires a reason.
    Reject,
    /// Admin or studio publishes an approved draft.
    Publish,
    /// Pull published content back to draft.
    Unpublish,
    /// Studio resubmits previously rejected content.
    Resubmit,
    /// Withdraw published content permanently.
    Archive,
    /// Move an approved payout or return into processing.
    Process,
    /// Mark a processing payout or return as settled.
    Complete,
}

impl StatusAction {
    /// Stable snake_case label used in CLI arguments and log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Publish => "publish",
            Self::Unpublish => "unpublish",
            Self::Resubmit => "resubmit",
            Self::Archive => "archive",
            Self::Process => "process",
            Self::Complete => "complete",
        }
    }

    /// Parse an action label as typed on the CLI.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "submit" => Some(Self::Submit),
            "approve" => Some(Self::Approve),
            "reject" => Some(Self::Reject),
            "publish" => Some(Self::Publish),
            "unpublish" => Some(Self::Unpublish),
            "resubmit" => Some(Self::Resubmit),
            "archive" => Some(Self::Archive),
            "process" => Some(Self::Process),
            "complete" => Some(Self::Complete),
            _ => None,
        }
    }
}

/// Body of a status-action request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusActionRequest {
    /// Transition being requested.
    pub action: StatusAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Reason accompanying the transition; required for rejections.
    pub reason: Option<String>,
}

/// Body returned by `DELETE .../{id}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteResponse {
    /// Whether the entity was removed.
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn moderation_status_round_trips_labels() {
        for status in [
            ModerationStatus::Draft,
            ModerationStatus::Pending,
            ModerationStatus::UnderReview,
            ModerationStatus::Published,
            ModerationStatus::Rejected,
            ModerationStatus::Archived,
        ] {
            assert_eq!(ModerationStatus::parse(status.as_str()), Some(status));
        }
        assert!(ModerationStatus::parse("live").is_none());
    }

    #[test]
    fn fulfillment_status_round_trips_labels() {
        for status in [
            FulfillmentStatus::Pending,
            FulfillmentStatus::Approved,
            FulfillmentStatus::Rejected,
            FulfillmentStatus::Processing,
            FulfillmentStatus::Completed,
        ] {
            assert_eq!(FulfillmentStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn status_serializes_as_snake_case() {
        assert_eq!(
            serde_json::to_value(ModerationStatus::UnderReview).unwrap(),
            json!("under_review")
        );
        assert_eq!(
            serde_json::to_value(FulfillmentStatus::Processing).unwrap(),
            json!("processing")
        );
    }

    #[test]
    fn course_summary_parses_wire_shape() {
        let course: CourseSummary = serde_json::from_value(json!({
            "id": "crs_1",
            "title": "Watercolor Basics",
            "studio_id": "std_9",
            "price_cents": 4_900,
            "lesson_count": 12,
            "status": "rejected",
            "rejection_reason": "missing video",
            "updated_at": "2026-08-01T12:00:00Z"
        }))
        .expect("course should parse");
        assert_eq!(course.status, ModerationStatus::Rejected);
        assert_eq!(course.rejection_reason.as_deref(), Some("missing video"));
        assert_eq!(course.entity_id(), "crs_1");
        assert_eq!(course.status_label(), "rejected");
        assert!(course.submitted_at.is_none());
    }

    #[test]
    fn rejection_reason_is_omitted_when_absent() {
        let payout = Payout {
            id: "pay_1".into(),
            studio_id: "std_9".into(),
            amount_cents: 125_000,
            status: FulfillmentStatus::Pending,
            rejection_reason: None,
            scheduled_for: ts(1_700_000_000),
            updated_at: ts(1_700_000_000),
        };
        let value = serde_json::to_value(&payout).unwrap();
        assert!(value.get("rejection_reason").is_none());
    }

    #[test]
    fn promo_state_derives_from_stored_fields() {
        let promo = PromoCode {
            id: "prm_1".into(),
            code: "SPRING20".into(),
            percent_off: 20,
            is_active: true,
            starts_at: ts(1_000),
            ends_at: Some(ts(2_000)),
            usage_limit: Some(100),
            times_used: 3,
            updated_at: ts(1_000),
        };
        assert_eq!(promo.display_state(ts(1_500)), PromoState::Active);
        assert_eq!(promo.display_state(ts(3_000)), PromoState::Expired);

        let paused = PromoCode {
            is_active: false,
            ..promo
        };
        assert_eq!(paused.display_state(ts(1_500)), PromoState::Paused);
        // Expiry wins over the active flag.
        assert_eq!(paused.display_state(ts(3_000)), PromoState::Expired);
    }

    #[test]
    fn page_envelope_parses_list_shape() {
        let envelope: PageEnvelope<ReturnRequest> = serde_json::from_value(json!({
            "items": [{
                "id": "ret_1",
                "order_id": "ord_5",
                "product_id": "prd_2",
                "customer_reason": "arrived damaged",
                "status": "pending",
                "requested_at": "2026-08-10T08:30:00Z"
            }],
            "pagination": { "total": 41, "pages": 3 }
        }))
        .expect("envelope should parse");
        assert_eq!(envelope.items.len(), 1);
        assert_eq!(envelope.pagination.total, 41);
        assert_eq!(envelope.pagination.pages, 3);
    }

    #[test]
    fn status_action_request_omits_missing_reason() {
        let approve = StatusActionRequest {
            action: StatusAction::Approve,
            reason: None,
        };
        assert_eq!(
            serde_json::to_value(&approve).unwrap(),
            json!({ "action": "approve" })
        );

        let reject = StatusActionRequest {
            action: StatusAction::Reject,
            reason: Some("missing video".into()),
        };
        assert_eq!(
            serde_json::to_value(&reject).unwrap(),
            json!({ "action": "reject", "reason": "missing video" })
        );
    }

    #[test]
    fn status_action_parses_cli_labels() {
        assert_eq!(StatusAction::parse("reject"), Some(StatusAction::Reject));
        assert_eq!(StatusAction::parse("archive"), Some(StatusAction::Archive));
        assert!(StatusAction::parse("destroy").is_none());
    }
}
