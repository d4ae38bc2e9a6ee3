use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Deals
// =============================================================================

/// Pipeline status of a deal.
///
/// The set is closed: it drives both badge styling and the dashboard stats.
/// Rows carrying a status this build does not know deserialize to `Unknown`
/// so a schema change on the backend never fails a whole fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DealStatus {
    Follow,
    #[serde(rename = "Due Diligence")]
    DueDiligence,
    Invested,
    Pass,
    Reject,
    #[serde(other)]
    Unknown,
}

impl DealStatus {
    pub const ALL: [DealStatus; 5] = [
        DealStatus::Follow,
        DealStatus::DueDiligence,
        DealStatus::Invested,
        DealStatus::Pass,
        DealStatus::Reject,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DealStatus::Follow => "Follow",
            DealStatus::DueDiligence => "Due Diligence",
            DealStatus::Invested => "Invested",
            DealStatus::Pass => "Pass",
            DealStatus::Reject => "Reject",
            DealStatus::Unknown => "Unknown",
        }
    }

    /// Parse a status label. Matching ignores case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(needle))
    }

    /// Terminal states: the deal is no longer moving through the pipeline.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            DealStatus::Invested | DealStatus::Pass | DealStatus::Reject
        )
    }
}

/// A row from the `deals` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: String,
    pub project_name: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub funding_round: Option<String>,
    pub status: DealStatus,
    /// Free-form valuation terms ("$40M pre, SAFE 20% discount").
    #[serde(default)]
    pub valuation: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deal_date: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Denormalized deal reference attached to an interaction at fetch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealRef {
    pub id: String,
    pub project_name: String,
}

// =============================================================================
// Contacts
// =============================================================================

/// A row from the `contacts` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub contact_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A row from the `interactions` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub contact_id: String,
    #[serde(default)]
    pub deal_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub interaction_date: NaiveDate,
}

/// An interaction as listed under its contact, with the deal it was logged
/// against resolved by the contacts hook. Read-only: rows go back to the
/// backend as `Interaction`, which has no `deal` column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedInteraction {
    #[serde(flatten)]
    pub interaction: Interaction,
    pub deal: Option<DealRef>,
}

/// A contact together with its logged interactions, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactWithInteractions {
    #[serde(flatten)]
    pub contact: Contact,
    pub interactions: Vec<LinkedInteraction>,
}

// =============================================================================
// Dashboard
// =============================================================================

/// A row from `stock_price_cache`, refreshed by the backend's price job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockQuote {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    pub price: f64,
    pub change_percent: f64,
    pub updated_at: DateTime<Utc>,
}

/// A row from `profiles`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub onboarding_completed: bool,
}

/// Deal pipeline counts shown on the dashboard header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealStats {
    pub total: usize,
    pub following: usize,
    pub active: usize,
    pub closed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub deals: DealStats,
    pub contacts: usize,
    pub interactions_this_week: usize,
}

// =============================================================================
// Feedback
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackCategory {
    Bug,
    Feature,
    General,
}

/// Insert payload for `user_feedback`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFeedback {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub category: FeedbackCategory,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Access roles
// =============================================================================

/// Role granted to a workspace member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
    Viewer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Member, Role::Viewer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
            Role::Viewer => "viewer",
        }
    }

    /// Exact, lowercase match only; role names come from our own forms.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == s)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
