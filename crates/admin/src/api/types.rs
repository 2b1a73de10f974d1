//! Read-only snapshots of records owned by the Tojumi API.
//!
//! Field names follow the API's camelCase. Anything the API may omit or send
//! as `null` is either an `Option` or defaults to empty.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use tojumi_core::format::{age_from_dob, display_date};
use tojumi_core::{
    AccountType, ApprovalStatus, CareBusinessId, CareServiceTypeId, CarehomeId, DependentId,
    FamilyId, GuarantorId, Level, Naira, StudentId, UserId,
};

/// A record with a stable identifier.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Singular noun used in operator messages.
    const NAME: &'static str;
    /// Plural noun used in operator messages.
    const PLURAL: &'static str;

    fn id(&self) -> &str;
}

/// A record subject to the approve/reject lifecycle.
pub trait Approvable: Entity {
    /// Whether approval must carry a [`Level`].
    const LEVEL_ON_APPROVAL: bool = false;

    fn status(&self) -> ApprovalStatus;

    /// Apply a server-confirmed status change.
    fn apply_status(&mut self, delta: &StatusDelta);
}

/// Server-confirmed outcome of an approve/reject action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusDelta {
    pub status: ApprovalStatus,
    pub level: Option<Level>,
}

/// Treat an explicit `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn join_name(first: &str, last: &str) -> String {
    format!("{first} {last}").trim().to_string()
}

// =============================================================================
// Users
// =============================================================================

/// A platform account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_no: Option<String>,
    pub account_type: Option<AccountType>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub payment_currency: Option<String>,
    pub is_approved: ApprovalStatus,
}

impl User {
    #[must_use]
    pub fn full_name(&self) -> String {
        join_name(&self.first_name, &self.last_name)
    }

    /// Whether the account has been verified by an admin.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.is_approved == ApprovalStatus::Approved
    }

    #[must_use]
    pub fn age(&self) -> Option<u32> {
        self.dob.as_deref().and_then(age_from_dob)
    }

    #[must_use]
    pub fn account_label(&self) -> &'static str {
        self.account_type.map_or("Unknown", AccountType::label)
    }

    /// `City, State, Country` with missing parts skipped.
    #[must_use]
    pub fn location(&self) -> String {
        [&self.city, &self.state, &self.country]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Entity for User {
    const NAME: &'static str = "user";
    const PLURAL: &'static str = "users";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

/// Name and contact details of a related person.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonName {
    pub first_name: String,
    pub last_name: String,
    pub phone_no: Option<String>,
    pub email: Option<String>,
}

impl PersonName {
    #[must_use]
    pub fn full_name(&self) -> String {
        join_name(&self.first_name, &self.last_name)
    }
}

// =============================================================================
// Families and dependents
// =============================================================================

/// A family account, owner of zero or more dependents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Family {
    pub id: FamilyId,
    pub user: User,
    #[serde(deserialize_with = "nullable")]
    pub dependents: Vec<Dependent>,
}

impl Entity for Family {
    const NAME: &'static str = "family";
    const PLURAL: &'static str = "families";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

/// A care recipient registered under a family.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dependent {
    pub id: DependentId,
    pub family: Option<Box<Family>>,
    pub first_name: String,
    pub last_name: String,
    pub phone_no: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub profile_pics: Option<String>,
    pub relationship: Option<String>,
    pub date_of_birth: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub medical_concerns: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub appointments: Vec<Appointment>,
    #[serde(deserialize_with = "nullable")]
    pub care_logs: Vec<CareLog>,
}

impl Dependent {
    #[must_use]
    pub fn full_name(&self) -> String {
        join_name(&self.first_name, &self.last_name)
    }

    #[must_use]
    pub fn age(&self) -> Option<u32> {
        self.date_of_birth.as_deref().and_then(age_from_dob)
    }

    /// Id of the owning family, if the API included it.
    #[must_use]
    pub fn family_id(&self) -> Option<&str> {
        self.family.as_deref().map(|f| f.id.as_str())
    }

    /// Name of the family account holder.
    #[must_use]
    pub fn family_name(&self) -> String {
        self.family
            .as_deref()
            .map(|f| f.user.full_name())
            .unwrap_or_default()
    }
}

impl Entity for Dependent {
    const NAME: &'static str = "dependent";
    const PLURAL: &'static str = "dependents";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

/// A scheduled visit for a dependent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Appointment {
    pub id: String,
    pub student: Option<StudentRef>,
    pub care_business: Option<CareBusinessRef>,
    pub scheduled_date: Option<String>,
    pub scheduled_time: Option<String>,
    pub status: Option<String>,
}

impl Appointment {
    /// Who the appointment is with: the student, else the care business.
    #[must_use]
    pub fn carer(&self) -> String {
        self.student
            .as_ref()
            .map(StudentRef::name)
            .or_else(|| self.care_business.as_ref().map(CareBusinessRef::name))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn date(&self) -> String {
        self.scheduled_date.as_deref().map(display_date).unwrap_or_default()
    }
}

/// A note written by a student after a visit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CareLog {
    pub id: String,
    pub student: Option<StudentRef>,
    pub notes: Option<String>,
    pub created_at: Option<String>,
}

impl CareLog {
    #[must_use]
    pub fn author(&self) -> String {
        self.student.as_ref().map(StudentRef::name).unwrap_or_default()
    }

    #[must_use]
    pub fn date(&self) -> String {
        self.created_at.as_deref().map(display_date).unwrap_or_default()
    }
}

// =============================================================================
// Care businesses and care homes
// =============================================================================

/// A care provider organisation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CareBusiness {
    pub id: CareBusinessId,
    pub user: User,
    pub cac_reg_document: Option<String>,
    pub memorandum_of_association: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub board_of_directors: Vec<String>,
    pub business_email: Option<String>,
    pub other_certificates: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub homes: Vec<CarehomeRef>,
    pub is_approved: ApprovalStatus,
}

impl Entity for CareBusiness {
    const NAME: &'static str = "care provider";
    const PLURAL: &'static str = "care providers";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Approvable for CareBusiness {
    fn status(&self) -> ApprovalStatus {
        self.is_approved
    }

    fn apply_status(&mut self, delta: &StatusDelta) {
        self.is_approved = delta.status;
    }
}

/// Minimal care business reference embedded in other records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CareBusinessRef {
    pub id: CareBusinessId,
    pub business_email: Option<String>,
    pub user: Option<PersonName>,
    pub is_approved: ApprovalStatus,
}

impl CareBusinessRef {
    #[must_use]
    pub fn name(&self) -> String {
        self.user
            .as_ref()
            .map(PersonName::full_name)
            .filter(|n| !n.is_empty())
            .or_else(|| self.business_email.clone())
            .unwrap_or_default()
    }
}

/// Minimal care home reference embedded in other records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CarehomeRef {
    pub id: Option<CarehomeId>,
    pub name: String,
    pub phone_no: Option<String>,
    pub location: Option<String>,
    pub year_established: Option<i32>,
}

/// A care facility run by a care business.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Carehome {
    pub id: CarehomeId,
    pub care_business: Option<CareBusinessRef>,
    pub name: String,
    pub description: Option<String>,
    pub year_established: Option<i32>,
    pub phone_no: Option<String>,
    pub hourly_price: Option<Decimal>,
    pub daily_price: Option<Decimal>,
    pub weekly_price: Option<Decimal>,
    pub monthly_price: Option<Decimal>,
    pub yearly_price: Option<Decimal>,
    pub capacity: Option<u32>,
    pub available_slots: Option<u32>,
    #[serde(deserialize_with = "nullable")]
    pub amenities: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub images_videos: Vec<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_approved: ApprovalStatus,
}

impl Carehome {
    /// Priced tiers in ascending duration, skipping unset ones.
    #[must_use]
    pub fn price_tiers(&self) -> Vec<(&'static str, Naira)> {
        [
            ("Hourly", self.hourly_price),
            ("Daily", self.daily_price),
            ("Weekly", self.weekly_price),
            ("Monthly", self.monthly_price),
            ("Yearly", self.yearly_price),
        ]
        .into_iter()
        .filter_map(|(label, price)| price.map(|p| (label, Naira::new(p))))
        .collect()
    }

    /// `available / capacity`, when both are known.
    #[must_use]
    pub fn occupancy(&self) -> Option<String> {
        match (self.available_slots, self.capacity) {
            (Some(available), Some(capacity)) => Some(format!("{available} / {capacity}")),
            _ => None,
        }
    }

    /// Gallery entries that look like videos.
    #[must_use]
    pub fn is_video(url: &str) -> bool {
        let path = url.split('?').next().unwrap_or(url).to_ascii_lowercase();
        [".mp4", ".mov", ".webm", ".m4v"]
            .iter()
            .any(|ext| path.ends_with(ext))
    }
}

impl Entity for Carehome {
    const NAME: &'static str = "care home";
    const PLURAL: &'static str = "care homes";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Approvable for Carehome {
    fn status(&self) -> ApprovalStatus {
        self.is_approved
    }

    fn apply_status(&mut self, delta: &StatusDelta) {
        self.is_approved = delta.status;
    }
}

// =============================================================================
// Students and guarantors
// =============================================================================

/// A caregiver profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Student {
    pub id: StudentId,
    pub user: User,
    pub level: Option<Level>,
    pub id_card: Option<String>,
    pub certificate: Option<String>,
    pub care_experience_length: Option<u32>,
    pub access_to_transport: Option<bool>,
    pub is_approved: ApprovalStatus,
    #[serde(deserialize_with = "nullable")]
    pub care_service_types: Vec<CareServiceType>,
    #[serde(deserialize_with = "nullable")]
    pub guarantors: Vec<Guarantor>,
    #[serde(deserialize_with = "nullable")]
    pub active_care_homes: Vec<CarehomeRef>,
    #[serde(deserialize_with = "nullable")]
    pub clients: Vec<PersonName>,
}

impl Student {
    #[must_use]
    pub fn level_label(&self) -> &'static str {
        self.level.map_or("Not assigned", Level::label)
    }
}

impl Entity for Student {
    const NAME: &'static str = "student";
    const PLURAL: &'static str = "students";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Approvable for Student {
    const LEVEL_ON_APPROVAL: bool = true;

    fn status(&self) -> ApprovalStatus {
        self.is_approved
    }

    fn apply_status(&mut self, delta: &StatusDelta) {
        self.is_approved = delta.status;
        if delta.level.is_some() {
            self.level = delta.level;
        }
    }
}

/// Minimal student reference embedded in other records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentRef {
    pub id: Option<StudentId>,
    pub user: Option<PersonName>,
}

impl StudentRef {
    #[must_use]
    pub fn name(&self) -> String {
        self.user.as_ref().map(PersonName::full_name).unwrap_or_default()
    }
}

/// A third party vouching for a student.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Guarantor {
    pub id: GuarantorId,
    pub student: Option<StudentRef>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone_no: Option<String>,
    pub bvn: Option<String>,
    pub passport: Option<String>,
    pub occupation: Option<String>,
    pub address: Option<String>,
    pub verified: ApprovalStatus,
    pub created_at: Option<String>,
}

impl Guarantor {
    #[must_use]
    pub fn full_name(&self) -> String {
        join_name(&self.first_name, &self.last_name)
    }

    /// BVN with all but the last four digits masked.
    #[must_use]
    pub fn masked_bvn(&self) -> Option<String> {
        let bvn = self.bvn.as_deref()?;
        let visible = bvn.len().saturating_sub(4);
        let tail = bvn.get(visible..).unwrap_or(bvn);
        Some(format!("{}{tail}", "*".repeat(visible)))
    }

    #[must_use]
    pub fn student_name(&self) -> String {
        self.student.as_ref().map(StudentRef::name).unwrap_or_default()
    }
}

impl Entity for Guarantor {
    const NAME: &'static str = "guarantor";
    const PLURAL: &'static str = "guarantors";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Approvable for Guarantor {
    fn status(&self) -> ApprovalStatus {
        self.verified
    }

    fn apply_status(&mut self, delta: &StatusDelta) {
        self.verified = delta.status;
    }
}

// =============================================================================
// Reference data and dashboard
// =============================================================================

/// A kind of care a student can offer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CareServiceType {
    pub id: CareServiceTypeId,
    pub name: String,
}

impl Entity for CareServiceType {
    const NAME: &'static str = "service type";
    const PLURAL: &'static str = "service types";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

/// Platform-wide counters shown on the dashboard home.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseOverview {
    pub total_users: u64,
    pub total_families: u64,
    pub total_providers: u64,
    pub total_students: u64,
    pub all_contracts: u64,
    pub active_contracts: u64,
    pub pending_contracts: u64,
    pub cancelled_contracts: u64,
    pub expired_contracts: u64,
    pub total_dependents: u64,
    pub total_care_homes: u64,
    pub total_guarantors: u64,
    pub total_revenue: Naira,
}

/// Result of the `login` mutation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    pub token: String,
    pub user: User,
}
