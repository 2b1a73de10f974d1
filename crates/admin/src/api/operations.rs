//! Every remote operation the admin panel issues, declared once.
//!
//! Each operation is a unit struct implementing [`GraphQLQuery`] with a
//! static document. Selections for shared record shapes are built from the
//! field-list macros below so list and detail queries never drift apart.

use std::fmt;
use std::marker::PhantomData;

use graphql_client::{GraphQLQuery, QueryBody};
use serde::de::{DeserializeOwned, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use tojumi_core::{ApprovalStatus, Level};

use super::types::{
    Approvable, CareBusiness, CareServiceType, Carehome, DatabaseOverview, Dependent, Entity,
    Family, Guarantor, LoginPayload, Student, User,
};

// =============================================================================
// Selections
// =============================================================================

macro_rules! user_fields {
    () => {
        "id accountType address firstName city country dob email gender lastName \
         latitude longitude paymentCurrency phoneNo state isApproved"
    };
}

macro_rules! person_fields {
    () => {
        "firstName lastName phoneNo email"
    };
}

macro_rules! family_fields {
    () => {
        concat!("id user { ", user_fields!(), " }")
    };
}

macro_rules! dependent_fields {
    () => {
        concat!(
            "id family { ", family_fields!(), " } ",
            "firstName lastName phoneNo country state city address profilePics \
             relationship dateOfBirth medicalConcerns ",
            "appointments { id student { id user { ", person_fields!(), " } } ",
            "careBusiness { id businessEmail user { firstName lastName phoneNo } isApproved } ",
            "scheduledDate scheduledTime status } ",
            "careLogs { id student { user { ", person_fields!(), " } } notes createdAt }"
        )
    };
}

macro_rules! care_business_fields {
    () => {
        concat!(
            "id user { ", user_fields!(), " } ",
            "cacRegDocument memorandumOfAssociation boardOfDirectors businessEmail \
             otherCertificates homes { id name phoneNo location } isApproved"
        )
    };
}

macro_rules! carehome_fields {
    () => {
        "id careBusiness { id businessEmail user { firstName lastName phoneNo } isApproved } \
         name description yearEstablished phoneNo hourlyPrice dailyPrice weeklyPrice \
         monthlyPrice yearlyPrice capacity availableSlots amenities imagesVideos location \
         latitude longitude isApproved"
    };
}

macro_rules! guarantor_fields {
    () => {
        "id firstName lastName email phoneNo bvn passport occupation address verified createdAt"
    };
}

macro_rules! student_fields {
    () => {
        concat!(
            "id user { ", user_fields!(), " } ",
            "level idCard certificate careExperienceLength accessToTransport isApproved ",
            "careServiceTypes { id name } ",
            "guarantors { ", guarantor_fields!(), " } ",
            "activeCareHomes { id name location yearEstablished } ",
            "clients { firstName lastName phoneNo }"
        )
    };
}

macro_rules! overview_fields {
    () => {
        "totalUsers totalFamilies totalProviders totalStudents allContracts activeContracts \
         pendingContracts cancelledContracts expiredContracts totalDependents totalCareHomes \
         totalGuarantors totalRevenue"
    };
}

// =============================================================================
// Variables and responses
// =============================================================================

/// Variables for operations that take none.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct NoVariables {}

#[derive(Debug, Clone, Serialize)]
pub struct IdVariables {
    pub id: String,
}

/// Variables for approve/reject mutations.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionVariables {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NameVariables {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceTypeVariables {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginVariables {
    pub email: String,
    pub password: String,
}

/// The single root field of a response's `data` object.
///
/// `{"getUsers": [...]}` decodes to `RootField(Some(vec![...]))`; a `null`
/// root field decodes to `RootField(None)`.
#[derive(Debug, Clone)]
pub struct RootField<T>(Option<T>);

impl<T> RootField<T> {
    #[must_use]
    pub fn into_inner(self) -> Option<T> {
        self.0
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for RootField<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RootVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for RootVisitor<T> {
            type Value = RootField<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object with one root field")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let Some((_, value)) = map.next_entry::<IgnoredAny, Option<T>>()? else {
                    return Ok(RootField(None));
                };
                while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
                Ok(RootField(value))
            }
        }

        deserializer.deserialize_map(RootVisitor(PhantomData))
    }
}

/// What a mutation sends back: a bare flag or the changed record.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Confirmation {
    Flag(bool),
    Record(ConfirmedRecord),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfirmedRecord {
    pub id: Option<String>,
    #[serde(alias = "verified")]
    pub is_approved: Option<ApprovalStatus>,
    pub level: Option<Level>,
}

impl Confirmation {
    /// Whether the server reported success.
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        match self {
            Self::Flag(ok) => *ok,
            Self::Record(_) => true,
        }
    }

    #[must_use]
    pub const fn status(&self) -> Option<ApprovalStatus> {
        match self {
            Self::Flag(_) => None,
            Self::Record(record) => record.is_approved,
        }
    }

    #[must_use]
    pub const fn level(&self) -> Option<Level> {
        match self {
            Self::Flag(_) => None,
            Self::Record(record) => record.level,
        }
    }
}

// =============================================================================
// Operations
// =============================================================================

macro_rules! operation {
    ($(#[$meta:meta])* $name:ident($vars:ty) -> $data:ty = $document:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl GraphQLQuery for $name {
            type Variables = $vars;
            type ResponseData = RootField<$data>;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $document,
                    operation_name: stringify!($name),
                }
            }
        }
    };
}

operation!(GetUsers(NoVariables) -> Vec<User> =
    concat!("query GetUsers { getUsers { ", user_fields!(), " } }"));
operation!(GetUser(IdVariables) -> User =
    concat!("query GetUser($id: ID!) { getUser(id: $id) { ", user_fields!(), " } }"));

operation!(GetFamilies(NoVariables) -> Vec<Family> =
    concat!("query GetFamilies { getFamilies { ", family_fields!(), " } }"));
operation!(GetFamily(IdVariables) -> Family =
    concat!("query GetFamily($id: ID!) { getFamily(id: $id) { ", family_fields!(), " } }"));

operation!(GetDependents(NoVariables) -> Vec<Dependent> =
    concat!("query GetDependents { getDependents { ", dependent_fields!(), " } }"));
operation!(GetDependent(IdVariables) -> Dependent =
    concat!("query GetDependent($id: ID!) { getDependent(id: $id) { ", dependent_fields!(), " } }"));

operation!(GetCareBusinesses(NoVariables) -> Vec<CareBusiness> =
    concat!("query GetCareBusinesses { getCareBusinesses { ", care_business_fields!(), " } }"));
operation!(GetCareBusiness(IdVariables) -> CareBusiness =
    concat!(
        "query GetCareBusiness($id: ID!) { getCareBusiness(id: $id) { ",
        care_business_fields!(),
        " } }"
    ));
operation!(ApproveCareBusiness(DecisionVariables) -> Confirmation =
    "mutation ApproveCareBusiness($id: ID!) { approveCareBusiness(id: $id) { id isApproved } }");
operation!(RejectCareBusiness(DecisionVariables) -> Confirmation =
    "mutation RejectCareBusiness($id: ID!) { rejectCareBusiness(id: $id) { id isApproved } }");

operation!(GetAllCareHomes(NoVariables) -> Vec<Carehome> =
    concat!("query GetAllCareHomes { getAllCareHomes { ", carehome_fields!(), " } }"));
operation!(GetCareHome(IdVariables) -> Carehome =
    concat!("query GetCareHome($id: ID!) { getCareHome(id: $id) { ", carehome_fields!(), " } }"));
operation!(ApproveCareHome(DecisionVariables) -> Confirmation =
    "mutation ApproveCareHome($id: ID!) { approveCareHome(id: $id) { id isApproved } }");
operation!(RejectCareHome(DecisionVariables) -> Confirmation =
    "mutation RejectCareHome($id: ID!) { rejectCareHome(id: $id) { id isApproved } }");

operation!(GetStudents(NoVariables) -> Vec<Student> =
    concat!("query GetStudents { getStudents { ", student_fields!(), " } }"));
operation!(GetStudent(IdVariables) -> Student =
    concat!("query GetStudent($id: ID!) { getStudent(id: $id) { ", student_fields!(), " } }"));
operation!(ApproveStudent(DecisionVariables) -> Confirmation =
    "mutation ApproveStudent($id: ID!, $level: Level!) { \
     approveStudent(id: $id, level: $level) { id isApproved level } }");
operation!(RejectStudent(DecisionVariables) -> Confirmation =
    "mutation RejectStudent($id: ID!) { rejectStudent(id: $id) { id isApproved level } }");

operation!(GetGuarantors(NoVariables) -> Vec<Guarantor> =
    concat!(
        "query GetGuarantors { getGuarantors { ",
        guarantor_fields!(),
        " student { id user { ", person_fields!(), " } } } }"
    ));
operation!(GetGuarantor(IdVariables) -> Guarantor =
    concat!(
        "query GetGuarantor($id: ID!) { getGuarantor(id: $id) { ",
        guarantor_fields!(),
        " student { id user { ", person_fields!(), " } } } }"
    ));
operation!(VerifyGuarantor(DecisionVariables) -> Confirmation =
    "mutation VerifyGuarantor($id: ID!) { verifyGuarantor(id: $id) { id verified } }");
operation!(RejectGuarantor(DecisionVariables) -> Confirmation =
    "mutation RejectGuarantor($id: ID!) { rejectGuarantor(id: $id) { id verified } }");

operation!(GetAllCareServiceTypes(NoVariables) -> Vec<CareServiceType> =
    "query GetAllCareServiceTypes { getAllCareServiceTypes { id name } }");
operation!(CreateCareServiceType(NameVariables) -> CareServiceType =
    "mutation CreateCareServiceType($name: String!) { \
     createCareServiceType(name: $name) { id name } }");
operation!(UpdateCareServiceType(ServiceTypeVariables) -> CareServiceType =
    "mutation UpdateCareServiceType($id: ID!, $name: String!) { \
     updateCareServiceType(id: $id, name: $name) { id name } }");
operation!(DeleteCareServiceType(IdVariables) -> Confirmation =
    "mutation DeleteCareServiceType($id: ID!) { deleteCareServiceType(id: $id) }");

operation!(GetDatabaseOverview(NoVariables) -> DatabaseOverview =
    concat!("query GetDatabaseOverview { databaseOverview { ", overview_fields!(), " } }"));

operation!(Login(LoginVariables) -> LoginPayload =
    concat!(
        "mutation Login($email: String!, $password: String!) { \
         login(email: $email, password: $password) { token user { ",
        user_fields!(),
        " } } }"
    ));

// =============================================================================
// Entity bindings
// =============================================================================

/// Binds an entity to its list and detail queries.
pub trait RemoteEntity: Entity + DeserializeOwned {
    type List: GraphQLQuery<Variables = NoVariables, ResponseData = RootField<Vec<Self>>>;
    type Get: GraphQLQuery<Variables = IdVariables, ResponseData = RootField<Self>>;
}

/// Binds an approvable entity to its approve and reject mutations.
pub trait RemoteApproval: RemoteEntity + Approvable {
    type Approve: GraphQLQuery<Variables = DecisionVariables, ResponseData = RootField<Confirmation>>;
    type Reject: GraphQLQuery<Variables = DecisionVariables, ResponseData = RootField<Confirmation>>;
}

impl RemoteEntity for User {
    type List = GetUsers;
    type Get = GetUser;
}

impl RemoteEntity for Family {
    type List = GetFamilies;
    type Get = GetFamily;
}

impl RemoteEntity for Dependent {
    type List = GetDependents;
    type Get = GetDependent;
}

impl RemoteEntity for CareBusiness {
    type List = GetCareBusinesses;
    type Get = GetCareBusiness;
}

impl RemoteApproval for CareBusiness {
    type Approve = ApproveCareBusiness;
    type Reject = RejectCareBusiness;
}

impl RemoteEntity for Carehome {
    type List = GetAllCareHomes;
    type Get = GetCareHome;
}

impl RemoteApproval for Carehome {
    type Approve = ApproveCareHome;
    type Reject = RejectCareHome;
}

impl RemoteEntity for Student {
    type List = GetStudents;
    type Get = GetStudent;
}

impl RemoteApproval for Student {
    type Approve = ApproveStudent;
    type Reject = RejectStudent;
}

impl RemoteEntity for Guarantor {
    type List = GetGuarantors;
    type Get = GetGuarantor;
}

impl RemoteApproval for Guarantor {
    type Approve = VerifyGuarantor;
    type Reject = RejectGuarantor;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_operation_name_matches_document() {
        let body = GetStudents::build_query(NoVariables {});
        assert_eq!(body.operation_name, "GetStudents");
        assert!(body.query.starts_with("query GetStudents { getStudents {"));
        assert!(body.query.contains("guarantors { id firstName"));
    }

    #[test]
    fn test_student_approval_sends_level() {
        let body = ApproveStudent::build_query(DecisionVariables {
            id: "s1".to_string(),
            level: Some(Level::Senior),
        });
        let wire = serde_json::to_value(&body).unwrap();
        assert_eq!(wire["operationName"], "ApproveStudent");
        assert_eq!(wire["variables"], json!({ "id": "s1", "level": "SENIOR" }));
    }

    #[test]
    fn test_level_omitted_when_absent() {
        let body = RejectStudent::build_query(DecisionVariables {
            id: "s1".to_string(),
            level: None,
        });
        let wire = serde_json::to_value(&body).unwrap();
        assert_eq!(wire["variables"], json!({ "id": "s1" }));
    }

    #[test]
    fn test_root_field_unwraps_single_key() {
        let data: RootField<Vec<CareServiceType>> = serde_json::from_value(json!({
            "getAllCareServiceTypes": [{ "id": "t1", "name": "Elderly care" }]
        }))
        .unwrap();
        let types = data.into_inner().unwrap();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].name, "Elderly care");
    }

    #[test]
    fn test_root_field_null_is_none() {
        let data: RootField<Carehome> =
            serde_json::from_value(json!({ "getCareHome": null })).unwrap();
        assert!(data.into_inner().is_none());
    }

    #[test]
    fn test_confirmation_shapes() {
        let flag: Confirmation = serde_json::from_value(json!(true)).unwrap();
        assert!(flag.is_confirmed());
        assert_eq!(flag.status(), None);

        let record: Confirmation =
            serde_json::from_value(json!({ "id": "g1", "verified": "true" })).unwrap();
        assert_eq!(record.status(), Some(ApprovalStatus::Approved));

        let student: Confirmation = serde_json::from_value(
            json!({ "id": "s1", "isApproved": "APPROVED", "level": "SENIOR" }),
        )
        .unwrap();
        assert_eq!(student.level(), Some(Level::Senior));
    }
}
