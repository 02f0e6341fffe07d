//! The closed set of entity types and the operation-name tables behind the
//! generic fetch/query surface.
//!
//! Every remote operation is derived from the `(operation kind, item type)`
//! pair; there is no per-type code beyond these tables. Combinations the
//! backend does not implement are reported as unsupported before anything
//! touches the transport.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag identifying which entity schema a request or cached object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Client,
    Trainer,
    Gym,
    Workout,
    Review,
    Event,
    Challenge,
    Invite,
    Post,
    Submission,
    Group,
    Comment,
    Sponsor,
    Message,
    Streak,
}

/// The five operation kinds the dispatch tables cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    GetById,
    GetByUsername,
    BatchGet,
    BuildListQuery,
    ExecuteListQuery,
}

impl ItemType {
    /// All fifteen types, in canonical order.
    pub const ALL: [ItemType; 15] = [
        ItemType::Client,
        ItemType::Trainer,
        ItemType::Gym,
        ItemType::Workout,
        ItemType::Review,
        ItemType::Event,
        ItemType::Challenge,
        ItemType::Invite,
        ItemType::Post,
        ItemType::Submission,
        ItemType::Group,
        ItemType::Comment,
        ItemType::Sponsor,
        ItemType::Message,
        ItemType::Streak,
    ];

    /// `(operation name, field name)` for the single-item fetch.
    pub fn get_operation(&self) -> (&'static str, &'static str) {
        match self {
            ItemType::Client => ("GetClient", "getClient"),
            ItemType::Trainer => ("GetTrainer", "getTrainer"),
            ItemType::Gym => ("GetGym", "getGym"),
            ItemType::Workout => ("GetWorkout", "getWorkout"),
            ItemType::Review => ("GetReview", "getReview"),
            ItemType::Event => ("GetEvent", "getEvent"),
            ItemType::Challenge => ("GetChallenge", "getChallenge"),
            ItemType::Invite => ("GetInvite", "getInvite"),
            ItemType::Post => ("GetPost", "getPost"),
            ItemType::Submission => ("GetSubmission", "getSubmission"),
            ItemType::Group => ("GetGroup", "getGroup"),
            ItemType::Comment => ("GetComment", "getComment"),
            ItemType::Sponsor => ("GetSponsor", "getSponsor"),
            ItemType::Message => ("GetMessage", "getMessage"),
            ItemType::Streak => ("GetStreak", "getStreak"),
        }
    }

    /// `(operation name, field name)` for the username lookup, where the
    /// backend implements one. Only the account-bearing types do.
    pub fn username_operation(&self) -> Option<(&'static str, &'static str)> {
        match self {
            ItemType::Client => Some(("GetClientByUsername", "getClientByUsername")),
            ItemType::Trainer => Some(("GetTrainerByUsername", "getTrainerByUsername")),
            ItemType::Gym => Some(("GetGymByUsername", "getGymByUsername")),
            ItemType::Sponsor => Some(("GetSponsorByUsername", "getSponsorByUsername")),
            _ => None,
        }
    }

    /// `(operation name, field name)` for the batch-by-ID fetch.
    pub fn batch_operation(&self) -> (&'static str, &'static str) {
        match self {
            ItemType::Client => ("GetClients", "getClients"),
            ItemType::Trainer => ("GetTrainers", "getTrainers"),
            ItemType::Gym => ("GetGyms", "getGyms"),
            ItemType::Workout => ("GetWorkouts", "getWorkouts"),
            ItemType::Review => ("GetReviews", "getReviews"),
            ItemType::Event => ("GetEvents", "getEvents"),
            ItemType::Challenge => ("GetChallenges", "getChallenges"),
            ItemType::Invite => ("GetInvites", "getInvites"),
            ItemType::Post => ("GetPosts", "getPosts"),
            ItemType::Submission => ("GetSubmissions", "getSubmissions"),
            ItemType::Group => ("GetGroups", "getGroups"),
            ItemType::Comment => ("GetComments", "getComments"),
            ItemType::Sponsor => ("GetSponsors", "getSponsors"),
            ItemType::Message => ("GetMessages", "getMessages"),
            ItemType::Streak => ("GetStreaks", "getStreaks"),
        }
    }

    /// `(operation name, field name)` for the filtered/paginated list query.
    pub fn list_operation(&self) -> (&'static str, &'static str) {
        match self {
            ItemType::Client => ("QueryClients", "queryClients"),
            ItemType::Trainer => ("QueryTrainers", "queryTrainers"),
            ItemType::Gym => ("QueryGyms", "queryGyms"),
            ItemType::Workout => ("QueryWorkouts", "queryWorkouts"),
            ItemType::Review => ("QueryReviews", "queryReviews"),
            ItemType::Event => ("QueryEvents", "queryEvents"),
            ItemType::Challenge => ("QueryChallenges", "queryChallenges"),
            ItemType::Invite => ("QueryInvites", "queryInvites"),
            ItemType::Post => ("QueryPosts", "queryPosts"),
            ItemType::Submission => ("QuerySubmissions", "querySubmissions"),
            ItemType::Group => ("QueryGroups", "queryGroups"),
            ItemType::Comment => ("QueryComments", "queryComments"),
            ItemType::Sponsor => ("QuerySponsors", "querySponsors"),
            ItemType::Message => ("QueryMessages", "queryMessages"),
            ItemType::Streak => ("QueryStreaks", "queryStreaks"),
        }
    }

    /// Whether `kind` is implemented for this type. Callers must treat a
    /// `false` here as "unsupported", not as something to retry.
    pub fn supports(&self, kind: OperationKind) -> bool {
        match kind {
            OperationKind::GetByUsername => self.username_operation().is_some(),
            OperationKind::GetById
            | OperationKind::BatchGet
            | OperationKind::BuildListQuery
            | OperationKind::ExecuteListQuery => true,
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OperationKind::GetById => "get-by-id",
            OperationKind::GetByUsername => "get-by-username",
            OperationKind::BatchGet => "batch-get",
            OperationKind::BuildListQuery => "build-list-query",
            OperationKind::ExecuteListQuery => "execute-list-query",
        };
        write!(f, "{label}")
    }
}
