pub mod accomplishment;
pub mod goal;
pub mod summary;

pub use accomplishment::{
    Accomplishment, AccomplishmentCreateRequest, AccomplishmentList, AccomplishmentRepository,
    PgAccomplishmentRepository,
};
pub use goal::{Goal, GoalCreateRequest, GoalList, GoalRepository, GoalUpdateRequest, PgGoalRepository};
pub use summary::{
    AccomplishmentInput, GoalInput, PgSummaryRepository, Scope, SummarizeRequest, Summary,
    SummaryCreateRequest, SummaryList, SummaryRepository, SummaryType, SummaryUpdateRequest,
}; // Re-exporting summary models and the summarize request payload
