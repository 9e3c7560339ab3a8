//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod branch_repo;
pub mod issue_repo;
pub mod report_configuration_repo;
pub mod spare_part_repo;
pub mod user_repo;

pub use branch_repo::BranchRepo;
pub use issue_repo::IssueRepo;
pub use report_configuration_repo::ReportConfigurationRepo;
pub use spare_part_repo::SparePartRepo;
pub use user_repo::UserRepo;
