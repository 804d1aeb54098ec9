pub mod user_repo;
pub use user_repo::UserRepository;
pub mod org_repo;
pub use org_repo::OrgRepository;
pub mod kpi_repo;
pub use kpi_repo::KpiRepository;
pub mod round_repo;
pub use round_repo::RoundRepository;
pub mod evaluation_repo;
pub use evaluation_repo::EvaluationRepository;
