// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Companies ---
        handlers::companies::create_company,
        handlers::companies::list_companies,
        handlers::companies::get_company,
        handlers::companies::rename_company,
        handlers::companies::delete_company,

        // --- People ---
        handlers::people::create_manager,
        handlers::people::list_managers,
        handlers::people::rename_manager,
        handlers::people::delete_manager,
        handlers::people::create_employee,
        handlers::people::list_employees,
        handlers::people::get_employee,
        handlers::people::update_employee,
        handlers::people::delete_employee,

        // --- KPIs ---
        handlers::kpis::list_kpis,
        handlers::kpis::create_kpi,
        handlers::kpis::update_kpi,
        handlers::kpis::delete_kpi,

        // --- Rounds ---
        handlers::rounds::open_round,
        handlers::rounds::list_rounds,
        handlers::rounds::get_round,
        handlers::rounds::rename_round,
        handlers::rounds::close_round,

        // --- Evaluations (RH) ---
        handlers::evaluations::get_evaluation,
        handlers::evaluations::hr_adjust,
        handlers::evaluations::publish_evaluation,
        handlers::evaluations::cancel_evaluation,

        // --- Public ---
        handlers::public::get_manager_form,
        handlers::public::submit_manager_form,
        handlers::public::get_employee_results,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Org ---
            models::org::Company,
            models::org::CompanySummary,
            models::org::Manager,
            models::org::ManagerSummary,
            models::org::Employee,
            models::org::Kpi,

            // --- Rounds ---
            models::round::RoundStatus,
            models::round::EvaluationRound,
            models::round::RoundEvaluationRow,
            models::round::StatusCounts,
            models::round::RoundOverview,

            // --- Evaluations ---
            models::evaluation::EvaluationStatus,
            models::evaluation::KpiSnapshotEntry,
            models::evaluation::Evaluation,
            models::evaluation::EvaluationScore,
            models::evaluation::ScoreInput,
            models::evaluation::SubmitEvaluationPayload,
            models::evaluation::HrScoreAdjustment,
            models::evaluation::HrAdjustPayload,

            // --- Access ---
            models::access::ManagerFormView,
            models::access::VisibleScore,
            models::access::EmployeeResultsView,
            models::access::ReviewScore,
            models::access::EvaluationReview,

            // --- Payloads ---
            handlers::companies::CompanyPayload,
            handlers::people::ManagerPayload,
            handlers::people::CreateEmployeePayload,
            handlers::people::UpdateEmployeePayload,
            handlers::kpis::KpiPayload,
            handlers::rounds::RenameRoundPayload,
            handlers::public::SubmitResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Login do RH"),
        (name = "Companies", description = "Empresas avaliadas"),
        (name = "People", description = "Gerentes e Colaboradores"),
        (name = "KPIs", description = "Perguntas do formulário por colaborador"),
        (name = "Rounds", description = "Ciclo de vida das rodadas de avaliação"),
        (name = "Evaluations", description = "Revisão, ajustes e publicação pelo RH"),
        (name = "Public", description = "Links do gerente e do colaborador (sem login)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
