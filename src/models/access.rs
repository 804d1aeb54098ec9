// src/models/access.rs
//
// Respostas dos dois links públicos e da tela de revisão do RH.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{
    evaluation::{Evaluation, EvaluationScore, EvaluationStatus, KpiSnapshotEntry},
    round::RoundStatus,
};

// =============================================================================
//  LINK DO GERENTE
// =============================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ManagerFormView {
    #[serde(rename_all = "camelCase")]
    AlreadySubmitted { employee_name: String },
    RoundClosed,
    Cancelled,
    #[serde(rename_all = "camelCase")]
    Open {
        employee_name: String,
        employee_role: String,
        round_number: i32,
        kpis: Vec<KpiSnapshotEntry>,
    },
}

// =============================================================================
//  LINK DO COLABORADOR
// =============================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisibleScore {
    pub kpi_id: Uuid,
    pub kpi_name: String,
    pub form_question: String,
    pub order: i32,
    pub score: i16,
    pub manager_comment: Option<String>,
    pub hr_comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum EmployeeResultsView {
    NotPublished,
    #[serde(rename_all = "camelCase")]
    Published {
        employee_name: String,
        employee_role: String,
        round_number: i32,
        overall_score: f64,
        #[schema(example = "4.0")]
        overall_score_display: String,
        scores: Vec<VisibleScore>,
        recommendations: Option<String>,
    },
}

// =============================================================================
//  REVISÃO DO RH
// =============================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewScore {
    #[serde(flatten)]
    pub score: EvaluationScore,
    pub kpi_name: Option<String>,
    pub form_question: Option<String>,
    pub effective_score: i16,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReview {
    pub evaluation: Evaluation,
    pub status: EvaluationStatus,
    pub employee_name: String,
    pub manager_name: String,
    pub round_number: i32,
    pub round_status: RoundStatus,
    pub scores: Vec<ReviewScore>,
    pub manager_form_link: String,
    pub employee_view_link: String,
}

/// Junta cada nota ao KPI congelado correspondente (o KPI vivo pode já ter mudado ou sumido).
pub fn snapshot_lookup<'a>(
    snapshot: Option<&'a [KpiSnapshotEntry]>,
    kpi_id: Uuid,
) -> Option<&'a KpiSnapshotEntry> {
    snapshot.and_then(|entries| entries.iter().find(|k| k.id == kpi_id))
}

/// Notas visíveis ao colaborador, na ordem do snapshot.
pub fn visible_scores(snapshot: Option<&[KpiSnapshotEntry]>, scores: &[EvaluationScore]) -> Vec<VisibleScore> {
    let mut visible: Vec<VisibleScore> = scores
        .iter()
        .filter(|s| s.show_to_employee)
        .map(|s| {
            let kpi = snapshot_lookup(snapshot, s.kpi_id);
            VisibleScore {
                kpi_id: s.kpi_id,
                kpi_name: kpi.map(|k| k.name.clone()).unwrap_or_default(),
                form_question: kpi.map(|k| k.form_question.clone()).unwrap_or_default(),
                order: kpi.map(|k| k.order).unwrap_or(i32::MAX),
                score: s.effective_score(),
                manager_comment: s.manager_comment.clone(),
                hr_comment: s.hr_comment.clone(),
            }
        })
        .collect();

    visible.sort_by_key(|v| v.order);
    visible
}
