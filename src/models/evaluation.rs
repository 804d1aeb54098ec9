// src/models/evaluation.rs

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{common::error::AppError, models::round::RoundStatus};

// --- ENUMS ---

/// Estado derivado (não é gravado no banco).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    Pending,
    Submitted,
    Published,
    Cancelled,
}

impl EvaluationStatus {
    /// Precedência: cancelada > publicada > enviada > pendente.
    pub fn derive(
        cancelled_at: Option<DateTime<Utc>>,
        hr_published: bool,
        manager_submitted_at: Option<DateTime<Utc>>,
    ) -> Self {
        if cancelled_at.is_some() {
            EvaluationStatus::Cancelled
        } else if hr_published {
            EvaluationStatus::Published
        } else if manager_submitted_at.is_some() {
            EvaluationStatus::Submitted
        } else {
            EvaluationStatus::Pending
        }
    }
}

// --- SNAPSHOT ---

/// Cópia congelada de um KPI no momento em que o gerente abriu o formulário.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KpiSnapshotEntry {
    pub id: Uuid,
    pub name: String,
    pub form_question: String,
    pub order: i32,
}

// --- AVALIAÇÃO ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub id: Uuid,
    pub round_id: Uuid,
    pub employee_id: Uuid,
    pub manager_id: Uuid,

    // Os tokens nunca saem em JSON por aqui; o RH recebe os links montados
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub manager_form_token: String,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub employee_view_token: String,

    pub manager_opened: bool,
    #[schema(value_type = Option<Vec<KpiSnapshotEntry>>)]
    pub snapshot_kpis: Option<Json<Vec<KpiSnapshotEntry>>>,
    pub manager_submitted_at: Option<DateTime<Utc>>,
    pub manager_recommendations: Option<String>,
    pub hr_published: bool,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Evaluation {
    pub fn status(&self) -> EvaluationStatus {
        EvaluationStatus::derive(self.cancelled_at, self.hr_published, self.manager_submitted_at)
    }

    pub fn snapshot(&self) -> Option<&[KpiSnapshotEntry]> {
        self.snapshot_kpis.as_ref().map(|json| json.0.as_slice())
    }

    /// Checagens de estado do envio do gerente, na ordem em que são reportadas.
    pub fn ensure_submittable(&self, round_status: RoundStatus) -> Result<(), AppError> {
        if self.manager_submitted_at.is_some() {
            return Err(AppError::AlreadySubmitted);
        }
        if round_status == RoundStatus::Completed {
            return Err(AppError::RoundClosed);
        }
        if self.cancelled_at.is_some() {
            return Err(AppError::EvaluationCancelled);
        }
        Ok(())
    }

    /// Cancelamento só antes do envio; cancelar de novo não é erro.
    pub fn ensure_cancellable(&self) -> Result<(), AppError> {
        if self.manager_submitted_at.is_some() {
            return Err(AppError::AlreadySubmitted);
        }
        Ok(())
    }

    /// Os KPIs enviados precisam ser exatamente os do snapshot, sem repetição.
    pub fn ensure_scores_match_snapshot(&self, kpi_ids: &[Uuid]) -> Result<(), AppError> {
        let snapshot = self.snapshot().ok_or(AppError::FormNotOpened)?;

        let submitted: HashSet<Uuid> = kpi_ids.iter().copied().collect();
        let expected: HashSet<Uuid> = snapshot.iter().map(|k| k.id).collect();

        if submitted.len() != kpi_ids.len() || submitted != expected {
            return Err(AppError::ScoreSetMismatch);
        }
        Ok(())
    }
}

// --- NOTAS ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationScore {
    pub id: Uuid,
    pub evaluation_id: Uuid,
    pub kpi_id: Uuid,
    #[schema(example = 4)]
    pub manager_score: Option<i16>,
    pub manager_comment: Option<String>,
    // Sobreposição do RH; nunca substitui manager_score
    #[schema(example = 5)]
    pub hr_adjusted_score: Option<i16>,
    pub hr_comment: Option<String>,
    pub show_to_employee: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EvaluationScore {
    /// Nota do RH se houver, senão a do gerente, senão 0.
    pub fn effective_score(&self) -> i16 {
        self.hr_adjusted_score.or(self.manager_score).unwrap_or(0)
    }
}

/// Média das notas efetivas visíveis ao colaborador; 0 se nenhuma estiver visível.
pub fn overall_score(scores: &[EvaluationScore]) -> f64 {
    let visible: Vec<f64> = scores
        .iter()
        .filter(|s| s.show_to_employee)
        .map(|s| f64::from(s.effective_score()))
        .collect();

    if visible.is_empty() {
        return 0.0;
    }
    visible.iter().sum::<f64>() / visible.len() as f64
}

/// Exibição com uma casa decimal ("4.0").
pub fn format_score(value: f64) -> String {
    format!("{value:.1}")
}

// --- ENTRADAS DO GERENTE / RH ---

/// Uma nota enviada pelo gerente para um KPI do snapshot.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreInput {
    pub kpi_id: Uuid,
    #[schema(example = 4)]
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitEvaluationPayload {
    pub scores: Vec<ScoreInput>,
    #[schema(example = "Keep mentoring the new hires.")]
    pub recommendations: String,
}

impl SubmitEvaluationPayload {
    /// Validação local (passo "a"): faixa das notas e recomendações não vazias.
    pub fn check(&self) -> Result<(), AppError> {
        if let Some(bad) = self.scores.iter().find(|s| !(1..=5).contains(&s.rating)) {
            return Err(AppError::InvalidScore(bad.rating));
        }
        if self.recommendations.trim().is_empty() {
            return Err(AppError::RecommendationsRequired);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HrScoreAdjustment {
    pub score_id: Uuid,
    #[schema(example = 5)]
    pub hr_adjusted_score: Option<i32>,
    pub hr_comment: Option<String>,
    pub show_to_employee: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HrAdjustPayload {
    pub scores: Vec<HrScoreAdjustment>,
}

impl HrAdjustPayload {
    /// Valida o lote inteiro antes de qualquer escrita.
    pub fn check(&self) -> Result<(), AppError> {
        for adj in &self.scores {
            if let Some(score) = adj.hr_adjusted_score {
                if !(1..=5).contains(&score) {
                    return Err(AppError::InvalidScore(score));
                }
                let has_comment = adj
                    .hr_comment
                    .as_deref()
                    .is_some_and(|c| !c.trim().is_empty());
                if !has_comment {
                    return Err(AppError::HrCommentRequired);
                }
            }
        }
        Ok(())
    }
}
