// src/models/round.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::evaluation::EvaluationStatus;

// Mapeia o CREATE TYPE round_status do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "round_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRound {
    pub id: Uuid,
    pub company_id: Uuid,
    #[schema(example = 3)]
    pub round_number: i32,
    #[schema(example = "Q3 2025")]
    pub name: Option<String>,
    pub status: RoundStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Próximo número de rodada, dado o maior número já usado pela empresa.
pub fn next_round_number(current_max: Option<i32>) -> i32 {
    current_max.unwrap_or(0) + 1
}

// Linha da listagem de rodadas (avaliação + nomes)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoundEvaluationRow {
    pub evaluation_id: Uuid,
    pub employee_id: Uuid,
    pub employee_name: String,
    pub manager_id: Uuid,
    pub manager_name: String,
    pub status: EvaluationStatus,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub pending: usize,
    pub submitted: usize,
    pub published: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    pub fn tally<'a>(statuses: impl IntoIterator<Item = &'a EvaluationStatus>) -> Self {
        let mut counts = Self::default();
        for status in statuses {
            match status {
                EvaluationStatus::Pending => counts.pending += 1,
                EvaluationStatus::Submitted => counts.submitted += 1,
                EvaluationStatus::Published => counts.published += 1,
                EvaluationStatus::Cancelled => counts.cancelled += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoundOverview {
    #[serde(flatten)]
    pub round: EvaluationRound,
    pub counts: StatusCounts,
    pub evaluations: Vec<RoundEvaluationRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_round_is_number_one() {
        assert_eq!(next_round_number(None), 1);
    }

    #[test]
    fn rounds_are_numbered_without_gaps() {
        let mut max = None;
        for expected in 1..=5 {
            let n = next_round_number(max);
            assert_eq!(n, expected);
            max = Some(n);
        }
    }

    #[test]
    fn status_counts_tally_every_state() {
        let statuses = [
            EvaluationStatus::Pending,
            EvaluationStatus::Pending,
            EvaluationStatus::Submitted,
            EvaluationStatus::Cancelled,
        ];
        let counts = StatusCounts::tally(&statuses);
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.submitted, 1);
        assert_eq!(counts.published, 0);
        assert_eq!(counts.cancelled, 1);
    }
}
