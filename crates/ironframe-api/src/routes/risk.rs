//! # Scoring API
//!
//! Stateless scoring endpoints:
//!
//! - **POST `/v1/risk/classify`** — classify an exposure against a threshold
//! - **POST `/v1/entities/score`** — score an entity's security posture
//! - **POST `/v1/vendors/health`** — score a vendor's health

use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use ironframe_core::LetterGrade;
use ironframe_risk::{
    classify_risk, score_entity, score_vendor_health, AssetRecord, AssetStatus, EntityScoreInput,
    EntityScoreResult, RiskLevel, VendorHealthInput, VendorHealthScore,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::{extract_json, extract_validated_json, Validate};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// Request to classify an exposure.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ClassifyRiskRequest {
    /// Annualized loss exposure in cents.
    pub exposure_cents: i64,
    /// Risk threshold in cents.
    pub threshold_cents: i64,
}

/// Classification result.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClassifyRiskResponse {
    /// `ACCEPTABLE`, `ELEVATED`, or `CRITICAL`.
    #[schema(value_type = String)]
    pub level: RiskLevel,
}

/// One asset in an entity score request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssetInput {
    pub id: String,
    pub name: String,
    /// `SECURE`, `WARNING`, `VULNERABLE`, or `CRITICAL`.
    #[schema(value_type = String)]
    pub status: AssetStatus,
}

/// Request to score an entity.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ScoreEntityRequest {
    #[serde(default)]
    pub assets: Vec<AssetInput>,
    #[serde(default)]
    pub active_threats: u32,
    /// Policy attestation completeness, 0–100.
    pub policy_attestation_percent: u8,
}

impl Validate for ScoreEntityRequest {
    fn validate(&self) -> Result<(), String> {
        if self.policy_attestation_percent > 100 {
            return Err("policy_attestation_percent must be between 0 and 100".to_string());
        }
        Ok(())
    }
}

impl ScoreEntityRequest {
    fn into_input(self) -> EntityScoreInput {
        EntityScoreInput {
            assets: self
                .assets
                .into_iter()
                .map(|a| AssetRecord::new(a.id, a.name, a.status))
                .collect(),
            active_threats: self.active_threats,
            policy_attestation_percent: self.policy_attestation_percent,
        }
    }
}

/// Entity score result.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EntityScoreResponse {
    pub score: u8,
    #[schema(value_type = String)]
    pub grade: LetterGrade,
    pub critical_assets: u32,
    pub vulnerable_assets: u32,
    pub active_threats: u32,
    pub policy_attestation_percent: u8,
    pub bonus_points: u32,
}

impl From<EntityScoreResult> for EntityScoreResponse {
    fn from(r: EntityScoreResult) -> Self {
        Self {
            score: r.score,
            grade: r.grade,
            critical_assets: r.critical_assets,
            vulnerable_assets: r.vulnerable_assets,
            active_threats: r.active_threats,
            policy_attestation_percent: r.policy_attestation_percent,
            bonus_points: r.bonus_points,
        }
    }
}

/// Request to score a vendor's health.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct VendorHealthRequest {
    /// Days until the primary evidence document expires; `<= 0` is expired.
    pub days_until_primary_expiration: i64,
    #[serde(default)]
    pub evidence_docs: Vec<String>,
    #[serde(default)]
    pub has_active_industry_alert: bool,
    #[serde(default)]
    pub has_active_breach_alert: bool,
    #[serde(default)]
    pub has_pending_versioning: bool,
    #[serde(default)]
    pub has_stakeholder_escalation: bool,
    #[serde(default)]
    pub requires_manual_review: bool,
}

impl From<VendorHealthRequest> for VendorHealthInput {
    fn from(r: VendorHealthRequest) -> Self {
        Self {
            days_until_primary_expiration: r.days_until_primary_expiration,
            evidence_docs: r.evidence_docs,
            has_active_industry_alert: r.has_active_industry_alert,
            has_active_breach_alert: r.has_active_breach_alert,
            has_pending_versioning: r.has_pending_versioning,
            has_stakeholder_escalation: r.has_stakeholder_escalation,
            requires_manual_review: r.requires_manual_review,
        }
    }
}

/// Vendor health result with component breakdown.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VendorHealthResponse {
    pub score: u8,
    #[schema(value_type = String)]
    pub grade: LetterGrade,
    pub breakdown: Vec<String>,
    #[schema(value_type = Object)]
    pub components: serde_json::Value,
}

impl TryFrom<VendorHealthScore> for VendorHealthResponse {
    type Error = AppError;

    fn try_from(s: VendorHealthScore) -> Result<Self, Self::Error> {
        Ok(Self {
            score: s.score,
            grade: s.grade,
            breakdown: s.breakdown,
            components: serde_json::to_value(&s.components)
                .map_err(|e| AppError::Internal(e.to_string()))?,
        })
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the scoring router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/risk/classify", post(classify))
        .route("/v1/entities/score", post(score_entity_handler))
        .route("/v1/vendors/health", post(vendor_health))
}

/// POST /v1/risk/classify — Classify an exposure against a threshold.
#[utoipa::path(
    post,
    path = "/v1/risk/classify",
    request_body = ClassifyRiskRequest,
    responses(
        (status = 200, description = "Risk level", body = ClassifyRiskResponse),
        (status = 422, description = "Negative exposure or non-positive threshold", body = crate::error::ErrorBody),
    ),
    tag = "risk"
)]
pub(crate) async fn classify(
    body: Result<Json<ClassifyRiskRequest>, JsonRejection>,
) -> Result<Json<ClassifyRiskResponse>, AppError> {
    let req = extract_json(body)?;
    let level = classify_risk(req.exposure_cents, req.threshold_cents)?;
    Ok(Json(ClassifyRiskResponse { level }))
}

/// POST /v1/entities/score — Score an entity's security posture.
#[utoipa::path(
    post,
    path = "/v1/entities/score",
    request_body = ScoreEntityRequest,
    responses(
        (status = 200, description = "Entity score", body = EntityScoreResponse),
        (status = 422, description = "Attestation percentage out of range", body = crate::error::ErrorBody),
    ),
    tag = "risk"
)]
pub(crate) async fn score_entity_handler(
    body: Result<Json<ScoreEntityRequest>, JsonRejection>,
) -> Result<Json<EntityScoreResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let input = req.into_input();
    Ok(Json(score_entity(&input).into()))
}

/// POST /v1/vendors/health — Score a vendor's health.
#[utoipa::path(
    post,
    path = "/v1/vendors/health",
    request_body = VendorHealthRequest,
    responses(
        (status = 200, description = "Vendor health score", body = VendorHealthResponse),
    ),
    tag = "risk"
)]
pub(crate) async fn vendor_health(
    body: Result<Json<VendorHealthRequest>, JsonRejection>,
) -> Result<Json<VendorHealthResponse>, AppError> {
    let req = extract_json(body)?;
    let score = score_vendor_health(&req.into());
    Ok(Json(score.try_into()?))
}
