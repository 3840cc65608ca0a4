use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::model::leave::{AttachmentMeta, LeaveDraft, LeaveKindError, LeaveMode, LeaveSelection};
use crate::model::leave_request::{LeaveRow, LeaveStatus};
use crate::policy::ledger::EntitlementBalance;
use crate::policy::{
    Assessment, EntitlementLedger, ErrorField, LeavePolicy, ValidationEngine, ValidationErrorMap,
};
use crate::utils::{datetime, usage_history};
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlArguments;
use sqlx::{Arguments, MySqlPool};
use utoipa::{IntoParams, ToSchema};

/// Leave form as submitted by the client. Every field may be missing or
/// malformed; problems come back as field errors, never as a rejected body.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[schema(example = json!({
    "category": "sick",
    "sub_type": "general",
    "mode": "all_day",
    "start_at": "2026-01-05",
    "end_at": "2026-01-07",
    "reason": "Fever",
    "retro_reason": "",
    "attachments": []
}))]
pub struct LeavePayload {
    #[schema(example = "business")]
    pub category: Option<String>,
    #[schema(example = "normal")]
    pub sub_type: Option<String>,
    #[serde(default)]
    pub mode: LeaveMode,
    /// `YYYY-MM-DD` for all-day leave, `YYYY-MM-DD HH:MM` for timed leave
    #[schema(example = "2026-01-05")]
    pub start_at: Option<String>,
    #[schema(example = "2026-01-07")]
    pub end_at: Option<String>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub retro_reason: String,
    #[serde(default)]
    pub attachments: Vec<AttachmentMeta>,
}

impl LeavePayload {
    /// Turn the raw form into a draft. Values that could not be understood
    /// are left empty in the draft and reported in the returned map.
    pub fn to_draft(&self) -> (LeaveDraft, ValidationErrorMap) {
        let mut errors = ValidationErrorMap::new();

        let selection =
            match LeaveSelection::from_raw(self.category.as_deref(), self.sub_type.as_deref()) {
                Ok(selection) => selection,
                Err(e) => {
                    tracing::warn!(error = %e, "Unknown leave kind in payload");
                    match &e {
                        LeaveKindError::UnknownCategory(_) => {
                            errors.add(ErrorField::Category, e.to_string());
                            LeaveSelection::Nothing
                        }
                        LeaveKindError::UnknownSubType { category, .. } => {
                            errors.add(ErrorField::SubType, e.to_string());
                            LeaveSelection::CategoryOnly(*category)
                        }
                    }
                }
            };

        let mut bound = |raw: &Option<String>, field: ErrorField| -> Option<NaiveDateTime> {
            let raw = raw.as_deref().filter(|r| !r.trim().is_empty())?;
            let Some(parsed) = datetime::parse_bound(raw) else {
                errors.add(field, format!("`{}` is not a valid date", raw));
                return None;
            };
            if !datetime::in_supported_range(parsed) {
                errors.add(
                    field,
                    format!(
                        "`{}` must fall between {} and {}",
                        raw,
                        datetime::SUPPORTED_YEARS.start(),
                        datetime::SUPPORTED_YEARS.end()
                    ),
                );
                return None;
            }
            Some(parsed)
        };
        let start_at = bound(&self.start_at, ErrorField::StartDate);
        let mut end_at = bound(&self.end_at, ErrorField::EndDate);

        if let (Some(start), Some(end)) = (start_at, end_at) {
            if (end.date() - start.date()).num_days() > MAX_SPAN_DAYS {
                errors.add(
                    ErrorField::EndDate,
                    format!("A single request may span at most {} days", MAX_SPAN_DAYS),
                );
                end_at = None;
            }
        }

        let draft = LeaveDraft {
            selection,
            mode: self.mode,
            start_at,
            end_at,
            reason: self.reason.clone(),
            retro_reason: self.retro_reason.clone(),
            attachments: self.attachments.clone(),
        };
        (draft, errors)
    }
}

/// Longest calendar span a single request may cover.
const MAX_SPAN_DAYS: i64 = 366;

/// Year whose entitlements a draft is charged against: the year its start
/// date falls in, or the current year while no start is picked.
pub fn charge_year(draft: &LeaveDraft, now: NaiveDateTime) -> i32 {
    draft.start_date().map(|d| d.year()).unwrap_or_else(|| now.year())
}

/// Run a draft through the policy engine. Payload-level errors win over
/// engine errors on the same field.
pub fn assess_draft(
    draft: &LeaveDraft,
    mut payload_errors: ValidationErrorMap,
    policy: &LeavePolicy,
    now: NaiveDateTime,
    ledger: &EntitlementLedger,
) -> Assessment {
    let mut assessment = ValidationEngine::new(policy).assess(draft, now, ledger);
    payload_errors.merge(std::mem::take(&mut assessment.errors));
    assessment.errors = payload_errors;
    assessment
}

#[derive(Serialize, ToSchema)]
pub struct EntitlementsResponse {
    #[schema(example = 2026)]
    pub year: i32,
    /// False when history could not be read; figures show zero usage.
    pub usage_known: bool,
    pub balances: Vec<EntitlementBalance>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct EntitlementQuery {
    /// Calendar year, defaults to the current one
    #[schema(example = 2026)]
    pub year: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRow>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Deserialize, IntoParams, ToSchema, Default)]
pub struct LeaveFilter {
    #[schema(example = 123)]
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    #[schema(example = "pending")]
    /// Filter by leave status
    pub status: Option<String>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>, // 1-based
    #[schema(example = 3)]
    /// Pagination per page number
    pub per_page: Option<u64>, // items per page
}

// Helper enum for typed SQLx binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterValue {
    U64(u64),
    Status(LeaveStatus),
}

impl LeaveFilter {
    /// Parsed status filter. A blank value means no filter; an unknown one
    /// is handed back as the error.
    fn status_filter(&self) -> Result<Option<LeaveStatus>, &str> {
        match self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse().map(Some).map_err(|_| raw),
            None => Ok(None),
        }
    }

    /// WHERE clause and its bind values, in placeholder order.
    fn where_clause(&self, status: Option<LeaveStatus>) -> (String, Vec<FilterValue>) {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args = Vec::new();

        if let Some(emp_id) = self.employee_id {
            where_sql.push_str(" AND employee_id = ?");
            args.push(FilterValue::U64(emp_id));
        }
        if let Some(status) = status {
            where_sql.push_str(" AND status = ?");
            args.push(FilterValue::Status(status));
        }

        (where_sql, args)
    }
}

fn filter_arguments(values: &[FilterValue]) -> MySqlArguments {
    let mut arguments = MySqlArguments::default();
    for value in values {
        match value {
            FilterValue::U64(v) => arguments.add(*v),
            FilterValue::Status(status) => arguments.add(status.to_string()),
        }
    }
    arguments
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/* =========================
Dry-run validation
========================= */
/// Validate a leave draft without saving it
#[utoipa::path(
    post,
    path = "/api/leave/validate",
    request_body = LeavePayload,
    responses(
        (status = 200, description = "Assessment of the draft", body = Assessment),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn validate_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<LeavePayload>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let now = now();
    let (draft, payload_errors) = payload.to_draft();
    let ledger =
        usage_history::load_ledger(pool.get_ref(), employee_id, charge_year(&draft, now)).await;

    let assessment = assess_draft(&draft, payload_errors, &config.policy, now, &ledger);
    Ok(HttpResponse::Ok().json(assessment))
}

/* =========================
Create leave request
========================= */
/// Submit a leave request
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = LeavePayload,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request submitted successfully",
         body = Object,
         example = json!({
            "message": "Leave request submitted",
            "status": "pending",
            "workday_count": 3,
            "document": {"required": true, "mode": "DUE_BY_WORKDAY_3", "due_at": "2026-01-07T23:59:59.999"}
         })
        ),
        (status = 400, description = "Validation failed", body = Object, example = json!({
            "message": "Leave request is not valid",
            "errors": {"startDate": "Business leave needs 3 workdays of notice; earliest start is 2026-01-08"}
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<LeavePayload>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let now = now();
    let (draft, payload_errors) = payload.to_draft();
    let ledger =
        usage_history::load_ledger(pool.get_ref(), employee_id, charge_year(&draft, now)).await;

    let assessment = assess_draft(&draft, payload_errors, &config.policy, now, &ledger);
    if !assessment.can_submit() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Leave request is not valid",
            "errors": assessment.errors,
            "usage_known": assessment.usage_known,
        })));
    }

    // A clean assessment implies a complete kind and both bounds.
    let (Some(kind), Some(start_at), Some(end_at)) = (draft.kind(), draft.start_at, draft.end_at)
    else {
        tracing::error!(employee_id, "Validated draft is incomplete");
        return Err(actix_web::error::ErrorInternalServerError("Internal Server Error"));
    };

    if !assessment.usage_known {
        tracing::warn!(employee_id, "Submitting leave with unchecked entitlement ceilings");
    }

    let document_mode = serde_json::to_value(assessment.document.mode)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    let retro_reason = Some(draft.retro_reason.trim()).filter(|r| !r.is_empty());

    sqlx::query(
        r#"
        INSERT INTO leave_requests
            (employee_id, category, sub_type, mode, start_at, end_at, workday_count,
             reason, retro_reason, is_retroactive, document_mode, document_due_at,
             attachment_count, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(kind.category().to_string())
    .bind(kind.sub_type())
    .bind(assessment.mode.as_ref())
    .bind(start_at)
    .bind(end_at)
    .bind(assessment.workday_count())
    .bind(draft.reason.trim())
    .bind(retro_reason)
    .bind(assessment.retroactive)
    .bind(&document_mode)
    .bind(assessment.document.due_at)
    .bind(draft.attachment_count() as u32)
    .bind(LeaveStatus::Pending.to_string())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to create leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    tracing::info!(
        employee_id,
        user_id = auth.user_id,
        username = %auth.username,
        category = %kind.category(),
        sub_type = kind.sub_type(),
        workdays = assessment.workday_count(),
        retroactive = assessment.retroactive,
        "Leave request submitted"
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave request submitted",
        "status": LeaveStatus::Pending,
        "workday_count": assessment.workday_count(),
        "document": assessment.document,
    })))
}

/* =========================
Entitlement balances
========================= */
/// Used and remaining workdays per leave category for the caller
#[utoipa::path(
    get,
    path = "/api/leave/entitlements",
    params(EntitlementQuery),
    responses(
        (status = 200, description = "Entitlement balances", body = EntitlementsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn entitlements(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EntitlementQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let year = query.year.unwrap_or_else(|| now().year());
    let ledger = usage_history::load_ledger(pool.get_ref(), employee_id, year).await;

    Ok(HttpResponse::Ok().json(EntitlementsResponse {
        year: ledger.year(),
        usage_known: ledger.usage_known(),
        balances: ledger.snapshot(),
    }))
}

/// Move a pending request to `status`. With `owner`, only that employee's
/// request is touched.
async fn settle_pending(
    pool: &MySqlPool,
    actor: &AuthUser,
    leave_id: u64,
    status: LeaveStatus,
    owner: Option<u64>,
) -> actix_web::Result<HttpResponse> {
    let mut sql = String::from(
        r#"
        UPDATE leave_requests
        SET status = ?
        WHERE id = ?
        AND status = ?
        "#,
    );
    if owner.is_some() {
        sql.push_str(" AND employee_id = ?");
    }

    let mut query = sqlx::query(&sql)
        .bind(status.to_string())
        .bind(leave_id)
        .bind(LeaveStatus::Pending.to_string());
    if let Some(employee_id) = owner {
        query = query.bind(employee_id);
    }

    let result = query.execute(pool).await.map_err(|e| {
        tracing::error!(error = %e, leave_id, status = %status, "Leave status update failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Leave request not found or already processed"
        })));
    }

    tracing::info!(
        leave_id,
        status = %status,
        user_id = actor.user_id,
        username = %actor.username,
        "Leave request settled"
    );
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Leave {}", status),
        "status": status,
    })))
}

/* =========================
Approve leave (HR/Admin)
========================= */
/// Swagger doc for approve_leave endpoint
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved successfully", body = Object, example = json!({
            "message": "Leave approved",
            "status": "approved"
        })),
        (status = 400, description = "Leave request not found or already processed", body = Object, example = json!({
            "message": "Leave request not found or already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    settle_pending(pool.get_ref(), &auth, path.into_inner(), LeaveStatus::Approved, None).await
}

/* =========================
Reject leave (HR/Admin)
========================= */
/// Swagger doc for reject_leave endpoint
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    responses(
        (status = 200, description = "Leave rejected successfully", body = Object, example = json!({
            "message": "Leave rejected",
            "status": "rejected"
        })),
        (status = 400, description = "Leave request not found or already processed", body = Object, example = json!({
            "message": "Leave request not found or already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    settle_pending(pool.get_ref(), &auth, path.into_inner(), LeaveStatus::Rejected, None).await
}

/* =========================
Cancel own leave
========================= */
/// Cancel one of the caller's pending requests
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/cancel",
    params(
        ("leave_id" = u64, Path, description = "ID of the caller's leave request")
    ),
    responses(
        (status = 200, description = "Leave canceled", body = Object, example = json!({
            "message": "Leave canceled",
            "status": "canceled"
        })),
        (status = 400, description = "Leave request not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    settle_pending(
        pool.get_ref(),
        &auth,
        path.into_inner(),
        LeaveStatus::Canceled,
        Some(employee_id),
    )
    .await
}

const LEAVE_COLUMNS: &str = r#"
    id, employee_id, category, sub_type, mode, start_at, end_at, workday_count,
    reason, retro_reason, is_retroactive, document_mode, document_due_at,
    attachment_count, status, created_at
"#;

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRow),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();
    let sql = format!("SELECT {} FROM leave_requests WHERE id = ?", LEAVE_COLUMNS);

    let leave = sqlx::query_as::<_, LeaveRow>(&sql)
        .bind(leave_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, leave_id, "Failed to fetch leave request");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match leave {
        Some(data) => Ok(HttpResponse::Ok().json(data)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Leave request not found"
        }))),
    }
}

/// for getting leave applications endpoint
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 400, description = "Unknown status filter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let status = match query.status_filter() {
        Ok(status) => status,
        Err(raw) => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": format!("Unknown status `{}`", raw)
            })));
        }
    };
    let (where_sql, filters) = query.where_clause(status);

    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);
    let total = sqlx::query_scalar_with::<_, i64, _>(&count_sql, filter_arguments(&filters))
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error=%e, "Failed to count leave requests");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let data_sql = format!(
        "SELECT {} FROM leave_requests{} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        LEAVE_COLUMNS, where_sql
    );
    let mut arguments = filter_arguments(&filters);
    arguments.add(per_page);
    arguments.add(offset);

    let leaves = sqlx::query_as_with::<_, LeaveRow, _>(&data_sql, arguments)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error=%e, "Failed to fetch leave list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data: leaves,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave::{LeaveKind, SickType};
    use crate::model::leave_request::UsageRecord;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn ledger() -> EntitlementLedger {
        EntitlementLedger::build(2024, Vec::<UsageRecord>::new().iter())
    }

    fn payload(json: serde_json::Value) -> LeavePayload {
        serde_json::from_value(json).unwrap()
    }

    fn evaluate(p: &LeavePayload) -> Assessment {
        let (draft, errors) = p.to_draft();
        assess_draft(&draft, errors, &LeavePolicy::default(), now(), &ledger())
    }

    #[test]
    fn payload_with_defaults_deserializes() {
        let p = payload(serde_json::json!({"category": "vacation"}));
        assert_eq!(p.mode, LeaveMode::AllDay);
        assert!(p.attachments.is_empty());
        let (draft, errors) = p.to_draft();
        assert!(errors.is_empty());
        assert!(draft.kind().is_none());
    }

    #[test]
    fn timed_payload_parses_minutes() {
        let p = payload(serde_json::json!({
            "category": "sick",
            "sub_type": "in_day",
            "mode": "timed",
            "start_at": "2024-01-10 10:00",
            "end_at": "2024-01-10 19:00",
            "reason": "migraine"
        }));
        let (draft, errors) = p.to_draft();
        assert!(errors.is_empty());
        assert_eq!(draft.kind(), Some(LeaveKind::Sick(SickType::InDay)));

        let assessment = evaluate(&p);
        assert!(assessment.errors.contains(ErrorField::EndDate));
    }

    #[test]
    fn unknown_kind_and_bad_dates_become_field_errors() {
        let p = payload(serde_json::json!({
            "category": "vacation",
            "sub_type": "maternity",
            "start_at": "31/01/2024",
            "end_at": "2024-01-20",
            "reason": "trip"
        }));
        let assessment = evaluate(&p);
        let errors = &assessment.errors;
        assert!(errors.get(ErrorField::SubType).unwrap().contains("maternity"));
        assert!(errors.get(ErrorField::StartDate).unwrap().contains("not a valid date"));
        assert!(!errors.contains(ErrorField::Category));
    }

    #[test]
    fn clean_payload_is_submittable() {
        let p = payload(serde_json::json!({
            "category": "vacation",
            "sub_type": "standard",
            "start_at": "2024-01-15",
            "end_at": "2024-01-20",
            "reason": "holiday"
        }));
        let assessment = evaluate(&p);
        assert!(assessment.can_submit(), "{:?}", assessment.errors);
        assert_eq!(assessment.workday_count(), 6);

        let json = serde_json::to_value(&assessment).unwrap();
        assert_eq!(json["document"]["mode"], "NONE");
        assert_eq!(json["span"]["workday_count"], 6);
    }

    #[test]
    fn extended_year_bound_is_rejected_before_counting() {
        let p = payload(serde_json::json!({
            "category": "vacation",
            "sub_type": "standard",
            "start_at": "2024-01-15",
            "end_at": "+262000-01-20",
            "reason": "holiday"
        }));
        let (draft, errors) = p.to_draft();
        assert!(draft.end_at.is_none());
        assert!(errors.get(ErrorField::EndDate).unwrap().contains("between 1900 and 9999"));

        let assessment = evaluate(&p);
        assert!(!assessment.can_submit());
        assert_eq!(assessment.workday_count(), 0);
    }

    #[test]
    fn span_longer_than_a_year_is_rejected() {
        let p = payload(serde_json::json!({
            "category": "special",
            "sub_type": "other",
            "start_at": "2024-01-15",
            "end_at": "2026-01-15",
            "reason": "sabbatical"
        }));
        let (draft, errors) = p.to_draft();
        assert!(draft.end_at.is_none());
        assert!(errors.get(ErrorField::EndDate).unwrap().contains("366 days"));
        assert!(!errors.contains(ErrorField::StartDate));
    }

    #[test]
    fn ledger_year_follows_start_date() {
        let december = NaiveDate::from_ymd_opt(2024, 12, 20)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let (draft, _) = payload(serde_json::json!({
            "start_at": "2025-01-06",
            "end_at": "2025-01-07"
        }))
        .to_draft();
        assert_eq!(charge_year(&draft, december), 2025);

        let (blank, _) = payload(serde_json::json!({})).to_draft();
        assert_eq!(charge_year(&blank, december), 2024);
    }

    #[test]
    fn list_filter_builds_matching_placeholders() {
        let filter = LeaveFilter {
            employee_id: Some(1000),
            status: Some(" Approved ".to_string()),
            ..LeaveFilter::default()
        };
        let status = filter.status_filter().unwrap();
        assert_eq!(status, Some(LeaveStatus::Approved));

        let (sql, values) = filter.where_clause(status);
        assert_eq!(sql, " WHERE 1=1 AND employee_id = ? AND status = ?");
        assert_eq!(
            values,
            vec![FilterValue::U64(1000), FilterValue::Status(LeaveStatus::Approved)]
        );

        let (sql, values) = LeaveFilter::default().where_clause(None);
        assert_eq!(sql, " WHERE 1=1");
        assert!(values.is_empty());
    }

    #[test]
    fn unknown_status_filter_is_handed_back() {
        let filter = LeaveFilter {
            status: Some("on_hold".to_string()),
            ..LeaveFilter::default()
        };
        assert_eq!(filter.status_filter(), Err("on_hold"));

        let blank = LeaveFilter {
            status: Some("  ".to_string()),
            ..LeaveFilter::default()
        };
        assert_eq!(blank.status_filter(), Ok(None));
    }
}
