use crate::api::leave_request::{
    EntitlementQuery, EntitlementsResponse, LeaveFilter, LeaveListResponse, LeavePayload,
};
use crate::model::leave::{AttachmentMeta, LeaveCategory, LeaveMode};
use crate::model::leave_request::{LeaveRow, LeaveStatus};
use crate::policy::document::{DocumentMode, DocumentRequirement};
use crate::policy::ledger::EntitlementBalance;
use crate::policy::validation::{Assessment, WorkdaySpan};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Policy API",
        version = "1.0.0",
        description = r#"
## Leave Management

Employees file business, sick, vacation and special leave; HR approves or rejects it.
Every request is checked against the company leave policy before it is stored.

### 🔹 Policy checks
- Six-day work week (Sunday off) for workday counting
- 3 workdays' notice for normal business leave, 1 day for sterilization leave
- Medical certificate for sick leave of 3 or more workdays
- Annual entitlement ceilings per category and special leave type
- Attachment count, size and type limits

### 🔐 Security
All endpoints require a **JWT Bearer** access token issued by the identity service.
Approval, rejection and browsing other employees' leave is limited to **Admin** and **HR**.

### 📦 Response Format
- Validation problems come back as a map of form field to message
- Pagination supported for list endpoints
"#,
    ),
    paths(
        crate::api::leave_request::validate_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::entitlements,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::cancel_leave
    ),
    components(
        schemas(
            LeavePayload,
            AttachmentMeta,
            LeaveCategory,
            LeaveMode,
            LeaveStatus,
            Assessment,
            WorkdaySpan,
            DocumentRequirement,
            DocumentMode,
            EntitlementBalance,
            EntitlementsResponse,
            EntitlementQuery,
            LeaveFilter,
            LeaveRow,
            LeaveListResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave request and entitlement APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
