pub mod leave;
pub mod leave_request;
pub mod role;
