pub mod attendance_service;
pub mod auth_service;
pub mod client_service;
pub mod meeting_service;
pub mod reimbursement_service;
