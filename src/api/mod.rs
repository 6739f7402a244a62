pub mod attendance;
pub mod auth;
pub mod clients;
pub mod health;
pub mod meetings;
pub mod profile;
pub mod reimbursement;
pub mod swagger;
