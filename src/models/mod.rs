pub mod attendance;
pub mod client;
pub mod meeting;
pub mod reimbursement;
pub mod user;

pub use attendance::*;
pub use client::*;
pub use meeting::*;
pub use reimbursement::*;
pub use user::*;
