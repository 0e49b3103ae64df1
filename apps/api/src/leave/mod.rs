// Leave requests: consultants submit, admins approve or reject.

pub mod handlers;
pub mod repository;
pub mod validation;
