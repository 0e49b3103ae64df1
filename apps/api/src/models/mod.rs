pub mod consultant;
pub mod leave;
