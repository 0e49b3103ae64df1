// Consultant registry: listing, status updates, training assignment, and the
// candidate view consumed by shortlisting.

pub mod handlers;
pub mod repository;
