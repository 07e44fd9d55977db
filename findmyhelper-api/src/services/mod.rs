/// External service clients
///
/// Trait-based adapters for the two outbound dependencies: the transactional
/// email provider and the object storage service. Production implementations
/// use reqwest; tests substitute recording fakes.
pub mod email;
pub mod object_store;
