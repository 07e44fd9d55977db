/// Database models and data structures
///
/// Each submodule defines one entity: the row struct, its create/update
/// inputs, and any lifecycle state machine. Persistence lives behind the
/// `store` module; models carry no SQL.
pub mod category;
pub mod provider;
pub mod review;
pub mod service_request;
pub mod session;
pub mod task;
pub mod user;

pub use category::{default_categories, CreateCategory, ServiceCategory};
pub use provider::{ApprovalStatus, CreateProvider, ProviderReview, ServiceProvider, UpdateProvider};
pub use review::{round_rating, CreateReview, Review};
pub use service_request::{CreateServiceRequest, RequestStatus, ServiceRequest};
pub use session::{CreateSession, Session};
pub use task::{CreateTask, Task, TaskStatus, UpdateTask};
pub use user::{CreateUser, UpdateUser, User};
