/// Domain records and their in-memory stores
///
/// - [`user`]: identities and the credential store
/// - [`todo`]: todos and the ownership-scoped todo store
///
/// Both stores are volatile and rebuilt empty on process start.

pub mod todo;
pub mod user;

pub use todo::{CreateTodo, StatusFilter, Todo, TodoFilter, TodoStats, TodoStatus, TodoStore, UpdateTodo};
pub use user::{Credential, CredentialStore, NewUser, User};
