pub mod admin_guard;
pub mod auth_context;
