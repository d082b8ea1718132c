//! Data models

mod asset;
mod audit;
mod change_request;
mod custom_field;
mod inventory;
mod module;
mod organization;
mod project;
mod settings;
mod ticket;
mod user;

pub use asset::*;
pub use audit::*;
pub use change_request::*;
pub use custom_field::*;
pub use inventory::*;
pub use module::*;
pub use organization::*;
pub use project::*;
pub use settings::*;
pub use ticket::*;
pub use user::*;
