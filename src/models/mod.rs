// Value objects produced by the WebDAV parser and the OCS codec

pub mod app;
pub mod ocs;
pub mod resource;
pub mod share;
pub mod user;

pub use app::*;
pub use ocs::*;
pub use resource::*;
pub use share::*;
pub use user::*;
