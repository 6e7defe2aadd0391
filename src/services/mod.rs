pub mod connection;
pub mod ocs;
pub mod retry;
pub mod transport;
pub mod url_management;
pub mod webdav;

pub use connection::Connection;
pub use ocs::{AppService, AttributeService, GroupService, ShareService, UserService};
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use transport::{HttpTransport, RawResponse, ReqwestTransport, TransportRequest};
pub use url_management::UrlManager;
pub use webdav::WebDavService;
