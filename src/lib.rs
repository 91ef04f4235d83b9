pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::api_client::AuthenticatedClient;
pub use application::bootstrap::{bootstrap_workspace, BootstrapResult};
pub use application::context::ClientContext;
pub use application::dashboard::{ChartTimeZone, DashboardService};
pub use application::resources::TimeManagerApi;
pub use application::session::SessionStore;
pub use domain::access::RouteGuard;
pub use domain::aggregation::{average, bucket, DateOrder};
pub use domain::chart::{assemble, ChartData, ChartLabel, ChartMode, ChartSeries};
pub use domain::interval::{split_all, split_interval, DaySegment, InvalidInterval};
pub use domain::models::{Session, SessionState, User, WorkingTime};
pub use infrastructure::error::{ApiFailure, ClientError};
pub use infrastructure::http_transport::{HttpTransport, ReqwestTransport};
pub use infrastructure::session_storage::{InMemorySessionStorage, SessionStorage, SqliteSessionStorage};
