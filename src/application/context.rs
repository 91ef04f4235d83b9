use crate::application::api_client::AuthenticatedClient;
use crate::application::bootstrap::{bootstrap_workspace, BootstrapResult};
use crate::application::dashboard::{ChartTimeZone, DashboardService};
use crate::application::resources::TimeManagerApi;
use crate::application::session::SessionStore;
use crate::domain::access::RouteGuard;
use crate::domain::models::SessionState;
use crate::infrastructure::endpoints::Endpoints;
use crate::infrastructure::error::ClientError;
use crate::infrastructure::http_transport::{HttpTransport, ReqwestTransport};
use crate::infrastructure::logging::enable_logging;
use crate::infrastructure::session_storage::SqliteSessionStorage;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything a front end needs, wired from one workspace directory.
pub struct ClientContext<T: HttpTransport = ReqwestTransport> {
    workspace: BootstrapResult,
    session: Arc<SessionStore<SqliteSessionStorage, T>>,
    api: Arc<TimeManagerApi<SqliteSessionStorage, T>>,
    dashboard: DashboardService<SqliteSessionStorage, T>,
}

impl ClientContext<ReqwestTransport> {
    pub fn new(workspace_root: PathBuf) -> Result<Self, ClientError> {
        Self::with_transport(&workspace_root, Arc::new(ReqwestTransport::new()))
    }
}

impl<T: HttpTransport> ClientContext<T> {
    pub fn with_transport(workspace_root: &Path, transport: Arc<T>) -> Result<Self, ClientError> {
        let workspace = bootstrap_workspace(workspace_root)?;
        let endpoints = Endpoints::new(workspace.config.back_url()?)?;
        let timezone = ChartTimeZone::from(workspace.config.timezone()?);
        let date_order = workspace.config.date_order;

        let storage = Arc::new(SqliteSessionStorage::new(&workspace.database_path));
        let session = Arc::new(SessionStore::new(endpoints, storage, transport)?);
        let api = Arc::new(TimeManagerApi::new(AuthenticatedClient::new(Arc::clone(
            &session,
        ))));
        let dashboard = DashboardService::new(Arc::clone(&api), timezone, date_order);

        Ok(Self {
            workspace,
            session,
            api,
            dashboard,
        })
    }

    /// Installs file and stdout logging at the configured level.
    pub fn enable_logging(&self, show_std: bool) -> Result<(), ClientError> {
        enable_logging(
            &self.workspace.logs_dir,
            &self.workspace.config.log_level,
            show_std,
        )
    }

    pub async fn start(&self) -> SessionState {
        self.session.start().await
    }

    pub fn can_open(&self, guard: RouteGuard) -> bool {
        guard.allows(self.session.user().as_ref())
    }

    pub fn workspace(&self) -> &BootstrapResult {
        &self.workspace
    }

    pub fn session(&self) -> &SessionStore<SqliteSessionStorage, T> {
        &self.session
    }

    pub fn api(&self) -> &TimeManagerApi<SqliteSessionStorage, T> {
        &self.api
    }

    pub fn dashboard(&self) -> &DashboardService<SqliteSessionStorage, T> {
        &self.dashboard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Credentials;
    use crate::infrastructure::http_transport::fake::ScriptedTransport;
    use crate::infrastructure::http_transport::HttpMethod;
    use serde_json::json;

    #[tokio::test]
    async fn fresh_workspace_starts_anonymous() {
        let temp = tempfile::tempdir().expect("temp dir");
        let transport = Arc::new(ScriptedTransport::default());

        let context = ClientContext::with_transport(temp.path(), Arc::clone(&transport))
            .expect("context");

        assert_eq!(context.start().await, SessionState::Anonymous);
        assert!(!context.can_open(RouteGuard::Authenticated));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn login_survives_a_restart() {
        let temp = tempfile::tempdir().expect("temp dir");
        let transport = Arc::new(ScriptedTransport::default());
        transport.respond(
            HttpMethod::Post,
            "/api/account/login",
            200,
            json!({ "data": { "access_token": "access-1", "refresh_token": "refresh-1" } }),
        );
        let manager = json!({ "data": {
            "id": 4,
            "email": "ada@example.com",
            "username": "ada",
            "role": { "id": 2, "name": "Manager" }
        } });
        transport.respond(HttpMethod::Get, "/api/account", 200, manager.clone());
        transport.respond(HttpMethod::Get, "/api/account", 200, manager);

        let context = ClientContext::with_transport(temp.path(), Arc::clone(&transport))
            .expect("context");
        context
            .session()
            .login(&Credentials {
                email: "ada@example.com".to_string(),
                password: "secret".to_string(),
            })
            .await
            .expect("login");
        drop(context);

        let restarted = ClientContext::with_transport(temp.path(), Arc::clone(&transport))
            .expect("context");

        assert_eq!(restarted.start().await, SessionState::Authenticated);
        assert!(restarted.can_open(RouteGuard::Manager));
        assert!(!restarted.can_open(RouteGuard::Admin));
    }
}
