use crate::application::api_client::AuthenticatedClient;
use crate::domain::models::{
    AccountUpdate, Clock, Team, TeamDetail, User, WorkingTime, WorkingTimeDto, WorkingTimePatch,
};
use crate::infrastructure::error::ApiFailure;
use crate::infrastructure::http_transport::HttpTransport;
use crate::infrastructure::session_storage::SessionStorage;
use serde::Serialize;

#[derive(Serialize)]
struct WorkingTimeBody<'a, W: Serialize> {
    working_time: &'a W,
}

/// Typed calls to the time manager backend.
pub struct TimeManagerApi<S, T>
where
    S: SessionStorage,
    T: HttpTransport,
{
    client: AuthenticatedClient<S, T>,
}

impl<S, T> TimeManagerApi<S, T>
where
    S: SessionStorage,
    T: HttpTransport,
{
    pub fn new(client: AuthenticatedClient<S, T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &AuthenticatedClient<S, T> {
        &self.client
    }

    fn endpoints(&self) -> &crate::infrastructure::endpoints::Endpoints {
        self.client.session().endpoints()
    }

    pub async fn me(&self) -> Result<User, ApiFailure> {
        self.client.get(self.endpoints().account()).await
    }

    pub async fn update_account(&self, update: &AccountUpdate) -> Result<User, ApiFailure> {
        self.client.put(self.endpoints().account(), update).await
    }

    /// Deletes the signed-in account and drops the local session with it.
    pub async fn delete_account(&self) -> Result<(), ApiFailure> {
        self.client.delete(self.endpoints().account()).await?;
        self.client.session().local_logout();
        Ok(())
    }

    pub async fn working_times(&self) -> Result<Vec<WorkingTime>, ApiFailure> {
        self.client.get(self.endpoints().working_times()).await
    }

    pub async fn working_times_for_user(&self, user_id: i64) -> Result<Vec<WorkingTime>, ApiFailure> {
        self.client.get(self.endpoints().working_time(user_id)).await
    }

    pub async fn create_working_time(
        &self,
        user_id: i64,
        working_time: &WorkingTimeDto,
    ) -> Result<WorkingTime, ApiFailure> {
        self.client
            .post(
                self.endpoints().working_time(user_id),
                Some(&WorkingTimeBody { working_time }),
            )
            .await
    }

    pub async fn update_working_time(
        &self,
        working_time_id: i64,
        patch: &WorkingTimePatch,
    ) -> Result<WorkingTime, ApiFailure> {
        self.client
            .put(
                self.endpoints().working_time(working_time_id),
                &WorkingTimeBody { working_time: patch },
            )
            .await
    }

    pub async fn delete_working_time(&self, working_time_id: i64) -> Result<(), ApiFailure> {
        self.client
            .delete(self.endpoints().working_time(working_time_id))
            .await
    }

    pub async fn clocks(&self) -> Result<Vec<Clock>, ApiFailure> {
        self.client.get(self.endpoints().clocks()).await
    }

    pub async fn clock(&self, user_id: i64) -> Result<Clock, ApiFailure> {
        self.client.get(self.endpoints().clock(user_id)).await
    }

    /// Toggles the user's clock: clocks in when out, out when in.
    pub async fn clock_user(&self, user_id: i64) -> Result<Clock, ApiFailure> {
        self.client
            .post::<serde_json::Value, Clock>(self.endpoints().clock(user_id), None)
            .await
    }

    pub async fn teams(&self) -> Result<Vec<Team>, ApiFailure> {
        self.client.get(self.endpoints().teams()).await
    }

    pub async fn team(&self, team_id: i64) -> Result<TeamDetail, ApiFailure> {
        self.client.get(self.endpoints().team(team_id)).await
    }
}
