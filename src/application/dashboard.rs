use crate::application::resources::TimeManagerApi;
use crate::domain::aggregation::{average, DateOrder};
use crate::domain::chart::{assemble, ChartData, ChartLabel, ChartMode};
use crate::domain::interval::{split_all, DaySegment, InvalidInterval};
use crate::domain::models::{TeamDetail, WorkingTime};
use crate::infrastructure::error::ClientError;
use crate::infrastructure::http_transport::HttpTransport;
use crate::infrastructure::session_storage::SessionStorage;
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Zone whose calendar days make up the chart axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartTimeZone {
    Local,
    Named(Tz),
}

impl ChartTimeZone {
    pub fn split(&self, working_times: &[WorkingTime]) -> Result<Vec<DaySegment>, InvalidInterval> {
        match self {
            Self::Local => split_all(working_times, &chrono::Local),
            Self::Named(tz) => split_all(working_times, tz),
        }
    }
}

impl From<Option<Tz>> for ChartTimeZone {
    fn from(value: Option<Tz>) -> Self {
        value.map_or(Self::Local, Self::Named)
    }
}

pub struct DashboardService<S, T>
where
    S: SessionStorage,
    T: HttpTransport,
{
    api: Arc<TimeManagerApi<S, T>>,
    timezone: ChartTimeZone,
    date_order: DateOrder,
}

impl<S, T> DashboardService<S, T>
where
    S: SessionStorage,
    T: HttpTransport,
{
    pub fn new(api: Arc<TimeManagerApi<S, T>>, timezone: ChartTimeZone, date_order: DateOrder) -> Self {
        Self {
            api,
            timezone,
            date_order,
        }
    }

    pub fn with_date_order(mut self, date_order: DateOrder) -> Self {
        self.date_order = date_order;
        self
    }

    pub fn working_time_chart(
        &self,
        labels: &[ChartLabel],
        working_times: &[WorkingTime],
        mode: ChartMode,
    ) -> Result<ChartData, ClientError> {
        let segments = self.timezone.split(working_times)?;
        Ok(assemble(labels, &segments, mode, self.date_order))
    }

    #[instrument(skip(self, display_name))]
    pub async fn user_chart(&self, user_id: i64, display_name: &str) -> Result<ChartData, ClientError> {
        let working_times = self.api.working_times_for_user(user_id).await?;
        debug!(count = working_times.len(), "loaded working times");
        self.working_time_chart(
            &[ChartLabel::new(user_id, display_name)],
            &working_times,
            ChartMode::ByEntity,
        )
    }

    /// Hours of every team member, one value per member in team order.
    #[instrument(skip(self))]
    pub async fn team_members_chart(&self, team_id: i64, mode: ChartMode) -> Result<ChartData, ClientError> {
        let team = self.api.team(team_id).await?;
        let (labels, segments) = self.team_segments(&team).await?;
        Ok(assemble(&labels, &segments, mode, self.date_order))
    }

    /// Average hours per day over the members who worked that day.
    #[instrument(skip(self))]
    pub async fn team_average_chart(&self, team_id: i64) -> Result<ChartData, ClientError> {
        let team = self.api.team(team_id).await?;
        let (_, segments) = self.team_segments(&team).await?;
        let averaged = average(&segments, team.id);
        Ok(assemble(
            &[ChartLabel::new(team.id, team.name)],
            &averaged,
            ChartMode::ByEntity,
            self.date_order,
        ))
    }

    async fn team_segments(
        &self,
        team: &TeamDetail,
    ) -> Result<(Vec<ChartLabel>, Vec<DaySegment>), ClientError> {
        let mut labels = Vec::new();
        let mut segments = Vec::new();
        for member in team.members() {
            let working_times = self.api.working_times_for_user(member.id).await?;
            segments.extend(self.timezone.split(&working_times)?);
            labels.push(ChartLabel::new(member.id, member.username.clone()));
        }
        debug!(members = labels.len(), segments = segments.len(), "collected team segments");
        Ok((labels, segments))
    }
}
