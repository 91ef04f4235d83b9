use crate::infrastructure::error::ClientError;
use url::Url;

/// Builds backend URLs below a configured base such as `https://host/api`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn new(base: Url) -> Result<Self, ClientError> {
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidConfig(format!(
                "backUrl cannot be a base: {base}"
            )));
        }
        Ok(Self { base })
    }

    pub fn parse(base: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base.trim())
            .map_err(|error| ClientError::InvalidConfig(format!("invalid backUrl '{base}': {error}")))?;
        Self::new(base)
    }

    fn join(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        url
    }

    pub fn account(&self) -> Url {
        self.join(&["account"])
    }

    pub fn login(&self) -> Url {
        self.join(&["account", "login"])
    }

    pub fn register(&self) -> Url {
        self.join(&["account", "register"])
    }

    pub fn refresh(&self) -> Url {
        self.join(&["account", "refresh"])
    }

    pub fn logout(&self) -> Url {
        self.join(&["account", "logout"])
    }

    pub fn working_times(&self) -> Url {
        self.join(&["workingtimes"])
    }

    /// `/workingtimes/{id}`; the backend reads the id as a user id on GET/POST
    /// and as a working time id on PUT/DELETE.
    pub fn working_time(&self, id: i64) -> Url {
        self.join(&["workingtimes", &id.to_string()])
    }

    pub fn clocks(&self) -> Url {
        self.join(&["clocks"])
    }

    pub fn clock(&self, user_id: i64) -> Url {
        self.join(&["clocks", &user_id.to_string()])
    }

    pub fn teams(&self) -> Url {
        self.join(&["teams"])
    }

    pub fn team(&self, team_id: i64) -> Url {
        self.join(&["teams", &team_id.to_string()])
    }
}
