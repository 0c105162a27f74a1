use std::sync::Arc;

use crate::daemon::config::Configuration;
use crate::domain::entity::PhaseDuration;
use crate::domain::repository::{duration::GetDurationError, DurationRepository};

/// A [`DurationRepository`] implementation which reads configuration files.
pub struct DurationConfiguration {
    config: Arc<Configuration>,
}

impl DurationConfiguration {
    /// Creates a new [`DurationConfiguration`].
    pub fn new(config: Arc<Configuration>) -> Self {
        Self { config }
    }

    fn convert(raw: u64) -> Result<PhaseDuration, GetDurationError> {
        raw.try_into()
            .map_err(|err| GetDurationError::Invalid { source: err })
    }
}

#[async_trait::async_trait]
impl DurationRepository for DurationConfiguration {
    async fn pomodoro_duration(&self) -> Result<PhaseDuration, GetDurationError> {
        Self::convert(self.config.duration.pomodoro)
    }

    async fn break_duration(&self) -> Result<PhaseDuration, GetDurationError> {
        Self::convert(self.config.duration.break_)
    }

    async fn refresh_interval(&self) -> Result<PhaseDuration, GetDurationError> {
        Self::convert(self.config.title.refresh)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn configuration(content: &str) -> Arc<Configuration> {
        Arc::new(toml::from_str(content).unwrap())
    }

    #[tokio::test]
    async fn duration_configuration_reads_sections() {
        let repo = DurationConfiguration::new(configuration(
            "[duration]\npomodoro = 60\nbreak = 30\n[title]\nrefresh = 2\n",
        ));

        let pomodoro = repo.pomodoro_duration().await.unwrap();
        let break_ = repo.break_duration().await.unwrap();
        let refresh = repo.refresh_interval().await.unwrap();
        assert_eq!(pomodoro.get(), Duration::from_secs(60));
        assert_eq!(break_.get(), Duration::from_secs(30));
        assert_eq!(refresh.get(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn duration_configuration_rejects_zero() {
        let repo = DurationConfiguration::new(configuration(
            "[duration]\npomodoro = 0\nbreak = 30\n",
        ));

        assert!(matches!(
            repo.pomodoro_duration().await,
            Err(GetDurationError::Invalid { .. })
        ));
        assert!(repo.break_duration().await.is_ok());
    }

    #[tokio::test]
    async fn duration_configuration_rejects_huge_duration() {
        let repo = DurationConfiguration::new(configuration(
            "[duration]\npomodoro = 9223372036854775807\nbreak = 30\n",
        ));

        assert!(matches!(
            repo.pomodoro_duration().await,
            Err(GetDurationError::Invalid { .. })
        ));
    }
}
