use crate::constants::pipeline::DEFAULT_SHARD_SIZE;
use crate::errors::AuditError;

/// Execution settings for an audit run.
///
/// These only shape how work is split; they never change the audit output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditConfig {
    /// Number of consecutive record indices mapped by one shard worker.
    pub shard_size: usize,
    /// Worker thread cap; `None` uses the global rayon pool.
    pub max_workers: Option<usize>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            shard_size: DEFAULT_SHARD_SIZE,
            max_workers: None,
        }
    }
}

impl AuditConfig {
    /// Override the shard size.
    pub fn with_shard_size(mut self, shard_size: usize) -> Self {
        self.shard_size = shard_size;
        self
    }

    /// Cap the number of worker threads.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = Some(max_workers);
        self
    }

    /// Reject settings that cannot run.
    pub fn validate(&self) -> Result<(), AuditError> {
        if self.shard_size == 0 {
            return Err(AuditError::Configuration(
                "shard_size must be greater than zero".into(),
            ));
        }
        if self.max_workers == Some(0) {
            return Err(AuditError::Configuration(
                "max_workers must be greater than zero when set".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(AuditConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_sizes_are_rejected() {
        assert!(matches!(
            AuditConfig::default().with_shard_size(0).validate(),
            Err(AuditError::Configuration(_))
        ));
        assert!(matches!(
            AuditConfig::default().with_max_workers(0).validate(),
            Err(AuditError::Configuration(_))
        ));
    }
}
