//! Configuration access port trait.

use crate::domain::error::QmoneyError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// `None` when the key is absent. Zero, negative or non-numeric values
    /// are `ConfigInvalid`.
    fn get_positive_int(&self, section: &str, key: &str) -> Result<Option<u64>, QmoneyError> {
        let Some(raw) = self.get_string(section, key) else {
            return Ok(None);
        };
        match raw.trim().parse::<u64>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(QmoneyError::ConfigInvalid {
                section: section.into(),
                key: key.into(),
                reason: format!("expected a positive integer, got {raw:?}"),
            }),
        }
    }
}
