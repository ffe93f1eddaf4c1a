use crate::error::ConfigError;

/// Resource limits enforced while reading a compound object.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Limits {
    /// Maximum number of body parts accepted from one object.
    pub max_parts: Option<usize>,
    /// Maximum size in bytes of a single part's header block.
    pub max_header_size: Option<usize>,
    /// Maximum total decoded content buffered by `read_object`.
    pub max_object_size: Option<u64>,
}

impl Limits {
    /// Creates a permissive limits configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects limits that could never be satisfied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_parts == Some(0) {
            return Err(ConfigError::InvalidLimitValue { limit: "max_parts" });
        }
        if self.max_header_size == Some(0) {
            return Err(ConfigError::InvalidLimitValue {
                limit: "max_header_size",
            });
        }
        if self.max_object_size == Some(0) {
            return Err(ConfigError::InvalidLimitValue {
                limit: "max_object_size",
            });
        }

        Ok(())
    }

    /// Returns `true` when one more part may be read after `parts_read`.
    pub fn allows_part(&self, parts_read: usize) -> bool {
        let allowed = self.max_parts.map_or(true, |max| parts_read < max);

        #[cfg(feature = "tracing")]
        if !allowed {
            tracing::debug!(
                parts_read = parts_read,
                max_parts = ?self.max_parts,
                "limits: part rejected by max_parts"
            );
        }

        allowed
    }
}
