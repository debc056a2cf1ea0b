use crate::error::SolverError;

/// Tuning knobs for a solving cycle. All fields have defaults matching the
/// stock bot behavior; callers normally use `SolverConfig::default()`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SolverConfig {
    /// Run the deterministic inference engine before any guessing.
    pub enable_logic_rules: bool,
    /// Fall back to probability estimation when logic alone is stuck.
    pub enable_probability_calculation: bool,
    /// Ceiling on valid configurations enumerated per constraint component.
    /// A component that exceeds it is excluded from enumeration and its
    /// cells get a uniform fallback probability instead.
    pub max_configurations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            enable_logic_rules: true,
            enable_probability_calculation: true,
            max_configurations: 10_000,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<(), SolverError> {
        if self.max_configurations == 0 {
            return Err(SolverError::InvalidConfig(
                "max_configurations must be positive".into(),
            ));
        }
        Ok(())
    }
}
