//! Tunable configuration for the packing engine.
//!
//! `PackingConfig` carries every numeric knob the core consults (candidate
//! grid step, containment epsilon, compliance tolerance, transverse-balance
//! tolerance, decimal precision) behind a fluent builder with documented
//! defaults. `EngineConfig::from_env()` is the only part of this crate that
//! touches the environment; the engine itself never does, so packing stays
//! deterministic and free of hidden global state.

use crate::numerics::HighPrecision;
use std::env::VarError;

/// Packing-time tunables consulted by the palletizer, the position search,
/// and the axle compliance scorer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PackingConfig {
    grid_step: HighPrecision,
    epsilon: HighPrecision,
    tolerance_percent: HighPrecision,
    transverse_balance_epsilon: HighPrecision,
    decimal_precision: u32,
}

impl PackingConfig {
    pub const DEFAULT_GRID_STEP: f64 = 0.1;
    pub const DEFAULT_EPSILON: f64 = 1e-9;
    pub const DEFAULT_TOLERANCE_PERCENT: f64 = 0.0;
    pub const DEFAULT_TRANSVERSE_BALANCE_EPSILON: f64 = 0.01;
    pub const DEFAULT_DECIMAL_PRECISION: u32 = 20;

    pub fn builder() -> PackingConfigBuilder {
        PackingConfigBuilder {
            config: PackingConfig::default(),
        }
    }

    pub fn grid_step(&self) -> HighPrecision {
        self.grid_step
    }

    pub fn epsilon(&self) -> HighPrecision {
        self.epsilon
    }

    pub fn tolerance_percent(&self) -> HighPrecision {
        self.tolerance_percent
    }

    pub fn transverse_balance_epsilon(&self) -> HighPrecision {
        self.transverse_balance_epsilon
    }

    pub fn decimal_precision(&self) -> u32 {
        self.decimal_precision
    }
}

impl Default for PackingConfig {
    fn default() -> Self {
        PackingConfig {
            grid_step: HighPrecision::from_f64(Self::DEFAULT_GRID_STEP),
            epsilon: HighPrecision::from_f64(Self::DEFAULT_EPSILON),
            tolerance_percent: HighPrecision::from_f64(Self::DEFAULT_TOLERANCE_PERCENT),
            transverse_balance_epsilon: HighPrecision::from_f64(
                Self::DEFAULT_TRANSVERSE_BALANCE_EPSILON,
            ),
            decimal_precision: Self::DEFAULT_DECIMAL_PRECISION,
        }
    }
}

/// Fluent builder for [`PackingConfig`].
pub struct PackingConfigBuilder {
    config: PackingConfig,
}

impl PackingConfigBuilder {
    pub fn grid_step(mut self, value: f64) -> Self {
        self.config.grid_step = HighPrecision::from_f64(value);
        self
    }

    pub fn epsilon(mut self, value: f64) -> Self {
        self.config.epsilon = HighPrecision::from_f64(value);
        self
    }

    pub fn tolerance_percent(mut self, value: f64) -> Self {
        self.config.tolerance_percent = HighPrecision::from_f64(value);
        self
    }

    pub fn transverse_balance_epsilon(mut self, value: f64) -> Self {
        self.config.transverse_balance_epsilon = HighPrecision::from_f64(value);
        self
    }

    pub fn decimal_precision(mut self, value: u32) -> Self {
        self.config.decimal_precision = value;
        self
    }

    pub fn build(self) -> PackingConfig {
        self.config
    }
}

/// Process-level configuration, read once at startup by callers that want
/// container/environment overrides without rebuilding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    pub packing: PackingConfig,
}

impl EngineConfig {
    const ENV_GRID_STEP: &'static str = "CARGO_PACK_GRID_STEP";
    const ENV_EPSILON: &'static str = "CARGO_PACK_EPSILON";
    const ENV_TOLERANCE_PERCENT: &'static str = "CARGO_PACK_TOLERANCE_PERCENT";
    const ENV_DECIMAL_PRECISION: &'static str = "CARGO_PACK_DECIMAL_PRECISION";

    /// Reads optional environment overrides, warning and falling back to the
    /// default on any value that fails to parse or fails validation.
    pub fn from_env() -> Self {
        let grid_step = load_f64_with_warning(
            Self::ENV_GRID_STEP,
            PackingConfig::DEFAULT_GRID_STEP,
            |v| v > 0.0,
            "must be a positive number of meters",
        );
        let epsilon = load_f64_with_warning(
            Self::ENV_EPSILON,
            PackingConfig::DEFAULT_EPSILON,
            |v| v > 0.0,
            "must be a positive number",
        );
        let tolerance_percent = load_f64_with_warning(
            Self::ENV_TOLERANCE_PERCENT,
            PackingConfig::DEFAULT_TOLERANCE_PERCENT,
            |v| v >= 0.0,
            "must be zero or a positive percentage",
        );
        let decimal_precision = load_u32_with_warning(
            Self::ENV_DECIMAL_PRECISION,
            PackingConfig::DEFAULT_DECIMAL_PRECISION,
            |v| v >= 20,
            "must be at least 20 significant digits",
        );

        EngineConfig {
            packing: PackingConfig::builder()
                .grid_step(grid_step)
                .epsilon(epsilon)
                .tolerance_percent(tolerance_percent)
                .decimal_precision(decimal_precision)
                .build(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            packing: PackingConfig::default(),
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Err(VarError::NotPresent) => None,
        Err(VarError::NotUnicode(_)) => {
            eprintln!("warning: environment variable '{name}' is not valid unicode, ignoring");
            None
        }
    }
}

fn load_f64_with_warning(
    var_name: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
) -> f64 {
    let Some(raw) = env_string(var_name) else {
        return default;
    };
    match raw.parse::<f64>() {
        Ok(value) if validator(value) => value,
        Ok(value) => {
            eprintln!(
                "warning: environment variable '{var_name}' = '{value}' is invalid ({invalid_hint}), using default {default}"
            );
            default
        }
        Err(_) => {
            eprintln!(
                "warning: environment variable '{var_name}' = '{raw}' is not a number, using default {default}"
            );
            default
        }
    }
}

fn load_u32_with_warning(
    var_name: &str,
    default: u32,
    validator: impl Fn(u32) -> bool,
    invalid_hint: &str,
) -> u32 {
    let Some(raw) = env_string(var_name) else {
        return default;
    };
    match raw.parse::<u32>() {
        Ok(value) if validator(value) => value,
        Ok(value) => {
            eprintln!(
                "warning: environment variable '{var_name}' = '{value}' is invalid ({invalid_hint}), using default {default}"
            );
            default
        }
        Err(_) => {
            eprintln!(
                "warning: environment variable '{var_name}' = '{raw}' is not an integer, using default {default}"
            );
            default
        }
    }
}
