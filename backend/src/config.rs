use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
}

/// Dynamic pricing configuration.
///
/// Immutable once handed to the pricing engine. Multipliers compound in the
/// order peak hour, zone occupancy, spot demand.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingConfig {
    /// First hour (inclusive) of the peak window
    pub peak_start_hour: u32,
    /// Last hour (exclusive) of the peak window
    pub peak_end_hour: u32,
    pub peak_hour_multiplier: Decimal,
    /// Zone occupancy strictly above this is "high"
    pub high_occupancy_threshold: f64,
    pub high_occupancy_multiplier: Decimal,
    /// Zone occupancy strictly below this is "low"
    pub low_occupancy_threshold: f64,
    pub low_occupancy_discount: Decimal,
    /// Reservation count strictly above this triggers the demand multiplier
    pub demand_threshold: i64,
    pub demand_multiplier: Decimal,
    pub demand_window_hours: i64,
    pub trend_sample_limit: i64,
}

/// Availability prediction configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionConfig {
    /// EWMA smoothing factor, 0 < alpha < 1
    pub alpha: f64,
    pub history_window_minutes: i64,
    pub history_limit: i64,
    pub default_occupied_minutes: f64,
    pub no_history_prob_free: f64,
    pub no_history_prob_occupied: f64,
    pub long_horizon_boost: f64,
    pub long_horizon_cap: f64,
    pub short_horizon_damping: f64,
    pub short_horizon_floor: f64,
    pub free_spot_floor: f64,
    /// Fewer data points than this is low confidence
    pub low_confidence_points: usize,
    /// Fewer data points than this (and at least `low_confidence_points`) is medium
    pub medium_confidence_points: usize,
    pub strong_signal_low: f64,
    pub strong_signal_high: f64,
    /// Number of spots sampled when ranking the best available ones
    pub spot_sample_limit: i64,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub pricing: PricingConfig,
    pub prediction: PredictionConfig,
    pub log_level: String,
    pub http_port: u16,
    pub environment: String,
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| format!("Invalid value for {}: {}", key, raw)),
        Err(_) => Ok(default),
    }
}

impl DatabaseConfig {
    /// Create database config from `DATABASE_*` environment variables.
    /// Only `DATABASE_URL` is required.
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let config = Self {
            url: env::var("DATABASE_URL")
                .map_err(|_| "DATABASE_URL environment variable is required")?,
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", defaults.max_connections)?,
            acquire_timeout_secs: env_or(
                "DATABASE_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout_secs,
            )?,
            idle_timeout_secs: env_or("DATABASE_IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs)?,
            max_lifetime_secs: env_or("DATABASE_MAX_LIFETIME_SECS", defaults.max_lifetime_secs)?,
            test_before_acquire: env_or(
                "DATABASE_TEST_BEFORE_ACQUIRE",
                defaults.test_before_acquire,
            )?,
        };

        if config.max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }

        if config.acquire_timeout_secs == 0 {
            return Err("DATABASE_ACQUIRE_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(config)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/smartpark".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            test_before_acquire: true,
        }
    }
}

impl PricingConfig {
    /// Create pricing config from `PRICING_*` environment variables,
    /// falling back to the defaults for anything unset.
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let config = Self {
            peak_start_hour: env_or("PRICING_PEAK_START_HOUR", defaults.peak_start_hour)?,
            peak_end_hour: env_or("PRICING_PEAK_END_HOUR", defaults.peak_end_hour)?,
            peak_hour_multiplier: env_or(
                "PRICING_PEAK_HOUR_MULTIPLIER",
                defaults.peak_hour_multiplier,
            )?,
            high_occupancy_threshold: env_or(
                "PRICING_HIGH_OCCUPANCY_THRESHOLD",
                defaults.high_occupancy_threshold,
            )?,
            high_occupancy_multiplier: env_or(
                "PRICING_HIGH_OCCUPANCY_MULTIPLIER",
                defaults.high_occupancy_multiplier,
            )?,
            low_occupancy_threshold: env_or(
                "PRICING_LOW_OCCUPANCY_THRESHOLD",
                defaults.low_occupancy_threshold,
            )?,
            low_occupancy_discount: env_or(
                "PRICING_LOW_OCCUPANCY_DISCOUNT",
                defaults.low_occupancy_discount,
            )?,
            demand_threshold: env_or("PRICING_DEMAND_THRESHOLD", defaults.demand_threshold)?,
            demand_multiplier: env_or("PRICING_DEMAND_MULTIPLIER", defaults.demand_multiplier)?,
            demand_window_hours: env_or(
                "PRICING_DEMAND_WINDOW_HOURS",
                defaults.demand_window_hours,
            )?,
            trend_sample_limit: env_or("PRICING_TREND_SAMPLE_LIMIT", defaults.trend_sample_limit)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.peak_start_hour >= self.peak_end_hour || self.peak_end_hour > 24 {
            return Err(format!(
                "Invalid peak window [{}, {}): hours must satisfy start < end <= 24",
                self.peak_start_hour, self.peak_end_hour
            ));
        }

        let multipliers = [
            ("peak_hour_multiplier", self.peak_hour_multiplier),
            ("high_occupancy_multiplier", self.high_occupancy_multiplier),
            ("low_occupancy_discount", self.low_occupancy_discount),
            ("demand_multiplier", self.demand_multiplier),
        ];
        for (name, value) in multipliers {
            if value <= Decimal::ZERO {
                return Err(format!("{} must be positive, got {}", name, value));
            }
        }

        if !(0.0..=1.0).contains(&self.low_occupancy_threshold)
            || !(0.0..=1.0).contains(&self.high_occupancy_threshold)
            || self.low_occupancy_threshold > self.high_occupancy_threshold
        {
            return Err(format!(
                "Occupancy thresholds must satisfy 0 <= low ({}) <= high ({}) <= 1",
                self.low_occupancy_threshold, self.high_occupancy_threshold
            ));
        }

        if self.demand_window_hours <= 0 || self.trend_sample_limit <= 0 {
            return Err("Demand window and trend sample limit must be positive".to_string());
        }

        Ok(())
    }

    /// Whether the given hour of day falls in the peak window
    pub fn is_peak_hour(&self, hour: u32) -> bool {
        hour >= self.peak_start_hour && hour < self.peak_end_hour
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            peak_start_hour: 8,
            peak_end_hour: 18,
            peak_hour_multiplier: Decimal::new(15, 1),
            high_occupancy_threshold: 0.8,
            high_occupancy_multiplier: Decimal::new(18, 1),
            low_occupancy_threshold: 0.3,
            low_occupancy_discount: Decimal::new(8, 1),
            demand_threshold: 3,
            demand_multiplier: Decimal::new(12, 1),
            demand_window_hours: 24,
            trend_sample_limit: 50,
        }
    }
}

impl PredictionConfig {
    /// Create prediction config from `PREDICTION_*` environment variables
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let config = Self {
            alpha: env_or("PREDICTION_ALPHA", defaults.alpha)?,
            history_window_minutes: env_or(
                "PREDICTION_HISTORY_WINDOW_MINUTES",
                defaults.history_window_minutes,
            )?,
            history_limit: env_or("PREDICTION_HISTORY_LIMIT", defaults.history_limit)?,
            default_occupied_minutes: env_or(
                "PREDICTION_DEFAULT_OCCUPIED_MINUTES",
                defaults.default_occupied_minutes,
            )?,
            spot_sample_limit: env_or("PREDICTION_SPOT_SAMPLE_LIMIT", defaults.spot_sample_limit)?,
            ..defaults
        };

        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(format!("PREDICTION_ALPHA must be in (0, 1), got {}", self.alpha));
        }

        if self.history_window_minutes <= 0 || self.history_limit <= 0 || self.spot_sample_limit <= 0
        {
            return Err("Prediction window and limits must be positive".to_string());
        }

        if self.default_occupied_minutes <= 0.0 {
            return Err("PREDICTION_DEFAULT_OCCUPIED_MINUTES must be positive".to_string());
        }

        if self.low_confidence_points > self.medium_confidence_points {
            return Err("Confidence thresholds are inverted".to_string());
        }

        Ok(())
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            history_window_minutes: 60,
            history_limit: 50,
            default_occupied_minutes: 60.0,
            no_history_prob_free: 0.7,
            no_history_prob_occupied: 0.3,
            long_horizon_boost: 1.5,
            long_horizon_cap: 0.95,
            short_horizon_damping: 0.5,
            short_horizon_floor: 0.1,
            free_spot_floor: 0.6,
            low_confidence_points: 5,
            medium_confidence_points: 15,
            strong_signal_low: 0.2,
            strong_signal_high: 0.8,
            spot_sample_limit: 50,
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let database = DatabaseConfig::from_env()?;
        let pricing = PricingConfig::from_env()?;
        let prediction = PredictionConfig::from_env()?;

        let log_level = env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string());

        let http_port = env_or("HTTP_PORT", 3001u16)?;

        let environment = env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string());

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&environment.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                environment, valid_environments
            ));
        }

        Ok(Self {
            database,
            pricing,
            prediction,
            log_level: log_level.to_lowercase(),
            http_port,
            environment: environment.to_lowercase(),
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            pricing: PricingConfig::default(),
            prediction: PredictionConfig::default(),
            log_level: "info".to_string(),
            http_port: 3001,
            environment: "development".to_string(),
        }
    }
}
