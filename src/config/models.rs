use crate::humanize::HumanDuration;
use crate::worker::{DEFAULT_STOP_ATTEMPTS, WorkerConfig};
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub triangle: TriangleConfig,
    #[serde(default)]
    pub shutdown: ShutdownConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Canvas dimensions
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
}

/// Label geometry, position relative to the display canvas
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct LabelConfig {
    #[serde(default = "default_label_width")]
    pub width: f64,
    #[serde(default = "default_label_height")]
    pub height: f64,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            width: default_label_width(),
            height: default_label_height(),
            x: 0.0,
            y: 0.0,
        }
    }
}

fn default_label_width() -> f64 {
    50.0
}

fn default_label_height() -> f64 {
    20.0
}

/// Drifting label worker
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    #[serde(default = "default_display_interval")]
    pub step_interval: HumanDuration,
    #[serde(default = "default_display_speed")]
    pub step_speed: f64,
    #[serde(default = "default_display_canvas")]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub label: LabelConfig,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            step_interval: default_display_interval(),
            step_speed: default_display_speed(),
            canvas: default_display_canvas(),
            label: LabelConfig::default(),
        }
    }
}

impl DisplayConfig {
    pub fn worker(&self) -> WorkerConfig {
        WorkerConfig {
            step_interval: self.step_interval.as_duration(),
            step_speed: self.step_speed,
        }
    }
}

fn default_display_interval() -> HumanDuration {
    HumanDuration::from_millis(1)
}

fn default_display_speed() -> f64 {
    0.2
}

fn default_display_canvas() -> CanvasConfig {
    CanvasConfig {
        width: 400.0,
        height: 300.0,
    }
}

/// Rotating polygon worker
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TriangleConfig {
    #[serde(default = "default_triangle_interval")]
    pub step_interval: HumanDuration,
    #[serde(default = "default_triangle_speed")]
    pub step_speed: f64,
    #[serde(default = "default_sides")]
    pub sides: usize,
    #[serde(default)]
    pub initial_angle: f64,
    #[serde(default = "default_triangle_canvas")]
    pub canvas: CanvasConfig,
}

impl Default for TriangleConfig {
    fn default() -> Self {
        Self {
            step_interval: default_triangle_interval(),
            step_speed: default_triangle_speed(),
            sides: default_sides(),
            initial_angle: 0.0,
            canvas: default_triangle_canvas(),
        }
    }
}

impl TriangleConfig {
    pub fn worker(&self) -> WorkerConfig {
        WorkerConfig {
            step_interval: self.step_interval.as_duration(),
            step_speed: self.step_speed,
        }
    }
}

fn default_triangle_interval() -> HumanDuration {
    HumanDuration::from_millis(2)
}

fn default_triangle_speed() -> f64 {
    0.15
}

fn default_sides() -> usize {
    3
}

fn default_triangle_canvas() -> CanvasConfig {
    CanvasConfig {
        width: 300.0,
        height: 300.0,
    }
}

/// Stop and shutdown budgets
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShutdownConfig {
    /// Polls of a bounded stop, one step interval apart
    #[serde(default = "default_stop_attempts")]
    pub stop_attempts: u32,
    /// How long a force-terminate waits before aborting
    #[serde(default = "default_force_deadline")]
    pub force_deadline: HumanDuration,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            stop_attempts: default_stop_attempts(),
            force_deadline: default_force_deadline(),
        }
    }
}

fn default_stop_attempts() -> u32 {
    DEFAULT_STOP_ATTEMPTS
}

fn default_force_deadline() -> HumanDuration {
    HumanDuration::from_millis(50)
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// How often `run` logs a scene snapshot
    #[serde(default = "default_report_interval")]
    pub report_interval: HumanDuration,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            report_interval: default_report_interval(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_report_interval() -> HumanDuration {
    HumanDuration::from_millis(1000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.display.step_interval.as_duration(), Duration::from_millis(1));
        assert_eq!(config.display.step_speed, 0.2);
        assert_eq!(config.triangle.step_interval.as_duration(), Duration::from_millis(2));
        assert_eq!(config.triangle.step_speed, 0.15);
        assert_eq!(config.triangle.sides, 3);
        assert_eq!(config.shutdown.stop_attempts, 5);
        assert_eq!(config.telemetry.log_filter, "info");
    }

    #[test]
    fn test_worker_config() {
        let config = Config::default();
        let worker = config.triangle.worker();

        assert_eq!(worker.step_interval, Duration::from_millis(2));
        assert_eq!(worker.step_speed, 0.15);
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(
            r#"
[display]
step_speed = 0.5

[display.label]
x = 12.0
            "#,
        )
        .unwrap();

        assert_eq!(config.display.step_speed, 0.5);
        assert_eq!(config.display.label.x, 12.0);
        assert_eq!(config.display.label.width, 50.0);
        assert_eq!(config.display.canvas.width, 400.0);
    }
}
