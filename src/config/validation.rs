use super::models::{CanvasConfig, Config, LabelConfig};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{worker} step_speed must be finite and non-negative, got {value}")]
    InvalidSpeed { worker: &'static str, value: f64 },

    #[error("Polygon must have 3 sides or more, got {sides}")]
    TooFewSides { sides: usize },

    #[error("triangle initial_angle must be finite, got {value}")]
    InvalidAngle { value: f64 },

    #[error("{canvas} canvas must have positive size, got {width}x{height}")]
    InvalidCanvas {
        canvas: &'static str,
        width: f64,
        height: f64,
    },

    #[error("Label must have positive size, got {width}x{height}")]
    InvalidLabelSize { width: f64, height: f64 },

    #[error("Label at ({x}, {y}) does not fit inside the display canvas")]
    LabelOutsideCanvas { x: f64, y: f64 },

    #[error("shutdown.stop_attempts must be at least 1")]
    InvalidStopAttempts,

    #[error("telemetry.report_interval must be greater than zero")]
    InvalidReportInterval,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_speeds(config)?;
    validate_triangle(config)?;
    validate_canvas("display", &config.display.canvas)?;
    validate_canvas("triangle", &config.triangle.canvas)?;
    validate_label(&config.display.label, &config.display.canvas)?;
    validate_shutdown(config)?;
    validate_telemetry(config)?;
    Ok(())
}

fn validate_speeds(config: &Config) -> Result<(), ValidationError> {
    for (worker, value) in [
        ("display", config.display.step_speed),
        ("triangle", config.triangle.step_speed),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::InvalidSpeed { worker, value });
        }
    }

    Ok(())
}

/// Catch polygon errors here rather than inside the worker loop
fn validate_triangle(config: &Config) -> Result<(), ValidationError> {
    if config.triangle.sides < 3 {
        return Err(ValidationError::TooFewSides {
            sides: config.triangle.sides,
        });
    }

    if !config.triangle.initial_angle.is_finite() {
        return Err(ValidationError::InvalidAngle {
            value: config.triangle.initial_angle,
        });
    }

    Ok(())
}

fn validate_canvas(canvas: &'static str, size: &CanvasConfig) -> Result<(), ValidationError> {
    // Written to reject NaN as well
    if !(size.width > 0.0 && size.height > 0.0) || !size.width.is_finite() || !size.height.is_finite() {
        return Err(ValidationError::InvalidCanvas {
            canvas,
            width: size.width,
            height: size.height,
        });
    }

    Ok(())
}

fn validate_label(label: &LabelConfig, canvas: &CanvasConfig) -> Result<(), ValidationError> {
    if !(label.width > 0.0 && label.height > 0.0) {
        return Err(ValidationError::InvalidLabelSize {
            width: label.width,
            height: label.height,
        });
    }

    let fits = label.x >= 0.0
        && label.y >= 0.0
        && label.x + label.width <= canvas.width
        && label.y + label.height <= canvas.height;

    if !fits {
        return Err(ValidationError::LabelOutsideCanvas {
            x: label.x,
            y: label.y,
        });
    }

    Ok(())
}

fn validate_shutdown(config: &Config) -> Result<(), ValidationError> {
    if config.shutdown.stop_attempts == 0 {
        return Err(ValidationError::InvalidStopAttempts);
    }

    Ok(())
}

fn validate_telemetry(config: &Config) -> Result<(), ValidationError> {
    if config.telemetry.report_interval.as_duration().is_zero() {
        return Err(ValidationError::InvalidReportInterval);
    }

    Ok(())
}
