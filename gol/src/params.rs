// params.rs - Run parameters and engine tuning

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Run parameters, supplied once at startup and never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    pub image_width  : usize,
    pub image_height : usize,
    pub turns        : usize,
    pub threads      : usize,
}

impl Params {
    pub fn validate(&self) -> Result<()> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err(Error::config(format!(
                "grid must be at least 1x1, got {}x{}",
                self.image_width, self.image_height
            )));
        }
        if self.image_width.checked_mul(self.image_height).is_none() {
            return Err(Error::config(format!(
                "{}x{} grid is too large to allocate",
                self.image_width, self.image_height
            )));
        }
        if self.threads == 0 {
            return Err(Error::config("threads must be at least 1"));
        }
        Ok(())
    }

    /// Name of the initial image, e.g. `16x16`.
    pub fn input_name(&self) -> String {
        format!("{}x{}", self.image_width, self.image_height)
    }

    /// Name of the final image, e.g. `16x16x100`.
    pub fn output_name(&self) -> String {
        format!("{}x{}x{}", self.image_width, self.image_height, self.turns)
    }
}

/// Engine knobs that are not part of the run parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Period between alive-cell reports
    pub report_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { report_interval: Duration::from_secs(2) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(w: usize, h: usize, turns: usize, threads: usize) -> Params {
        Params { image_width: w, image_height: h, turns, threads }
    }

    #[test]
    fn names_follow_dimensions() {
        let p = params(64, 32, 100, 4);
        assert_eq!(p.input_name(), "64x32");
        assert_eq!(p.output_name(), "64x32x100");
    }

    #[test]
    fn zero_turns_is_valid() {
        assert!(params(16, 16, 0, 1).validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_params() {
        assert!(matches!(params(0, 16, 1, 1).validate(), Err(Error::Config(_))));
        assert!(matches!(params(16, 16, 1, 0).validate(), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_overflowing_dimensions() {
        assert!(matches!(params(usize::MAX, 2, 1, 1).validate(), Err(Error::Config(_))));
        assert!(matches!(params(1 << 40, 1 << 40, 1, 1).validate(), Err(Error::Config(_))));
    }

    #[test]
    fn more_threads_than_rows_is_allowed() {
        assert!(params(4, 2, 1, 8).validate().is_ok());
    }
}
