//! Training metrics for monitoring GAN progress
//!
//! One entry is recorded per logged batch.

use std::path::Path;

/// Losses recorded at one logged batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoggedStep {
    pub epoch: usize,
    pub batch: usize,
    pub gen_loss: f64,
    pub disc_loss: f64,
}

/// Metrics collected during training
#[derive(Debug, Clone, Default)]
pub struct TrainingMetrics {
    steps: Vec<LoggedStep>,
}

impl TrainingMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the losses of a logged batch
    pub fn record(&mut self, epoch: usize, batch: usize, gen_loss: f64, disc_loss: f64) {
        self.steps.push(LoggedStep {
            epoch,
            batch,
            gen_loss,
            disc_loss,
        });
    }

    /// All recorded steps in order
    pub fn steps(&self) -> &[LoggedStep] {
        &self.steps
    }

    /// Get number of recorded steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Get latest generator loss
    pub fn latest_gen_loss(&self) -> Option<f64> {
        self.steps.last().map(|s| s.gen_loss)
    }

    /// Get latest discriminator loss
    pub fn latest_disc_loss(&self) -> Option<f64> {
        self.steps.last().map(|s| s.disc_loss)
    }

    /// Moving average of generator loss over the last `window` steps
    pub fn gen_loss_ma(&self, window: usize) -> f64 {
        moving_average(self.steps.iter().map(|s| s.gen_loss), self.len(), window)
    }

    /// Moving average of discriminator loss over the last `window` steps
    pub fn disc_loss_ma(&self, window: usize) -> f64 {
        moving_average(self.steps.iter().map(|s| s.disc_loss), self.len(), window)
    }

    /// Check if the discriminator has overpowered the generator
    ///
    /// Indicators:
    /// - Discriminator loss very low (can easily distinguish)
    /// - Generator loss very high (can't fool discriminator)
    pub fn check_mode_collapse(&self, window: usize) -> bool {
        if self.len() < window {
            return false;
        }

        self.disc_loss_ma(window) < 0.1 && self.gen_loss_ma(window) > 5.0
    }

    /// Save metrics to CSV file
    pub fn save_csv(&self, path: &Path) -> anyhow::Result<()> {
        let mut writer = csv::Writer::from_path(path)?;

        writer.write_record(["epoch", "batch", "gen_loss", "disc_loss"])?;

        for step in &self.steps {
            writer.write_record([
                step.epoch.to_string(),
                step.batch.to_string(),
                step.gen_loss.to_string(),
                step.disc_loss.to_string(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }
}

/// Average of the last `window` of `len` values
fn moving_average(values: impl DoubleEndedIterator<Item = f64>, len: usize, window: usize) -> f64 {
    let n = window.min(len);
    if n == 0 {
        return 0.0;
    }

    let sum: f64 = values.rev().take(n).sum();
    sum / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_metrics() {
        let mut metrics = TrainingMetrics::new();
        assert!(metrics.is_empty());

        metrics.record(0, 0, 1.5, 0.8);
        metrics.record(0, 25, 1.3, 0.75);

        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics.latest_gen_loss(), Some(1.3));
        assert_eq!(metrics.latest_disc_loss(), Some(0.75));
        assert_eq!(metrics.steps()[1].batch, 25);
    }

    #[test]
    fn test_moving_average() {
        let mut metrics = TrainingMetrics::new();
        for (i, loss) in [1.0, 2.0, 3.0, 4.0].into_iter().enumerate() {
            metrics.record(0, i * 25, loss, loss / 2.0);
        }

        assert_eq!(metrics.gen_loss_ma(2), 3.5);
        assert_eq!(metrics.disc_loss_ma(10), 1.25);
        assert_eq!(TrainingMetrics::new().gen_loss_ma(5), 0.0);
    }

    #[test]
    fn test_mode_collapse_detection() {
        let mut metrics = TrainingMetrics::new();
        for i in 0..9 {
            metrics.record(0, i, 8.0, 0.01);
        }
        assert!(!metrics.check_mode_collapse(10));

        metrics.record(0, 9, 8.0, 0.01);
        assert!(metrics.check_mode_collapse(10));

        let mut healthy = TrainingMetrics::new();
        for i in 0..10 {
            healthy.record(0, i, 0.9, 0.6);
        }
        assert!(!healthy.check_mode_collapse(10));
    }

    #[test]
    fn test_save_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.csv");

        let mut metrics = TrainingMetrics::new();
        metrics.record(1, 50, 0.7, 0.6);
        metrics.save_csv(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("epoch,batch,gen_loss,disc_loss"));
        assert_eq!(lines.next(), Some("1,50,0.7,0.6"));
    }
}
