//! Loss function and label construction for GAN training
//!
//! Both networks end in a sigmoid, so the criterion is plain Binary Cross
//! Entropy on probabilities.

use tch::{Device, Kind, Tensor};

/// Binary Cross Entropy between predicted probabilities and targets
///
/// # Arguments
///
/// * `probs` - Discriminator output of shape (batch_size, 1)
/// * `targets` - Labels of the same shape
///
/// # Returns
///
/// Scalar loss tensor (mean reduction)
pub fn bce_loss(probs: &Tensor, targets: &Tensor) -> Tensor {
    probs.binary_cross_entropy::<Tensor>(targets, None, tch::Reduction::Mean)
}

/// Column of `n` identical labels, shape (n, 1)
pub fn constant_labels(n: i64, value: f64, device: Device) -> Tensor {
    Tensor::full([n, 1], value, (Kind::Float, device))
}

/// Labels for a combined real + fake batch
///
/// The first `n_real` rows carry `real_label`, the remaining `n_fake` rows
/// carry `fake_label`, matching a batch built as `cat([real, fake])`.
pub fn combined_labels(n_real: i64, n_fake: i64, real_label: f64, fake_label: f64, device: Device) -> Tensor {
    Tensor::cat(
        &[
            constant_labels(n_real, real_label, device),
            constant_labels(n_fake, fake_label, device),
        ],
        0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_labels() {
        let labels = combined_labels(100, 100, 1.0, 0.0, Device::Cpu);
        assert_eq!(labels.size(), vec![200, 1]);

        let values: Vec<f32> = labels.flatten(0, -1).try_into().unwrap();
        assert!(values[..100].iter().all(|&v| v == 1.0));
        assert!(values[100..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_combined_labels_uneven() {
        let labels = combined_labels(3, 5, 1.0, 0.0, Device::Cpu);
        assert_eq!(labels.size(), vec![8, 1]);
        assert_eq!(labels.sum(Kind::Float).double_value(&[]), 3.0);
    }

    #[test]
    fn test_bce_loss_positive() {
        let probs = Tensor::from_slice(&[0.3f32, 0.6, 0.9, 0.1]).view([4, 1]);
        let targets = combined_labels(2, 2, 1.0, 0.0, Device::Cpu);
        let loss = bce_loss(&probs, &targets);

        assert_eq!(loss.size(), Vec::<i64>::new());
        assert!(loss.double_value(&[]) > 0.0);
    }

    #[test]
    fn test_perfect_discriminator() {
        // Confident and correct on both halves
        let probs = Tensor::from_slice(&[0.9999f32, 0.9999, 0.0001, 0.0001]).view([4, 1]);
        let targets = combined_labels(2, 2, 1.0, 0.0, Device::Cpu);
        let loss = bce_loss(&probs, &targets);

        assert!(loss.double_value(&[]) < 0.01);
    }
}
