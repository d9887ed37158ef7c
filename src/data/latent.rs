//! Latent space sampling

use tch::{Device, Kind, Tensor};

/// Create a minibatch of latent points
///
/// Every component is drawn independently from the uniform distribution
/// over [0, 1).
///
/// # Returns
///
/// Tensor of shape (n_samples, latent_dim)
pub fn generate_latent_points(n_samples: i64, latent_dim: i64, device: Device) -> Tensor {
    Tensor::rand([n_samples, latent_dim], (Kind::Float, device))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latent_points_shape() {
        let z = generate_latent_points(8, 100, Device::Cpu);
        assert_eq!(z.size(), vec![8, 100]);
    }

    #[test]
    fn test_latent_points_range() {
        let z = generate_latent_points(64, 100, Device::Cpu);

        let min_val = z.min().double_value(&[]);
        let max_val = z.max().double_value(&[]);
        assert!(min_val >= 0.0);
        assert!(max_val < 1.0);
    }
}
