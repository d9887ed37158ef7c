//! Behaviour shared by the generator and the discriminator

use tch::{nn, nn::ModuleT, Tensor};

/// A network that can be run without gradients and trained on a batch
///
/// Implementors only provide `forward_t`; inference and the single-batch
/// update come for free.
pub trait TrainableModel: ModuleT {
    /// Run the model without accumulating gradients
    fn predict(&self, xs: &Tensor, train: bool) -> Tensor {
        tch::no_grad(|| self.forward_t(xs, train)).detach()
    }

    /// Train the model on one batch
    ///
    /// Clears the optimizer's gradients, runs a training-mode forward pass,
    /// backpropagates `criterion(output, ys)` and steps the optimizer.
    ///
    /// # Returns
    ///
    /// Scalar loss tensor
    fn train_on<F>(&self, xs: &Tensor, ys: &Tensor, criterion: F, optimizer: &mut nn::Optimizer) -> Tensor
    where
        F: Fn(&Tensor, &Tensor) -> Tensor,
    {
        optimizer.zero_grad();
        let output = self.forward_t(xs, true);
        let loss = criterion(&output, ys);
        loss.backward();
        optimizer.step();
        loss
    }
}
