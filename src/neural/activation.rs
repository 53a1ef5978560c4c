//! Elementwise activation functions used by [`super::ConnectedLayer`].

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Linear,
    Relu,
    Tanh,
    Sigmoid,
}

impl Activation {
    pub fn apply(&self, z: f64) -> f64 {
        match self {
            Activation::Linear => z,
            Activation::Relu => z.max(0.0),
            Activation::Tanh => z.tanh(),
            Activation::Sigmoid => 1.0 / (1.0 + (-z).exp()),
        }
    }

    /// Derivative expressed in terms of the activation's own output `a`
    /// (cheaper than re-deriving from `z` for tanh/sigmoid).
    pub fn derivative_from_output(&self, a: f64) -> f64 {
        match self {
            Activation::Linear => 1.0,
            Activation::Relu => {
                if a > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::Tanh => 1.0 - a * a,
            Activation::Sigmoid => a * (1.0 - a),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_bounded() {
        for z in [-10.0, -1.0, 0.0, 1.0, 10.0] {
            let a = Activation::Sigmoid.apply(z);
            assert!((0.0..=1.0).contains(&a));
        }
    }

    #[test]
    fn relu_zero_below_zero() {
        assert_eq!(Activation::Relu.apply(-3.0), 0.0);
        assert_eq!(Activation::Relu.apply(3.0), 3.0);
    }
}
