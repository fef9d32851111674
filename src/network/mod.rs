//! Networks built from [Genome](crate::genome::Genome)s in order to express their behaviour.

pub mod feedforward;

pub use feedforward::FeedForward;

pub mod activate {
    use core::f64::consts::E;

    /// The logistic function
    pub fn sigmoid(x: f64) -> f64 {
        1. / (1. + E.powf(-x))
    }
}

pub mod loss {
    /// 1 at `want`, falling off with the square of the miss. Bounded to [0, 1] for
    /// values within [0, 1]
    pub fn decay_quadratic(want: f64, x: f64) -> f64 {
        1. - (want - x).abs().powf(2.)
    }
}

/// The trait for all networks. Right now, only f64 values are used.
pub trait Network {
    /// Propagate `input` through the network, returning its output.
    /// Input must be exactly as long as the network's input layer
    fn activate(&mut self, input: &[f64]) -> &[f64];

    /// The network's most recent output
    fn output(&self) -> &[f64];
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::assert_f64_approx;

    #[test]
    fn test_sigmoid() {
        assert_f64_approx!(activate::sigmoid(0.), 0.5);
        assert!(activate::sigmoid(40.) > 0.999_999);
        assert!(activate::sigmoid(-40.) < 1e-6);
        assert_f64_approx!(activate::sigmoid(1.) + activate::sigmoid(-1.), 1.);
    }

    #[test]
    fn test_decay_quadratic() {
        assert_f64_approx!(loss::decay_quadratic(1., 1.), 1.);
        assert_f64_approx!(loss::decay_quadratic(1., 0.5), 0.75);
        assert_f64_approx!(loss::decay_quadratic(0., 1.), 0.);
    }
}
