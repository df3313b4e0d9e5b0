//! Vehicle dynamics and cost terms for iterative LQ game solvers.
//!
//! Concrete [`SinglePlayerDynamics`](ilq_core::SinglePlayerDynamics)
//! implementations — [`Unicycle4D`], [`Bicycle4D`], [`Car5D`] — and the two
//! workhorse cost terms, [`QuadraticCost`] and [`SignedDistanceCost`].
//! Stack the vehicles into a joint game with
//! [`ConcatenatedSystem`](ilq_core::ConcatenatedSystem).
//!
//! All vehicles live in the plane. Heading is measured counterclockwise
//! from the x axis; speeds are signed.

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,  // Many methods can't be const due to nalgebra
)]

mod bicycle;
mod car;
mod proximity;
mod quadratic;
mod unicycle;

pub use bicycle::Bicycle4D;
pub use car::Car5D;
pub use proximity::SignedDistanceCost;
pub use quadratic::QuadraticCost;
pub use unicycle::Unicycle4D;
