//! # loocv
//! ## Leave-one-out cross-validation without the n refits
//!
//! Scoring a candidate regression model by cross-validation sounds
//! expensive: hold out each observation, refit, predict, repeat n times.
//! For models that are **linear in their parameters** (polynomial and
//! orthogonal-basis expansions fitted by weighted least squares) all n
//! refits have a closed form, and the whole estimate falls out of a single
//! fit.
//!
//! This crate computes that analytic leave-one-out risk, rescaled by a
//! small-sample correction so the estimate stays conservative when the
//! number of active basis functions is not small relative to the sample.
//! It is built for model-selection loops that score many candidate subsets
//! of one function dictionary and need each score to be cheap.
//!
//! ```rust
//! use loocv::{basis::MonomialBasis, CorrectedLeaveOneOut, FittingStrategy};
//!
//! let x = [0.0, 1.0, 2.0, 3.0, 4.0];
//! let y = [1.0, 3.0, 5.0, 7.0, 9.0]; // exactly y = 2x + 1
//!
//! // Score the candidate model {1, x} out of the dictionary {1, x, x², x³}
//! let basis = MonomialBasis::new(4);
//! let risk = CorrectedLeaveOneOut
//!     .run(&x, &y, None, &basis, &[0, 1])
//!     .unwrap();
//!
//! // The line is exact, so the estimated generalization risk is ~0
//! assert!(risk < 1e-18);
//! ```
//!
//! # Core Concepts
//! - A [`basis::Basis`] is an ordered dictionary of candidate functions
//!   φ₀, φ₁, …; a **candidate model** is a subset of its indices.
//! - A [`DesignEvaluator`] turns (dictionary, sample points, active
//!   indices) into design matrices, caching evaluated columns so
//!   overlapping candidates share work. Share one evaluator across a whole
//!   selection loop, including across threads.
//! - A [`WeightedLeastSquares`] fit solves the regression and exposes the
//!   per-observation **leverages** (diagonal of the hat matrix) the
//!   leave-one-out formula needs.
//! - A [`FittingStrategy`] maps a fit to a single scalar **risk score**.
//!   Lower is better, and scores are comparable only across candidates
//!   scored on the same sample. [`CorrectedLeaveOneOut`] is the recommended default;
//!   [`LeaveOneOut`] is its uncorrected sibling.
//!
//! Selecting *which* subsets to try is deliberately left to the caller:
//! this crate prices candidates, it does not enumerate them.
//!
//! # Implementation Details
//!
//! This crate makes use of the `nalgebra` library for linear algebra. Fits
//! are solved through the SVD of the (weight-scaled) design matrix, and
//! leverages are read off the same decomposition, so the hat matrix is
//! never formed. Degenerate candidates (under-determined, collinear, or
//! with a leverage at 1) are rejected with typed errors rather than
//! clamped, since a silently clamped score would corrupt model comparison.
//!
//! # Testing utilities
//!
//! The [`test`] module provides float-comparison assertion macros used
//! throughout this crate's own tests and available to yours.
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]


pub mod basis;
pub mod design;
pub mod error;
pub mod least_squares;
pub mod strategy;
pub mod value;

pub use design::DesignEvaluator;
pub use error::{Error, Result};
pub use least_squares::WeightedLeastSquares;
pub use strategy::{correction_factor, CorrectedLeaveOneOut, FittingStrategy, LeaveOneOut};

pub use nalgebra;
