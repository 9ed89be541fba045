//! `strata-examine`: the fixpoint examination driver.
//!
//! ```text
//! strata-core (Artifact, Excavation, Examiner)
//!        ↑
//! strata-examine (ExaminationDriver)
//! ```
//!
//! `strata-examine` depends on `strata-core` and nothing else: it only
//! needs to pop artifacts off a queue, hand them to registered
//! examiners, and re-enqueue whatever those examiners derive.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod driver;
pub mod error;
pub mod examiners;

pub use driver::ExaminationDriver;
pub use error::DriverError;
pub use examiners::{RecordSplitExaminer, SameSameExaminer};
