//! Sensor types for the LIS2HH12
//!
//! The LIS2HH12 carries a single 3-axis accelerometer; this module holds its
//! rate/range enumerations, configuration record and sample types.
//!
//! All sensor operations are performed through methods on `Lis2hh12`.

pub mod accelerometer;

// Re-export main types
pub use accelerometer::{AccelConfig, AccelData, AccelDataMg, Axes, FullScale, OutputDataRate};
