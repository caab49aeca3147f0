pub mod trip;

pub use trip::{ChargeStation, DestinationSummary, LegSummary, TripSummary};
