//! Geofenced attendance check-in for the SIMASTER checkpoint API.
//!
//! # Example
//!
//! ```no_run
//! use checkin_client::{CheckinClient, GeoFence, GeoPoint};
//!
//! # async fn example() -> checkin_client::Result<()> {
//! let client = CheckinClient::builder()
//!     .base_url("https://api.simaster.ugm.ac.id/vnext/v1/checkpoint")
//!     .build()?;
//!
//! let fence = GeoFence::new(GeoPoint::new(-7.7707, 110.3777), 50.0);
//! let receipt = client
//!     .submit("student", "access-token", 123456, &fence)
//!     .await
//!     .into_result()?;
//! println!("Checked in at {}", receipt.point);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod geo;
pub mod types;

pub use client::{CheckinClient, ClientBuilder, DEFAULT_BASE_URL};
pub use error::{CheckinError, Result};
pub use geo::{GeoFence, GeoPoint};
pub use types::{CheckinOutcome, CheckinReceipt};
