//! LIN master on top of the serial link
//!
//! Only master-side behavior is implemented: bus wakeup, header
//! transmission, master-frame data with checksum, and bounded collection of
//! a slave response.

mod master;

pub use master::LinMaster;
