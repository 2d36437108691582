//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter    | Implements   | Connects to                      |
//! |------------|--------------|----------------------------------|
//! | `csv_log`  | SampleSink   | Append-only CSV file             |
//! | `log_sink` | SampleSink   | `log` facade (no file configured)|
//! | `time`     | Clock        | System wall clock (chrono)       |
//! | `rpi`      | -            | Pi I2C bus, interrupt GPIO       |

pub mod csv_log;
pub mod log_sink;
#[cfg(feature = "rpi")]
pub mod rpi;
pub mod time;
