//! deo - defaults plus environment, frozen
//!
//! Builds an immutable configuration from a nested tree of default values
//! and a flat set of environment overrides. A leaf at `bar.boo.boo` is
//! overridden by the environment key `BAR_BOO_BOO` when that key holds a
//! truthy value; the result is read back by dotted path.
//!
//! ```
//! use serde_json::json;
//!
//! let config = deo::create_config_with(
//!     &json!({"foo": "default", "bar": {"boo": {"boo": 3}}}),
//!     json!({"BAR_BOO_BOO": 4}),
//! )?;
//!
//! assert_eq!(config.get("foo")?, "default");
//! assert_eq!(config.get("bar.boo.boo")?, 4);
//! # Ok::<(), deo::ConfigError>(())
//! ```

pub mod config;
pub mod env;
pub mod error;
pub mod merge;

pub use config::{create_config, create_config_with, Config, ConfigBuilder};
pub use env::{EnvSource, ProcessEnv};
pub use error::{ConfigError, Result};
pub use merge::{merge, ConfigOrigin, Resolved};
