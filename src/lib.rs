//! doublecheck - test doubles, matchers and a small sequential runner.
//!
//! The crate provides jest-style mock functions and spies, an assertion
//! engine that fails fast through `Result`, snapshot baselines, and a runner
//! that executes sync and async test bodies one at a time. The bundled
//! "zero to hero" suite exercises all of it against a static pizza menu.
//!
//! # Architecture
//!
//! - `data`: the four pizza records
//! - `mock`: `MockFn`, shared `Object`s, spies and promises
//! - `expect`: value, structural, mock, future and snapshot matchers
//! - `snapshot`: the on-disk snapshot baseline
//! - `runner`: suites, test contexts and the runner itself
//! - `suite`: the built-in test cases
//! - `config` / `cli` / `report`: the command-line front end
//!
//! # Example
//!
//! ```
//! use doublecheck::{expect, MockFn};
//!
//! let mock = MockFn::<&str, Option<&str>>::new();
//! mock.mock_return_value_once(Some("Hello"));
//!
//! assert_eq!(mock.call("first"), Some("Hello"));
//! assert_eq!(mock.call("second"), None);
//! assert!(expect(&mock).to_have_been_last_called_with("second").is_ok());
//! ```

pub mod cli;
pub mod config;
pub mod data;
pub mod expect;
pub mod mock;
pub mod report;
pub mod runner;
pub mod snapshot;
pub mod suite;

pub use data::{pizzas, Pizza};
pub use expect::{expect, expect_future, AssertionError, Expectation};
pub use mock::{spy_on, InvalidTargetError, MockFn, Object, Promise, Spy, Tracked};
pub use runner::{RunSummary, Runner, Suite, TestContext, TestError, TestStatus};
pub use snapshot::{SnapshotMode, SnapshotStore};
