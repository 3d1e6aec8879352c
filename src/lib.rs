//! Acquisition and linkage orchestration for the Nova physics library.
//!
//! Given the host (OS, architecture), this crate answers one question for
//! the extension-module build: "do we have a linkable `libnova` binary,
//! and if not, how do we get one?" It either resolves an artifact from the
//! prebuilt distribution tree or drives the external Nova build tool and
//! verifies what it left on disk.
//!
//! # Architecture
//!
//! ```text
//! policy (acquisition state machine)
//!     │
//!     ├── platform  - host (OS, arch) -> canonical key
//!     ├── tree      - prebuilt distribution tree lookups
//!     ├── builder   - external build tool invocation (scoped cwd, PIC)
//!     └── output    - post-build artifact verification
//!
//! update (operator-triggered distribution refresh)
//!     │
//!     ├── builder, tree (same data model as the hot path)
//!     ├── archive   - header extraction from tar.gz
//!     └── manifest  - informational refresh record
//! ```
//!
//! Everything is synchronous and single-shot: acquisition runs once per
//! extension build, under the outer build system's own mutual exclusion.
//! Failures are terminal and diagnostic, never retried; see
//! [`error::AcquireError`] for the taxonomy.
//!
//! # Example
//!
//! ```rust,ignore
//! use nova_acquire::policy::{acquire, AcquireConfig};
//!
//! let config = AcquireConfig::from_env(std::path::Path::new("."));
//! let acquired = acquire(&config)?;
//! println!("link against {}", acquired.path.display());
//! ```

pub mod archive;
pub mod builder;
pub mod error;
pub mod manifest;
pub mod output;
pub mod platform;
pub mod policy;
pub mod preflight;
pub mod tree;
pub mod update;

pub use builder::BuilderConfig;
pub use error::AcquireError;
pub use platform::PlatformKey;
pub use policy::{acquire, AcquireConfig, AcquireMode, Acquired, ArtifactOrigin};
pub use tree::BinaryTree;
