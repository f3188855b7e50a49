#![doc = "dockpatch-core: core logic library for dockpatch."]

//! Derives patches between numbered versions of a file (`noxfile.py.01`,
//! `noxfile.py.02`, ...) kept inside a container build context, and the
//! Dockerfile statements that apply them during an image build.
//!
//! The CLI crate only parses arguments, loads configuration and decides where
//! output goes; everything else lives here.
//!
//! # Usage
//! Build a [`Deriver`] from a [`DeriveConfig`] and a [`DiffTool`] (normally
//! [`CommandDiff`]) and call [`Deriver::derive_all`].

pub mod build_file;
pub mod config;
pub mod derive;
pub mod diff;
pub mod error;
pub mod root;
pub mod version;

pub use build_file::BuildStatements;
pub use config::DeriveConfig;
pub use derive::{Deriver, Emit, PatchArtifact};
pub use diff::{CommandDiff, DiffText, DiffTool};
pub use error::{DeriveError, SubprocessError};
pub use root::{find_project_root, RootMatcher, RootPaths};
pub use version::VersionedFile;
