//! Azure DevOps client for the search engine.
//!
//! # Module Structure
//!
//! - [`error`] - Error type for Azure DevOps API operations
//! - [`types`] - REST response shapes and their conversion to platform records
//! - [`client`] - The HTTP client implementing [`crate::platform::HostingApi`]
//!
//! # Example
//!
//! ```ignore
//! use commitscan::devops::{DevOpsClient, DEVOPS_HOST};
//! use commitscan::search::{SearchOptions, SearchRequest, run_search};
//!
//! let client = DevOpsClient::new(DEVOPS_HOST)?;
//! let outcome = run_search(&client, &request, &SearchOptions::default(), None).await?;
//! println!("{} repositories", outcome.snapshot.len());
//! ```

mod client;
mod error;
mod types;

pub use client::{API_VERSION, DEVOPS_HOST, DevOpsClient};
pub use error::DevOpsError;
pub use types::{DevOpsChangeCounts, DevOpsCommit, DevOpsGitUser, DevOpsRepository};
