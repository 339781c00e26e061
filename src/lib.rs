//!# QNAP File Station API Client
//!
//! A Rust client library for the QNAP NAS File Station API. Browse, transfer and
//! organise files on the NAS through a strongly-typed interface.
//!
//! ## Features
//!
//! - Authentication with the QNAP login CGI
//! - List shared folders and folder contents
//! - Search files and folders, get file information
//! - Upload and download files
//! - Create directories (including intermediate ones)
//! - Copy, move, rename and delete files and folders
//! - Human-readable file sizes
//!
//! ## Usage example
//!
//! ```rust,no_run
//! use anyhow::Result;
//! use qnap_file_station::client::QnapBuilder;
//! use qnap_file_station::filestation::FileStation;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<()> {
//!     let qnap = QnapBuilder::from_env()?.build()?;
//!     qnap.authorize().await?;
//!
//!     let station = FileStation::new(qnap);
//!     for share in station.list_share().await? {
//!         println!("share: {}", share.id);
//!     }
//!
//!     let listing = station.list("/Public").await?;
//!     for entry in listing.datas {
//!         println!("{} ({})", entry.filename, entry.human_size());
//!     }
//!
//!     station.mkdir_rec("/Public/backups/2024").await?;
//!     station.upload("/Public/backups/2024/notes.txt", b"hello", true).await?;
//!
//!     station.session().logout().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod endpoint;
pub mod entities;
pub mod filestation;
pub mod utils;
