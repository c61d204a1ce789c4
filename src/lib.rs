//! scenario-bucket: find tagged aim-trainer scenario files and publish them to a storage bucket.
//!
//! The pipeline is linear: [`scanner`] walks the configured roots and asks the
//! [`matcher`] about every scenario file, [`archive`] optionally bundles the
//! matches, and [`publish`] pushes them through an [`contract::Uploader`]
//! (the Supabase Storage client lives in [`upload`]). [`synchronise`] ties the
//! steps together and [`cli`] is the user-facing entrypoint.

pub mod archive;
pub mod cli;
pub mod config;
pub mod contract;
pub mod load_config;
pub mod matcher;
pub mod publish;
pub mod report;
pub mod scanner;
pub mod synchronise;
pub mod upload;
