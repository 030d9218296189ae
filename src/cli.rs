// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use trackctl::gateway::ImageType;
use trackctl::types::PackageName;

#[derive(Parser)]
#[command(name = "trackctl")]
#[command(about = "Release management for app-store tracks: uploads, staged rollouts, promotion, and listings")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against an in-memory store instead of the remote API
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new trackctl.yml configuration file
    Init {
        /// Path to the credentials JSON file
        #[arg(long)]
        credentials: Option<String>,

        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Upload an artifact and release it to a track
    Deploy {
        #[arg(short, long)]
        package: PackageName,

        #[arg(short, long)]
        track: String,

        /// App bundle (.aab) or package file
        #[arg(short, long)]
        artifact: PathBuf,

        #[arg(long)]
        version_code: i64,

        /// Release notes in the default language
        #[arg(long)]
        notes: Option<String>,

        /// Share of users receiving the release (1.0 completes it)
        #[arg(long, default_value_t = 1.0)]
        rollout: f64,
    },

    /// Copy a release from one track to another at full rollout
    Promote {
        #[arg(short, long)]
        package: PackageName,

        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        #[arg(long)]
        version_code: i64,
    },

    /// List releases on every track
    Releases {
        #[arg(short, long)]
        package: PackageName,

        /// Only show this track
        #[arg(short, long)]
        track: Option<String>,
    },

    /// Update store listing text for one language
    Listing {
        #[arg(short, long)]
        package: PackageName,

        #[arg(short, long)]
        language: Option<String>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        full_description: Option<String>,

        #[arg(long)]
        short_description: Option<String>,

        /// Promotional video URL
        #[arg(long)]
        video: Option<String>,
    },

    /// Update app contact details
    Details {
        #[arg(short, long)]
        package: PackageName,

        #[arg(long)]
        default_language: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        website: Option<String>,
    },

    /// Upload a listing image
    Image {
        #[arg(short, long)]
        package: PackageName,

        #[arg(short, long)]
        language: Option<String>,

        /// Image kind, e.g. icon, featureGraphic, phoneScreenshots
        #[arg(long = "type")]
        image_type: ImageType,

        path: PathBuf,

        /// Delete existing images of this type first
        #[arg(long)]
        replace: bool,
    },

    /// Replace the data safety declaration from a CSV file
    DataSafety {
        #[arg(short, long)]
        package: PackageName,

        csv: PathBuf,
    },

    /// Manage subscription products
    Subscription {
        #[command(subcommand)]
        action: SubscriptionCommand,
    },
}

#[derive(Subcommand)]
pub enum SubscriptionCommand {
    /// Create a subscription from a JSON file or inline JSON
    Create {
        #[arg(short, long)]
        package: PackageName,

        #[arg(long)]
        product_id: String,

        #[arg(long)]
        regions_version: Option<String>,

        /// JSON file with the subscription body
        #[arg(required_unless_present = "body")]
        payload: Option<PathBuf>,

        /// Subscription body as JSON text
        #[arg(long, value_name = "JSON", value_parser = parse_json, conflicts_with = "payload")]
        body: Option<serde_json::Value>,
    },

    /// Patch a subscription from a JSON file or inline JSON
    Update {
        #[arg(short, long)]
        package: PackageName,

        #[arg(long)]
        product_id: String,

        #[arg(long)]
        regions_version: Option<String>,

        /// Comma-separated fields to update
        #[arg(long)]
        update_mask: Option<String>,

        /// Create the subscription if it does not exist
        #[arg(long)]
        allow_missing: bool,

        /// JSON file with the subscription body
        #[arg(required_unless_present = "body")]
        payload: Option<PathBuf>,

        /// Subscription body as JSON text
        #[arg(long, value_name = "JSON", value_parser = parse_json, conflicts_with = "payload")]
        body: Option<serde_json::Value>,
    },
}

fn parse_json(text: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(text).map_err(|e| format!("invalid JSON: {e}"))
}
