// ABOUTME: Entry point for the trackctl CLI application.
// ABOUTME: Parses arguments and dispatches to the publishing operations.

mod cli;

use clap::Parser;
use cli::{Cli, Commands, SubscriptionCommand};
use std::env;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use trackctl::config::{self, Config};
use trackctl::error::Result;
use trackctl::gateway::{HttpGateway, MemoryGateway, PublisherGateway};
use trackctl::output::{Output, OutputMode};
use trackctl::publish::{
    CreateSubscriptionRequest, DeployRequest, DeploymentOperations, GetReleasesRequest,
    PromoteRequest, SetDataSafetyRequest, StoreOperations, UpdateDetailsRequest,
    UpdateListingRequest, UpdateSubscriptionRequest, UploadImageRequest,
};
use trackctl::types::ProductId;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mut output = Output::new(if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Normal
    });

    match run(cli, &mut output).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            output.error(&e.to_string());
            std::process::exit(1);
        }
    }
}

/// Returns whether the command succeeded.
async fn run(cli: Cli, output: &mut Output) -> Result<bool> {
    let cwd = env::current_dir()?;

    if let Commands::Init { credentials, force } = &cli.command {
        config::init_config(&cwd, credentials.as_deref(), *force)?;
        output.success(&format!("Created {}", config::CONFIG_FILENAME));
        return Ok(true);
    }

    let config = Config::discover_or_default(&cwd)?.with_env_overrides();
    output.start_timer();

    if cli.dry_run {
        output.progress("Dry run: changes go to an in-memory store");
        let gateway = Arc::new(MemoryGateway::new());
        dispatch(cli.command, gateway, &config, output).await
    } else {
        let credentials = config.load_credentials()?;
        let gateway = Arc::new(HttpGateway::new(&config.api, credentials)?);
        dispatch(cli.command, gateway, &config, output).await
    }
}

async fn dispatch<G: PublisherGateway>(
    command: Commands,
    gateway: Arc<G>,
    config: &Config,
    output: &Output,
) -> Result<bool> {
    let deployments =
        DeploymentOperations::new(Arc::clone(&gateway)).with_language(&config.default_language);
    let store = StoreOperations::new(gateway).with_language(&config.default_language);

    let succeeded = match command {
        Commands::Init { .. } => true,
        Commands::Deploy {
            package,
            track,
            artifact,
            version_code,
            notes,
            rollout,
        } => {
            output.progress(&format!("Deploying {} to {track}...", artifact.display()));
            let request = DeployRequest {
                package_name: package,
                track,
                artifact_path: artifact,
                version_code,
                release_notes: notes,
                rollout_fraction: rollout,
            };
            output.deployment(&deployments.deploy(&request).await?)
        }
        Commands::Promote {
            package,
            from,
            to,
            version_code,
        } => {
            let request = PromoteRequest {
                package_name: package,
                from_track: from,
                to_track: to,
                version_code,
            };
            output.deployment(&deployments.promote(&request).await?)
        }
        Commands::Releases { package, track } => {
            let request = GetReleasesRequest {
                package_name: package,
                track,
            };
            output.operation(&deployments.get_releases(&request).await?)
        }
        Commands::Listing {
            package,
            language,
            title,
            full_description,
            short_description,
            video,
        } => {
            let request = UpdateListingRequest {
                package_name: package,
                language,
                title,
                full_description,
                short_description,
                video,
            };
            output.operation(&store.update_listing(&request).await?)
        }
        Commands::Details {
            package,
            default_language,
            email,
            phone,
            website,
        } => {
            let request = UpdateDetailsRequest {
                package_name: package,
                default_language,
                contact_email: email,
                contact_phone: phone,
                contact_website: website,
            };
            output.operation(&store.update_details(&request).await?)
        }
        Commands::Image {
            package,
            language,
            image_type,
            path,
            replace,
        } => {
            let request = UploadImageRequest {
                package_name: package,
                language,
                image_type,
                image_path: path,
                replace,
            };
            output.operation(&store.upload_image(&request).await?)
        }
        Commands::DataSafety { package, csv } => {
            let request = SetDataSafetyRequest {
                package_name: package,
                csv_path: csv,
            };
            output.operation(&store.set_data_safety(&request).await?)
        }
        Commands::Subscription { action } => match action {
            SubscriptionCommand::Create {
                package,
                product_id,
                regions_version,
                payload,
                body,
            } => {
                let request = CreateSubscriptionRequest {
                    package_name: package,
                    product_id: ProductId::new(product_id),
                    regions_version,
                    payload: body,
                    payload_file: payload,
                };
                output.operation(&store.create_subscription(&request).await?)
            }
            SubscriptionCommand::Update {
                package,
                product_id,
                regions_version,
                update_mask,
                allow_missing,
                payload,
                body,
            } => {
                let request = UpdateSubscriptionRequest {
                    package_name: package,
                    product_id: ProductId::new(product_id),
                    regions_version,
                    update_mask,
                    allow_missing,
                    payload: body,
                    payload_file: payload,
                };
                output.operation(&store.update_subscription(&request).await?)
            }
        },
    };

    Ok(succeeded)
}
