//! Fantia Downloader - CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use fantia_downloader::{
    api::FantiaApi,
    cli::Args,
    config::{parse_target, validate_config, Config},
    download::{download_followed, download_paid, download_target, DownloadContext, GlobalState},
    error::{exit_codes, Error, Result},
    output::{
        create_spinner, print_banner, print_config_summary, print_creator_stats, print_error,
        print_global_stats, print_info, print_success, print_summary, print_warning,
    },
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            let code = match e {
                Error::Interrupted => exit_codes::INTERRUPTED,
                Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::InvalidTarget(_)
                | Error::TomlParse(_) => exit_codes::CONFIG_ERROR,
                Error::Authentication(_) | Error::Api(_) => exit_codes::API_ERROR,
                Error::Fetch { .. } | Error::UnknownMediaType { .. } | Error::Http(_) => {
                    exit_codes::DOWNLOAD_ERROR
                }
                _ => exit_codes::UNEXPECTED_ERROR,
            };
            ExitCode::from(code as u8)
        }
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();
    let debug = args.debug;

    // Load configuration
    let config_path = args.config.clone();
    let config_found = config_path.exists();
    let mut config = if config_found {
        Config::load(&config_path)?
    } else {
        Config::default()
    };

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);
    let quiet = config.options.quiet;

    // Set up logging
    let log_level = if debug {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    if !quiet {
        print_banner();
        if !config_found {
            print_warning(&format!(
                "Configuration file not found: {}",
                config_path.display()
            ));
            print_info("Using default configuration with CLI arguments");
        }
    }

    // Validate configuration
    validate_config(&config)?;
    let targets = config
        .targets
        .urls
        .iter()
        .map(|url| parse_target(url))
        .collect::<Result<Vec<_>>>()?;

    if !quiet {
        let mut labels: Vec<String> = targets.iter().map(ToString::to_string).collect();
        if config.targets.followed {
            labels.push("followed fanclubs".to_string());
        }
        if config.targets.paid {
            labels.push("paid fanclubs".to_string());
        }
        print_config_summary(
            &labels,
            &config.download_directory().display().to_string(),
            &enabled_options(&config),
        );
    }

    // Initialize API client
    let spinner = (!quiet).then(|| create_spinner("Connecting to Fantia..."));
    let api = FantiaApi::new(
        &config.my_account.session_id,
        &config.my_account.user_agent,
        &config.options.base_url,
    )
    .await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let api = api?;

    // Cancel in-flight downloads on Ctrl+C
    let cancel = api.cancellation_token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping...");
            cancel.cancel();
        }
    });

    let ctx = DownloadContext::new(&api, &config)?;
    let mut global = GlobalState::default();
    let mut states = Vec::new();

    for target in &targets {
        if !quiet {
            print_info(&format!("Processing {}", target));
        }
        if let Some(state) = download_target(&ctx, &mut global, target).await? {
            states.push(state);
        }
    }

    if config.targets.followed {
        states.extend(download_followed(&ctx, &mut global).await?);
    }

    if config.targets.paid {
        states.extend(download_paid(&ctx, &mut global).await?);
    }

    if !quiet {
        for state in &states {
            print_creator_stats(state);
        }
        print_global_stats(&global);
        print_summary(
            global.posts_downloaded,
            global.files_downloaded,
            global.files_skipped,
        );
        if global.targets_failed == 0 && global.posts_failed == 0 {
            print_success("All downloads complete");
        }
    }

    if global.targets_failed > 0 {
        print_warning(&format!("{} target(s) failed", global.targets_failed));
    }

    Ok(())
}

/// Names of the enabled boolean options, for the configuration summary.
fn enabled_options(config: &Config) -> Vec<&'static str> {
    let options = &config.options;
    [
        (options.dump_metadata, "dump metadata"),
        (options.parse_for_external_links, "external links"),
        (options.download_thumb, "thumbnails"),
        (options.continue_on_error, "continue on error"),
        (options.use_server_filenames, "server filenames"),
        (options.mark_incomplete_posts, "mark incomplete"),
    ]
    .into_iter()
    .filter_map(|(enabled, name)| enabled.then_some(name))
    .collect()
}
