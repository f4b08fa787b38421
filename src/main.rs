// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use farm_uploader::cli::{Args, CliError, Settings};
use farm_uploader::farm::{FarmError, SnapshotFarm};
use farm_uploader::output::{Config, Product};
use farm_uploader::upload::{self, UploadError};

#[derive(Debug, Error)]
enum Error {
    #[error(transparent)]
    Cli(#[from] CliError),

    #[error("cannot load device farm snapshot: {0}")]
    Farm(#[from] FarmError),

    #[error("cannot open output: {0}")]
    Output(#[from] std::io::Error),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

async fn run(settings: Settings) -> Result<u8, Error> {
    info!(
        server = %settings.server.server,
        product = %settings.server.product,
        authenticated = settings.server.token.is_some(),
        "uploading results"
    );

    let mut config = Config::builder();
    if let Some(path) = &settings.output {
        config = config.with_file_output(path).await?;
    }
    if let Some(dir) = &settings.files_dir {
        config = config.files_dir(dir);
    }

    let product = Product::builder(&settings.server.product)
        .config(config.build())
        .build();
    let farm = SnapshotFarm::load(&settings.snapshot).await?;

    let outcome = upload::upload(&farm, &product, &settings.upload).await?;
    Ok(outcome.exit_code)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farm_uploader=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match Args::parse().validate() {
        Ok(settings) => run(settings).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
