#![allow(clippy::uninlined_format_args)]

mod config;
mod errors;
mod params;
mod services;

use std::io;
use blob_store::{KeeperHttpStore, LocalFileBlobStore, OAuthClient, ObjectStores};
use clap::Parser;
use object_uploader::testdata::TestSource;
use object_uploader::{DedupCache, ObjectUploader};
use tracing_subscriber::EnvFilter;
use crate::config::Configuration;
use crate::errors::CliErr;
use crate::params::{Args, Command};
use crate::services::upload_service;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), CliErr> {
    let mut conf = Configuration::load(&args.config)?;
    if let Some(api_url) = args.api_url {
        conf.eolymp.api_url = api_url;
    }
    if let Some(token) = args.token {
        conf.eolymp.token = token;
    }
    if let Some(cache) = args.cache {
        conf.upload.cache_path = cache;
    }
    conf.validate()?;

    let cache = DedupCache::load(&conf.upload.cache_path).await?;
    tracing::info!("loaded {} cached objects from {:?}", cache.len(), cache.path());

    let mut out = io::stdout().lock();
    if let Command::Hash { files } = &args.command {
        return upload_service::hash_files(&cache, files, &mut out).await;
    }

    let store = match args.local_store {
        Some(dir) => {
            tracing::info!("storing objects under {:?}", dir);
            ObjectStores::Local(LocalFileBlobStore::new(dir))
        }
        None => ObjectStores::Keeper(connect(&conf).await?),
    };
    let mut uploader = ObjectUploader::new(store, cache, conf.upload.upload_config());

    match args.command {
        Command::Upload { files } => upload_service::upload_files(&mut uploader, &files, &mut out).await,
        Command::Tests { dir, examples } => {
            let source = TestSource::directory(&dir, examples);
            upload_service::upload_source(&mut uploader, &source, &dir, &mut out).await?;
            Ok(())
        }
        Command::Examples { statement } => {
            let source = TestSource::tex_examples(&statement);
            upload_service::upload_source(&mut uploader, &source, &statement, &mut out).await?;
            Ok(())
        }
        Command::Hash { .. } => Ok(()),
    }
}

/// Builds the remote store, requesting a password-grant token when none is configured.
async fn connect(conf: &Configuration) -> Result<KeeperHttpStore, CliErr> {
    let eolymp = &conf.eolymp;
    let token = if !eolymp.token.is_empty() {
        Some(eolymp.token.clone())
    } else if !eolymp.username.is_empty() {
        let oauth = OAuthClient::new(&eolymp.api_url, conf.upload.timeout())?;
        let response = oauth.password_token(&eolymp.username, &eolymp.password).await?;
        tracing::info!("authenticated as {}", eolymp.username);
        Some(response.access_token)
    } else {
        tracing::warn!("no credentials configured, sending unauthenticated requests");
        None
    };
    Ok(KeeperHttpStore::new(&eolymp.api_url, token, conf.upload.timeout())?)
}
