use anyhow::{Context, Result, anyhow, bail};
use appwrite::{Client, Id, InputFile, Permission, Role, UploadEvent, models};
use autumnus::{FormatterOption, Options, highlight, themes};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use clap_complete::{ArgValueCompleter, CompletionCandidate};
use futures::StreamExt;
use iocraft::prelude::*;
use serde::Serialize;
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tokio::{runtime::Handle, sync::watch};
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::ui::{
    BucketList, ConfigHeader, ErrorMessage, FileList, InputPrompt, ProgressBar, SuccessMessage,
};

mod config;
mod ui;

#[derive(Parser)]
#[command(name = "aw")]
#[command(version)]
#[command(about = "A tool for interacting with an Appwrite server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum HealthCheck {
    Http,
    Antivirus,
    Cache,
    Db,
    Storage,
    Time,
    QueueCertificates,
    QueueFunctions,
    QueueLogs,
    QueueUsage,
    QueueWebhooks,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure aw interactively
    Config,
    /// Store your API key in the OS keyring
    SetApiKey { api_key: String },
    /// Check the health of the server or one of its services
    Health {
        #[arg(value_enum, default_value_t = HealthCheck::Http)]
        check: HealthCheck,
    },
    /// List storage buckets
    Buckets {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// List files in a bucket
    Files {
        #[arg(add = ArgValueCompleter::new(bucket_completer))]
        bucket: String,
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Upload a file, resuming a partial upload when --id names one
    Upload {
        #[arg(short, long, add = ArgValueCompleter::new(bucket_completer))]
        bucket: String,
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// File ID (generated when omitted)
        #[arg(long)]
        id: Option<String>,
        /// Make the file readable by anyone
        #[arg(long)]
        public: bool,
    },
    /// Download a file
    Download {
        #[arg(short, long, add = ArgValueCompleter::new(bucket_completer))]
        bucket: String,
        id: String,
        /// Output path (defaults to the stored file name)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
    /// Render text as a QR code image
    Qr {
        text: String,
        #[arg(short, long)]
        size: Option<u32>,
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let _rt_guard = rt.enter();
    clap_complete::CompleteEnv::with_factory(Cli::command).complete();
    let cli = Cli::parse();

    rt.block_on(async {
        match cli.command {
            Commands::Config => interactive_config(),
            Commands::SetApiKey { api_key } => config::set_api_key_keyring(api_key),
            requires_api_key => {
                let config = config::read_config()?;
                let client = config.client()?;

                match requires_api_key {
                    Commands::Health { check } => print_health(&client, check).await,
                    Commands::Buckets { search } => list_buckets(&client, search).await,
                    Commands::Files { bucket, search } => list_files(&client, &bucket, search).await,
                    Commands::Upload {
                        bucket,
                        file,
                        id,
                        public,
                    } => upload_file(&client, &bucket, file, id, public).await,
                    Commands::Download { bucket, id, output } => {
                        download_file(&client, &bucket, &id, output).await
                    }
                    Commands::Qr { text, size, output } => {
                        write_qr(&client, &text, size, &output).await
                    }
                    Commands::Config => unreachable!("handled before reading config"),
                    Commands::SetApiKey { .. } => unreachable!("handled before reading config"),
                }
            }
        }
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let output = highlight(
        &serde_json::to_string_pretty(value)?,
        Options {
            formatter: FormatterOption::Terminal {
                theme: Some(themes::get("ayu_light").expect("Syntax highlighting theme not found")),
            },
            lang_or_file: Some("json"),
        },
    );
    println!("{}", output);
    Ok(())
}

async fn print_health(client: &Client, check: HealthCheck) -> Result<()> {
    let health = client.health();
    let report = match check {
        HealthCheck::Http => serde_json::to_value(health.get().await?)?,
        HealthCheck::Antivirus => serde_json::to_value(health.get_antivirus().await?)?,
        HealthCheck::Cache => serde_json::to_value(health.get_cache().await?)?,
        HealthCheck::Db => serde_json::to_value(health.get_db().await?)?,
        HealthCheck::Storage => serde_json::to_value(health.get_storage_local().await?)?,
        HealthCheck::Time => serde_json::to_value(health.get_time().await?)?,
        HealthCheck::QueueCertificates => {
            serde_json::to_value(health.get_queue_certificates().await?)?
        }
        HealthCheck::QueueFunctions => serde_json::to_value(health.get_queue_functions().await?)?,
        HealthCheck::QueueLogs => serde_json::to_value(health.get_queue_logs().await?)?,
        HealthCheck::QueueUsage => serde_json::to_value(health.get_queue_usage().await?)?,
        HealthCheck::QueueWebhooks => serde_json::to_value(health.get_queue_webhooks().await?)?,
    };
    print_json(&report)
}

async fn list_buckets(client: &Client, search: Option<String>) -> Result<()> {
    let buckets = client
        .storage()
        .list_buckets(None, search.as_deref())
        .await?
        .buckets;
    element!(BucketList(buckets: buckets)).print();
    Ok(())
}

async fn list_files(client: &Client, bucket: &str, search: Option<String>) -> Result<()> {
    let files = client
        .storage()
        .list_files(bucket, None, search.as_deref())
        .await?
        .files;
    element!(FileList(files: files)).print();
    Ok(())
}

async fn upload_file(
    client: &Client,
    bucket: &str,
    path: PathBuf,
    id: Option<String>,
    public: bool,
) -> Result<()> {
    let file = InputFile::from_path(&path)
        .await
        .with_context(|| format!("Unable to read {}", path.display()))?;
    let file_id = id.unwrap_or_else(Id::unique);
    let permissions = public.then(|| vec![Permission::read(Role::any())]);

    let upload = client
        .storage()
        .create_file(bucket, &file_id, file, permissions);
    let mut stream = upload.stream();

    let (tx, rx) = watch::channel(0.0);

    let process_stream = async {
        while let Some(event) = stream.next().await {
            match event {
                Ok(UploadEvent::Progress(p)) => {
                    let percent = (p.size_uploaded as f32 / p.size_total as f32) * 100.0;
                    let _ = tx.send(percent);
                }
                Ok(UploadEvent::Complete(body)) => return Ok(body),
                Err(e) => {
                    if let Some(progress) = e.upload_progress().filter(|p| !p.id.is_empty()) {
                        bail!(
                            "{e}\nResume with: aw upload --bucket {bucket} --id {} {}",
                            progress.id,
                            path.display()
                        );
                    }
                    return Err(e.into());
                }
            }
        }
        Err(anyhow!("Upload ended without a final response"))
    };

    let mut progress_bar =
        element!(ProgressBar(title: format!("Uploading {}", path.display()), progress: Some(rx)));

    let body = tokio::select! {
        result = process_stream => result?,
        _ = progress_bar.render_loop() => {
            unreachable!("render_loop should not terminate")
        }
    };

    let uploaded: models::File = serde_json::from_value(body)?;
    element!(SuccessMessage(message: format!(
        "File uploaded successfully with ID: {}",
        uploaded.id
    )))
    .print();

    Ok(())
}

async fn download_file(
    client: &Client,
    bucket: &str,
    id: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let storage = client.storage();
    let output = match output {
        Some(output) => output,
        None => PathBuf::from(storage.get_file(bucket, id).await?.name),
    };

    let data = storage.get_file_download(bucket, id).await?;
    fs::write(&output, &data).with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Downloaded {} bytes to {}", data.len(), output.display());
    Ok(())
}

async fn write_qr(client: &Client, text: &str, size: Option<u32>, output: &Path) -> Result<()> {
    let image = client.avatars().get_qr(text, size, None, None).await?;
    fs::write(output, &image).with_context(|| format!("Failed to write {}", output.display()))?;
    println!("QR code written to {}", output.display());
    Ok(())
}

fn bucket_completer(current: &std::ffi::OsStr) -> Vec<CompletionCandidate> {
    let mut completions = vec![];
    let Some(current) = current.to_str() else {
        return completions;
    };

    let Ok(client) = config::read_config().and_then(|config| config.client()) else {
        return completions;
    };

    let handle = Handle::current();
    let Ok(buckets) = handle.block_on(client.storage().list_buckets(None, None)) else {
        return completions;
    };

    buckets.buckets.into_iter().for_each(|bucket| {
        if bucket.id.starts_with(current) {
            completions.push(CompletionCandidate::new(bucket.id));
        }
    });

    completions
}

fn read_input(prompt: &str, default: Option<&str>, description: Option<&str>) -> Result<String> {
    element! {
        InputPrompt(
            prompt: prompt.to_string(),
            default: default.map(|s| s.to_string()),
            description: description.map(|s| s.to_string())
        )
    }
    .print();

    print!("> ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim().to_string();

    if input.is_empty() {
        Ok(default.map(str::to_string).unwrap_or(input))
    } else {
        Ok(input)
    }
}

fn interactive_config() -> Result<()> {
    element!(ConfigHeader()).print();

    let existing = config::read_file_config().unwrap_or_default();
    let default_endpoint = existing
        .endpoint
        .as_ref()
        .map(Url::to_string)
        .unwrap_or_else(|| appwrite::DEFAULT_ENDPOINT.to_string());

    let endpoint = loop {
        let endpoint_str = read_input(
            "Appwrite Endpoint",
            Some(&default_endpoint),
            Some("The API endpoint of your Appwrite server, including /v1"),
        )?;

        match Url::parse(&endpoint_str) {
            Ok(url) => break url,
            Err(e) => {
                element!(ErrorMessage(message: format!("Invalid URL: {}", e))).print();
                println!();
            }
        }
    };

    let project = loop {
        let project = read_input("Project ID", existing.project.as_deref(), None)?;
        if project.is_empty() {
            element!(ErrorMessage(message: "Project ID cannot be empty".to_string())).print();
            println!();
        } else {
            break project;
        }
    };

    let api_key = loop {
        let api_key = read_input(
            "API Key",
            None,
            Some("A server API key (stored securely in OS keyring)"),
        )?;

        if api_key.is_empty() {
            element!(ErrorMessage(message: "API key cannot be empty".to_string())).print();
            println!();
        } else {
            break api_key;
        }
    };

    config::set_api_key_keyring(api_key)?;

    config::write_config(config::ConfigFile {
        endpoint: Some(endpoint),
        project: Some(project),
        ..existing
    })?;

    element!(SuccessMessage(message: "Configuration complete!".to_string())).print();

    Ok(())
}
