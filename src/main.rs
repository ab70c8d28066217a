use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use imgshare::models::{AuthMode, Config};
use imgshare::workflow::UploadWorkflow;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "imgshare")]
#[command(about = "Upload images and share short links")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload an image and print its (shortened) URL.
    Upload {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Run the simulated compression step first.
        #[arg(long)]
        compress: bool,
        /// Keep the long view URL.
        #[arg(long)]
        no_shorten: bool,
        /// Copy the result URL to the clipboard.
        #[arg(long)]
        copy: bool,
    },
    /// Simulate compression, report sizes, and upload the image.
    Compress {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Save the compressed preview into this directory.
        #[arg(long, value_name = "DIR")]
        download: Option<PathBuf>,
        /// Skip the upload after compressing.
        #[arg(long)]
        no_upload: bool,
    },
    /// Log in with an existing account.
    Login(Credentials),
    /// Create an account and log in.
    Signup(Credentials),
}

#[derive(Debug, Args)]
struct Credentials {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
}

async fn run(command: Command, workflow: &mut UploadWorkflow) -> imgshare::Result<()> {
    match command {
        Command::Upload {
            file,
            compress,
            no_shorten,
            copy,
        } => {
            workflow.select_path(&file).await?;
            if compress {
                workflow.simulate_compress().await?;
            }
            workflow.settings_mut().auto_shorten = !no_shorten;
            workflow.upload().await?;
            info!("{}", workflow.status());

            if let Some(url) = workflow.result_url() {
                println!("{}", workflow.display_url());
                println!("{}", url);
            }
            if copy {
                match workflow.copy_result_url().await {
                    Ok(()) => {
                        if let Some(message) = workflow.confirmation_message() {
                            println!("{}", message);
                        }
                    }
                    Err(e) => warn!("Clipboard unavailable: {}", e),
                }
            }
        }
        Command::Compress {
            file,
            download,
            no_upload,
        } => {
            workflow.select_path(&file).await?;
            workflow.simulate_compress().await?;
            if let Some((old, new)) = workflow.size_summary() {
                println!("Old Image Size: {}", old);
                println!("New Image Size: {}", new);
            }
            if let Some(dir) = download {
                let path = workflow.download_compressed(&dir).await?;
                println!("Saved {}", path.display());
            }
            if !no_upload {
                workflow.settings_mut().auto_shorten = false;
                workflow.upload().await?;
                println!("{}", workflow.status());
            }
        }
        Command::Login(credentials) => {
            workflow
                .authenticate(AuthMode::Login, &credentials.email, &credentials.password)
                .await?;
            println!("Logged in as {}", credentials.email);
        }
        Command::Signup(credentials) => {
            workflow
                .authenticate(AuthMode::Signup, &credentials.email, &credentials.password)
                .await?;
            println!("Signed up and logged in as {}", credentials.email);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imgshare=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    match UploadWorkflow::from_config(&config).await {
        Ok(mut workflow) => match run(args.command, &mut workflow).await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    }
}
