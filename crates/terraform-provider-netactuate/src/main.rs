use anyhow::Context;
use clap::Parser;
use terraform_provider_netactuate::PROVIDER_VERSION;
use terraform_provider_netactuate::framework::FrameworkProvider;
use terraform_provider_netactuate::mux::{MuxMember, MuxProvider};
use terraform_provider_netactuate::provider::PROVIDER_TYPE_NAME;
use terraform_provider_netactuate::sdk::SdkProvider;

#[derive(Parser)]
#[command(name = "terraform-provider-netactuate")]
#[command(about = "Terraform provider for NetActuate", long_about = None)]
#[command(version)]
struct Cli {
    /// Serve outside Terraform so a debugger can attach
    #[arg(long)]
    debug: bool,
}

const MAGIC_COOKIE_KEY: &str = "TF_PLUGIN_MAGIC_COOKIE";
const MAGIC_COOKIE_VALUE: &str =
    "d602bf8f470bc67ca7faa0386276bbdd4330efaf76d1a219cb4d6991ca9872b2";

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Debug mode runs outside Terraform, so it supplies the cookie itself
    if cli.debug && std::env::var_os(MAGIC_COOKIE_KEY).is_none() {
        // SAFETY: the runtime is not built yet, so no other thread reads the environment
        unsafe { std::env::set_var(MAGIC_COOKIE_KEY, MAGIC_COOKIE_VALUE) };
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let default_level = if cli.debug { "debug" } else { "info" };

    // stdout carries the plugin handshake, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("TF_LOG_PROVIDER")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_ansi(false)
        .init();

    let members: Vec<Box<dyn MuxMember>> = vec![
        Box::new(SdkProvider::new(PROVIDER_VERSION)),
        Box::new(FrameworkProvider::new(PROVIDER_VERSION)),
    ];
    let mux = MuxProvider::new(members).context("failed to create provider mux")?;

    if cli.debug {
        tracing::info!(
            version = PROVIDER_VERSION,
            provider = "registry.terraform.io/netactuate/netactuate",
            "Running in debug mode. Set TF_REATTACH_PROVIDERS from the handshake \
             line on stdout to attach Terraform to this process."
        );
    }

    if let Err(e) = tf_provider::serve(PROVIDER_TYPE_NAME, mux).await {
        tracing::error!(error = %e, "Provider exited with error");
        std::process::exit(1);
    }
    Ok(())
}
