use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use krapper_api::AppState;
use krapper_kubehub::{KubeLister, ResourceLister};
use krapper_schema::Wrap;
use krapper_store::WrapStore;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "krapper", version, about = "Serve UI schemas for Kubernetes resources")]
struct Cli {
    /// Log filter (e.g. `info`, `krapper_store=debug`)
    #[arg(long = "log-level", env = "KRAPPER_LOG", global = true, default_value = "info")]
    log_level: String,

    #[arg(long = "log-mode", env = "KRAPPER_LOG_MODE", value_enum, global = true, default_value_t = LogMode::Text)]
    log_mode: LogMode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LogMode { Text, Json }

#[derive(Subcommand, Debug)]
enum Commands {
    /// Watch a wraps folder and serve the HTTP API
    Serve(ServeArgs),
    /// Load and groom wrap files, optionally dumping the result
    Groom {
        /// Dump in JSON
        #[arg(short = 'j', long = "json", action = ArgAction::SetTrue)]
        json: bool,
        /// Dump in YAML
        #[arg(short = 'y', long = "yaml", action = ArgAction::SetTrue)]
        yaml: bool,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the version
    Version {
        /// Append the build number
        #[arg(short = 'e', long = "extended", action = ArgAction::SetTrue)]
        extended: bool,
    },
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Folder holding the wrap files (watched recursively)
    #[arg(long = "wraps-folder", env = "KRAPPER_WRAPS_FOLDER")]
    wraps_folder: PathBuf,
    #[arg(long = "bind-addr", env = "KRAPPER_BIND_ADDR", default_value = "0.0.0.0")]
    bind_addr: IpAddr,
    #[arg(long = "bind-port", env = "KRAPPER_BIND_PORT", default_value_t = 7777)]
    bind_port: u16,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Dump { Json, Yaml }

fn init_tracing(level: &str, mode: LogMode) {
    let filter = tracing_subscriber::EnvFilter::try_new(level).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr);
    match mode {
        LogMode::Text => builder.init(),
        LogMode::Json => builder.json().init(),
    }
}

fn init_metrics() {
    if let Ok(addr) = std::env::var("KRAPPER_METRICS_ADDR") {
        if let Ok(sock) = addr.parse::<std::net::SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            warn!(addr = %addr, "invalid KRAPPER_METRICS_ADDR; expected host:port");
        }
    }
}

fn version_string(extended: bool) -> String {
    let version = env!("CARGO_PKG_VERSION");
    if extended {
        format!("{}.{}", version, option_env!("KRAPPER_BUILD_TS").unwrap_or("dev"))
    } else {
        version.to_string()
    }
}

/// Load one file the way the server would, but fail on non-wrap documents.
fn groom_file(path: &Path) -> Result<Wrap> {
    let abs = std::path::absolute(path).with_context(|| format!("resolving {}", path.display()))?;
    krapper_schema::load(&abs)?.ok_or_else(|| anyhow!("{} is not a wrap document", abs.display()))
}

fn render(wrap: &Wrap, dump: Dump) -> Result<String> {
    Ok(match dump {
        Dump::Json => serde_json::to_string_pretty(wrap)?,
        Dump::Yaml => serde_yaml::to_string(wrap)?,
    })
}

async fn serve(args: ServeArgs) -> Result<()> {
    let store = WrapStore::open(&args.wraps_folder)
        .await
        .with_context(|| format!("opening wraps folder {}", args.wraps_folder.display()))?;
    let lister = match KubeLister::try_default().await {
        Ok(l) => Some(Arc::new(l) as Arc<dyn ResourceLister>),
        Err(e) => {
            warn!(error = %e, "no kubernetes client; resource listing disabled");
            None
        }
    };
    let listener = TcpListener::bind((args.bind_addr, args.bind_port))
        .await
        .with_context(|| format!("binding {}:{}", args.bind_addr, args.bind_port))?;
    let state = AppState { store: Arc::new(store), lister };
    krapper_api::serve(listener, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "signal handler failed");
        }
        info!("shutting down");
    })
    .await
    .context("http server")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_mode);
    init_metrics();

    match cli.command {
        Commands::Serve(args) => serve(args).await?,
        Commands::Groom { json, yaml, files } => {
            for file in files {
                let wrap = groom_file(&file)?;
                info!(path = %file.display(), wrap = %wrap.name, fields = wrap.schema.fields.len(), "wrap groomed");
                if json {
                    println!("{}", render(&wrap, Dump::Json)?);
                }
                if yaml {
                    println!("{}", render(&wrap, Dump::Yaml)?);
                }
            }
        }
        Commands::Version { extended } => println!("{}", version_string(extended)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "apiVersion: krapper.kubotal.io/v1alpha1\nkind: Wrap\nname: configMaps\nversion: v1\nmenuMode: grid\nsource:\n  apiVersion: v1\n  kind: ConfigMap\nschema:\n  fields:\n    - name: data\n      string:\n        height: 4\n";

    #[test]
    fn serve_defaults() {
        let cli = Cli::try_parse_from(["krapper", "serve", "--wraps-folder", "/w"]).unwrap();
        assert_eq!(cli.log_mode, LogMode::Text);
        let Commands::Serve(args) = cli.command else { panic!("expected serve") };
        assert_eq!(args.bind_addr.to_string(), "0.0.0.0");
        assert_eq!(args.bind_port, 7777);
        assert_eq!(args.wraps_folder, PathBuf::from("/w"));
    }

    #[test]
    fn groom_needs_files() {
        assert!(Cli::try_parse_from(["krapper", "groom", "--json"]).is_err());
        let cli = Cli::try_parse_from(["krapper", "--log-mode", "json", "groom", "-y", "a.yaml"]).unwrap();
        assert_eq!(cli.log_mode, LogMode::Json);
        assert!(matches!(cli.command, Commands::Groom { json: false, yaml: true, .. }));
    }

    #[test]
    fn versions() {
        assert_eq!(version_string(false), env!("CARGO_PKG_VERSION"));
        assert!(version_string(true).starts_with(&format!("{}.", env!("CARGO_PKG_VERSION"))));
    }

    #[test]
    fn groom_renders_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cm.yaml");
        std::fs::write(&path, DOC).unwrap();
        let wrap = groom_file(&path).unwrap();
        assert_eq!(wrap.label, "Config maps");

        let json: serde_json::Value = serde_json::from_str(&render(&wrap, Dump::Json).unwrap()).unwrap();
        assert_eq!(json["schema"]["fields"][0]["string"]["uiComponent"], "textarea");
        let yaml = render(&wrap, Dump::Yaml).unwrap();
        assert!(yaml.contains("menuMode: grid"));
    }

    #[test]
    fn groom_rejects_foreign_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.yaml");
        std::fs::write(&path, "apiVersion: v1\nkind: ConfigMap\n").unwrap();
        let err = groom_file(&path).unwrap_err();
        assert!(err.to_string().contains("not a wrap document"));
    }
}
