use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[clap(name = "car-wash-manager shell host")]
pub struct Cli {
    /// Directory holding the packaged app, with the shell at `index.html`
    #[clap(long, env, default_value = "static")]
    pub static_path: PathBuf,
    #[clap(long, env, default_value = "8080")]
    pub port: u16,
    #[clap(long, env, default_value = "127.0.0.1")]
    pub bind_addr: String,
    /// Where the worker script is served. Its directory limits the scope it
    /// can register for unless Service-Worker-Allowed says otherwise
    #[clap(long, env, default_value = "/service_worker.js")]
    pub worker_path: String,
    /// wasm-bindgen output for the service-worker crate, without extension
    #[clap(long, env, default_value = "/wasm/service_worker")]
    pub wasm_path: String,
}

impl Cli {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.worker_path.starts_with('/') {
            bail!("--worker-path must start with '/', got {:?}", self.worker_path);
        }
        if self.wasm_path.contains('\'') {
            bail!("--wasm-path can't contain quotes, got {:?}", self.wasm_path);
        }
        Ok(())
    }

    pub fn shell(&self) -> PathBuf {
        self.static_path.join("index.html")
    }
}
