use anyhow::Result;
use serde_json::json;

use devmatrix_lib::consts::PLATFORMS_ENV;
use devmatrix_lib::platform::{PlatformId, default_platforms};

use crate::output::{OutputFormat, print_json, print_stat};

pub fn cmd_info(format: OutputFormat) -> Result<()> {
  let host = PlatformId::host();
  let defaults = default_platforms();
  let defaults: Vec<&str> = defaults.iter().map(PlatformId::as_str).collect();
  let env_override = std::env::var(PLATFORMS_ENV).ok().filter(|list| !list.trim().is_empty());

  if format.is_json() {
    return print_json(&json!({
      "version": env!("CARGO_PKG_VERSION"),
      "host": host,
      "defaultPlatforms": defaults,
      "platformsOverride": env_override,
    }));
  }

  println!("devmatrix {}", env!("CARGO_PKG_VERSION"));
  match &host {
    Some(host) => print_stat("Host platform", host.as_str()),
    None => print_stat("Host platform", "unknown"),
  }
  print_stat("Default platforms", &defaults.join(", "));
  if let Some(list) = env_override {
    print_stat(PLATFORMS_ENV, &list);
  }
  Ok(())
}
