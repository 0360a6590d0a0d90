//! `tapship formula`: render a formula to stdout from explicit assets

use crate::core::error::{ShipError, ShipResult};
use crate::release::formula::{self, Asset, AssetSlots, FormulaShape, FormulaSpec};

/// Flags for `tapship formula`
#[derive(Debug, Clone, Default)]
pub struct FormulaArgs {
  pub name: String,
  pub binary: Option<String>,
  pub version: String,
  pub description: String,
  pub homepage: String,
  pub license: String,
  pub url: Option<String>,
  pub sha256: Option<String>,
  pub arm_url: Option<String>,
  pub arm_sha256: Option<String>,
  pub intel_url: Option<String>,
  pub intel_sha256: Option<String>,
}

fn pair(url: Option<String>, sha256: Option<String>) -> Option<Asset> {
  match (url, sha256) {
    (None, None) => None,
    (url, sha256) => Some(Asset::new(url.unwrap_or_default(), sha256.unwrap_or_default())),
  }
}

/// Build the formula spec from CLI flags
pub fn formula_spec(args: FormulaArgs) -> ShipResult<FormulaSpec> {
  if formula::formula_class_name(&args.name).is_empty() {
    return Err(ShipError::message(format!(
      "Formula name '{}' has no letters or digits",
      args.name
    )));
  }

  let assets = match pair(args.url, args.sha256) {
    Some(single) => AssetSlots::Single(single),
    None => AssetSlots::PerArch {
      arm: pair(args.arm_url, args.arm_sha256),
      intel: pair(args.intel_url, args.intel_sha256),
    },
  };

  Ok(FormulaSpec {
    binary: args.binary.unwrap_or_else(|| args.name.clone()),
    name: args.name,
    description: args.description,
    homepage: args.homepage,
    license: args.license,
    version: args.version,
    assets,
  })
}

pub fn run_formula(args: FormulaArgs) -> ShipResult<()> {
  let spec = formula_spec(args)?;
  if formula::shape(&spec.assets) == FormulaShape::Empty {
    eprintln!("⚠️  No asset has both a URL and a SHA-256; the formula will not install anything");
  }
  print!("{}", formula::render(&spec));
  Ok(())
}
