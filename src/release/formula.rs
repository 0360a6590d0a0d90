//! Homebrew formula rendering
//!
//! Pure text generation. The output shape is chosen only from which asset
//! slots are filled, never from what the caller built:
//!
//! - ARM and Intel both filled: one `on_macos` block branching on `Hardware::CPU.arm?`
//! - exactly one filled: a plain single-url formula using that pair
//! - nothing filled: a plain formula with empty `url`/`sha256` ([`FormulaShape::Empty`])

use serde::Serialize;

/// A downloadable archive and its SHA-256
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Asset {
  pub url: String,
  pub sha256: String,
}

impl Asset {
  pub fn new(url: impl Into<String>, sha256: impl Into<String>) -> Self {
    Self {
      url: url.into(),
      sha256: sha256.into(),
    }
  }

  /// Both url and hash are present
  pub fn is_filled(&self) -> bool {
    !self.url.is_empty() && !self.sha256.is_empty()
  }
}

/// Asset slots available to the formula
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSlots {
  /// One architecture-independent asset
  Single(Asset),
  /// Per-architecture assets, either may be absent
  PerArch { arm: Option<Asset>, intel: Option<Asset> },
}

/// Which template [`render`] will use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaShape {
  PlatformBranching,
  Single,
  Empty,
}

/// Everything the formula text is built from
#[derive(Debug, Clone)]
pub struct FormulaSpec {
  /// Formula name; drives the class name and file name
  pub name: String,
  /// Executable inside the archive
  pub binary: String,
  pub description: String,
  pub homepage: String,
  pub license: String,
  pub version: String,
  pub assets: AssetSlots,
}

fn filled(asset: &Option<Asset>) -> Option<&Asset> {
  asset.as_ref().filter(|a| a.is_filled())
}

/// Classify the slots
pub fn shape(slots: &AssetSlots) -> FormulaShape {
  match slots {
    AssetSlots::Single(asset) if asset.is_filled() => FormulaShape::Single,
    AssetSlots::Single(_) => FormulaShape::Empty,
    AssetSlots::PerArch { arm, intel } => match (filled(arm), filled(intel)) {
      (Some(_), Some(_)) => FormulaShape::PlatformBranching,
      (Some(_), None) | (None, Some(_)) => FormulaShape::Single,
      (None, None) => FormulaShape::Empty,
    },
  }
}

/// Ruby class name: words split on non-alphanumerics, each capitalised.
///
/// `my-tool` → `MyTool`, `ripgrep_all` → `RipgrepAll`, `2fa` → `Formula2fa`.
pub fn formula_class_name(name: &str) -> String {
  let mut class: String = name
    .split(|c: char| !c.is_ascii_alphanumeric())
    .filter(|word| !word.is_empty())
    .map(|word| {
      let mut chars = word.chars();
      match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
      }
    })
    .collect();
  if class.starts_with(|c: char| c.is_ascii_digit()) {
    class.insert_str(0, "Formula");
  }
  class
}

/// File stem under `Formula/`: lowercase, non-alphanumeric runs become `-`
pub fn formula_file_stem(name: &str) -> String {
  name
    .split(|c: char| !c.is_ascii_alphanumeric())
    .filter(|word| !word.is_empty())
    .map(str::to_ascii_lowercase)
    .collect::<Vec<_>>()
    .join("-")
}

fn quote(value: &str) -> String {
  let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
  format!("\"{}\"", escaped)
}

/// Render the formula text
pub fn render(spec: &FormulaSpec) -> String {
  let mut output = String::new();

  output.push_str(&format!("class {} < Formula\n", formula_class_name(&spec.name)));
  output.push_str(&format!("  desc {}\n", quote(&spec.description)));
  output.push_str(&format!("  homepage {}\n", quote(&spec.homepage)));
  output.push_str(&format!("  version {}\n", quote(&spec.version)));
  if !spec.license.is_empty() {
    output.push_str(&format!("  license {}\n", quote(&spec.license)));
  }

  match &spec.assets {
    AssetSlots::PerArch { arm, intel } => match (filled(arm), filled(intel)) {
      (Some(arm), Some(intel)) => {
        output.push('\n');
        output.push_str("  on_macos do\n");
        output.push_str("    if Hardware::CPU.arm?\n");
        push_source(&mut output, arm, "      ");
        output.push_str("    else\n");
        push_source(&mut output, intel, "      ");
        output.push_str("    end\n");
        output.push_str("  end\n");
      }
      (Some(only), None) | (None, Some(only)) => push_source(&mut output, only, "  "),
      (None, None) => push_source(&mut output, &Asset::default(), "  "),
    },
    AssetSlots::Single(asset) => push_source(&mut output, asset, "  "),
  }

  output.push('\n');
  output.push_str("  def install\n");
  output.push_str(&format!("    bin.install {}\n", quote(&spec.binary)));
  output.push_str("  end\n\n");
  output.push_str("  test do\n");
  output.push_str(&format!("    system \"#{{bin}}/{}\", \"--help\"\n", spec.binary));
  output.push_str("  end\n");
  output.push_str("end\n");

  output
}

fn push_source(output: &mut String, asset: &Asset, indent: &str) {
  output.push_str(&format!("{}url {}\n", indent, quote(&asset.url)));
  output.push_str(&format!("{}sha256 {}\n", indent, quote(&asset.sha256)));
}

#[cfg(test)]
mod tests {
  use super::*;

  fn spec(assets: AssetSlots) -> FormulaSpec {
    FormulaSpec {
      name: "tool".to_string(),
      binary: "tool".to_string(),
      description: "A \"tiny\" tool".to_string(),
      homepage: "https://example.test/tool".to_string(),
      license: "MIT".to_string(),
      version: "1.2.0".to_string(),
      assets,
    }
  }

  #[test]
  fn test_intel_only_has_no_platform_block() {
    let slots = AssetSlots::PerArch {
      arm: None,
      intel: Some(Asset::new("https://dl/tool-x86_64.tar.gz", "abc123")),
    };
    assert_eq!(shape(&slots), FormulaShape::Single);

    let text = render(&spec(slots));
    assert!(!text.contains("on_macos"));
    assert!(!text.contains("Hardware::CPU"));
    assert!(text.contains("  url \"https://dl/tool-x86_64.tar.gz\"\n"));
    assert!(text.contains("  sha256 \"abc123\"\n"));
  }

  #[test]
  fn test_both_arches_branch_on_cpu() {
    let slots = AssetSlots::PerArch {
      arm: Some(Asset::new("https://dl/tool-arm64.tar.gz", "aaa111")),
      intel: Some(Asset::new("https://dl/tool-x86_64.tar.gz", "bbb222")),
    };
    assert_eq!(shape(&slots), FormulaShape::PlatformBranching);

    let text = render(&spec(slots));
    assert!(text.contains("  on_macos do\n    if Hardware::CPU.arm?\n"));
    assert!(text.contains("tool-arm64.tar.gz"));
    assert!(text.contains("tool-x86_64.tar.gz"));
    assert!(text.contains("aaa111"));
    assert!(text.contains("bbb222"));
    // ARM pair comes first
    assert!(text.find("aaa111") < text.find("bbb222"));
    // no top-level url outside the block
    assert!(!text.lines().any(|l| l.starts_with("  url ")));
  }

  #[test]
  fn test_half_filled_slot_does_not_count() {
    let slots = AssetSlots::PerArch {
      arm: Some(Asset::new("https://dl/tool-arm64.tar.gz", "")),
      intel: Some(Asset::new("https://dl/tool-x86_64.tar.gz", "bbb222")),
    };
    assert_eq!(shape(&slots), FormulaShape::Single);
    assert!(render(&spec(slots)).contains("  url \"https://dl/tool-x86_64.tar.gz\""));
  }

  #[test]
  fn test_empty_slots_render_degenerate_formula() {
    let slots = AssetSlots::PerArch { arm: None, intel: None };
    assert_eq!(shape(&slots), FormulaShape::Empty);
    let text = render(&spec(slots));
    assert!(text.contains("  url \"\"\n"));
    assert!(text.contains("  sha256 \"\"\n"));
    assert_eq!(shape(&AssetSlots::Single(Asset::default())), FormulaShape::Empty);
  }

  #[test]
  fn test_install_and_smoke_test() {
    let text = render(&spec(AssetSlots::Single(Asset::new("https://dl/tool.tar.gz", "ff00"))));
    assert!(text.starts_with("class Tool < Formula\n"));
    assert!(text.contains("  desc \"A \\\"tiny\\\" tool\"\n"));
    assert!(text.contains("    bin.install \"tool\"\n"));
    assert!(text.contains("    system \"#{bin}/tool\", \"--help\"\n"));
    assert!(text.ends_with("  end\nend\n"));
  }

  #[test]
  fn test_class_names() {
    assert_eq!(formula_class_name("tool"), "Tool");
    assert_eq!(formula_class_name("my-tool"), "MyTool");
    assert_eq!(formula_class_name("ripgrep_all"), "RipgrepAll");
    assert_eq!(formula_class_name("swiftFormat"), "SwiftFormat");
    assert_eq!(formula_class_name("2fa"), "Formula2fa");
    assert_eq!(formula_class_name("a.b c"), "ABC");
  }

  #[test]
  fn test_file_stems() {
    assert_eq!(formula_file_stem("MyTool"), "mytool");
    assert_eq!(formula_file_stem("my_tool.cli"), "my-tool-cli");
    assert_eq!(formula_file_stem("--tool--"), "tool");
  }
}
