//! Command-line subcommands.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use tracing::info;
use vnlegal_core::SplitterSettings;
use vnlegal_ingest::{extract_text, normalize_text};
use vnlegal_llm::{create_llm, LLMConfig};
use vnlegal_splitter::LegalSplitter;

pub const USAGE: &str = "VnLegal — Vietnamese legal document splitter

Usage: vnlegal [command]

Commands:
  (none)                          Start the HTTP server
  split <file> [--out <file.md>]  Split a document and print or write its Markdown
  help                            Show this help message

Environment:
  VNLEGAL_DATA_DIR       data directory (database, uploads, llm-config.json)
  PORT                   HTTP port (default 5000)
  VNLEGAL_USE_LLM        use the LLM for keywords (default true)
  VNLEGAL_LLM_CATEGORY   use the LLM for categories (default false)
  VNLEGAL_EMIT_CHAPTERS  emit Chương blocks (default false)
  VNLEGAL_SPLIT_POINTS   split clauses into Điểm blocks (default false)";

/// Resolved arguments of `vnlegal split`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
}

impl SplitArgs {
    /// Parse the arguments following `split`.
    pub fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut input = None;
        let mut output = None;
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--out" | "-o" => {
                    let path = iter.next().context("--out needs a file path")?;
                    output = Some(PathBuf::from(path));
                }
                flag if flag.starts_with('-') => bail!("Unknown option: {}", flag),
                path if input.is_none() => input = Some(PathBuf::from(path)),
                extra => bail!("Unexpected argument: {}", extra),
            }
        }
        Ok(Self {
            input: input.context("Usage: vnlegal split <file> [--out <file.md>]")?,
            output,
        })
    }
}

/// Extract, normalize and split one file, then print or write the Markdown.
pub fn run_split(args: &SplitArgs, data_dir: &Path) -> anyhow::Result<()> {
    let raw = extract_text(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let text = normalize_text(&raw);

    let llm_config = LLMConfig::load(&data_dir.join("llm-config.json"));
    let splitter = LegalSplitter::new(create_llm(&llm_config), SplitterSettings::from_env());

    let filename = args
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document");
    let output = splitter.split_to_markdown(&text, filename);
    if output.blocks.is_empty() {
        bail!("No legal structure found in {}", args.input.display());
    }

    match &args.output {
        Some(path) => {
            std::fs::write(path, &output.markdown)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(
                "Wrote {} blocks to {} (keyword: {})",
                output.blocks.len(),
                path.display(),
                output.keyword
            );
        }
        None => println!("{}", output.markdown),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_split_args() {
        let parsed = SplitArgs::parse(&args(&["qd.pdf", "--out", "qd.md"])).unwrap();
        assert_eq!(parsed.input, PathBuf::from("qd.pdf"));
        assert_eq!(parsed.output, Some(PathBuf::from("qd.md")));

        let parsed = SplitArgs::parse(&args(&["qd.txt"])).unwrap();
        assert!(parsed.output.is_none());
    }

    #[test]
    fn test_parse_split_args_errors() {
        assert!(SplitArgs::parse(&args(&[])).is_err());
        assert!(SplitArgs::parse(&args(&["a.pdf", "--out"])).is_err());
        assert!(SplitArgs::parse(&args(&["a.pdf", "b.pdf"])).is_err());
        assert!(SplitArgs::parse(&args(&["a.pdf", "--verbose"])).is_err());
    }

    #[test]
    fn test_run_split_writes_markdown() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("hoc_phi.txt");
        std::fs::write(
            &input,
            "Số: 7/QĐ-ĐHTN\nCăn cứ Luật Giáo dục;\nQUYẾT ĐỊNH:\nĐiều 1. Học phí\nMức thu.\n",
        )
        .unwrap();
        let out = dir.path().join("out.md");

        let split = SplitArgs {
            input,
            output: Some(out.clone()),
        };
        run_split(&split, dir.path()).unwrap();

        let markdown = std::fs::read_to_string(out).unwrap();
        assert!(markdown.contains("Điều 1. Học phí"));
        assert!(markdown.contains("7/QĐ-ĐHTN"));
    }

    #[test]
    fn test_run_split_without_structure() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("note.txt");
        std::fs::write(&input, "Ghi chú nội bộ").unwrap();
        let split = SplitArgs {
            input,
            output: None,
        };
        assert!(run_split(&split, dir.path()).is_err());
    }
}
