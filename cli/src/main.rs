//! skpl2md CLI - convert a page range of the SKPL guide to Markdown

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use skpl2md::{
    BlockSource, ConversionReport, ConverterConfig, OutputSink, PageConverter, PageRange,
    WriteMode,
};

#[derive(Parser)]
#[command(name = "skpl2md")]
#[command(version)]
#[command(about = "Convert pages of docs/SKPL_ArtConnect.pdf to docs/SKPL.md", long_about = None)]
struct Cli {
    /// First page index to convert (0-based)
    #[arg(long)]
    start: usize,

    /// Page index to stop before (exclusive, clamped to the page count)
    #[arg(long)]
    end: usize,

    /// Output mode: "w" to overwrite, "a" to append
    #[arg(long)]
    mode: String,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = cmd_convert(cli.start, cli.end, &cli.mode) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_convert(start: usize, end: usize, mode: &str) -> Result<(), Box<dyn std::error::Error>> {
    let converter = PageConverter::new(ConverterConfig::default());

    log::debug!("Reading {}", converter.config().source.display());
    let source = converter.open_source()?;
    let range = converter.resolve_range(PageRange::new(start, end), source.page_count())?;
    println!("Processing {}", range);

    let mode: WriteMode = mode.parse()?;
    let sink = ProgressSink::new(converter.open_output(mode)?);
    let report = converter.convert_pages(&source, range, sink)?;

    print_summary(&report, &converter.config().output.display().to_string());
    Ok(())
}

/// Wraps a sink with a spinner counting written fragments.
struct ProgressSink<S> {
    inner: S,
    bar: ProgressBar,
}

impl<S: OutputSink> ProgressSink<S> {
    fn new(inner: S) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {pos} blocks written {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Self { inner, bar }
    }
}

impl<S: OutputSink> OutputSink for ProgressSink<S> {
    fn write_fragment(&mut self, fragment: &str) -> skpl2md::Result<()> {
        self.inner.write_fragment(fragment)?;
        self.bar.inc(1);
        Ok(())
    }

    fn close(&mut self) -> skpl2md::Result<()> {
        self.bar.finish_and_clear();
        self.inner.close()
    }
}

fn print_summary(report: &ConversionReport, output: &str) {
    if report.range.is_empty() {
        println!("{}", "No pages in range, nothing written".yellow());
        return;
    }

    println!(
        "{} {} ({} pages)",
        "Saved to".green(),
        output,
        report.pages
    );
    println!("  {} {} paragraphs", "├─".dimmed(), report.text_blocks);
    println!("  {} {} image placeholders", "├─".dimmed(), report.images);
    println!(
        "  {} {} headers/footers removed",
        "└─".dimmed(),
        report.headers_skipped
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use skpl2md::MemorySink;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_requires_all_arguments() {
        assert!(Cli::try_parse_from(["skpl2md", "--start", "0", "--end", "5"]).is_err());
        assert!(
            Cli::try_parse_from(["skpl2md", "--start", "-1", "--end", "5", "--mode", "w"]).is_err()
        );

        let cli = Cli::try_parse_from(["skpl2md", "--start", "0", "--end", "5", "--mode", "a"])
            .unwrap();
        assert_eq!((cli.start, cli.end, cli.mode.as_str()), (0, 5, "a"));
    }

    #[test]
    fn test_progress_sink_forwards() {
        let mut inner = MemorySink::new();
        let mut sink = ProgressSink::new(&mut inner);
        sink.write_fragment("text\n\n").unwrap();
        assert_eq!(sink.bar.position(), 1);
        sink.close().unwrap();
        drop(sink);
        assert!(inner.is_closed());
        assert_eq!(inner.contents(), "text\n\n");
    }
}
