//! bindery - batch converters for e-book artifacts

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

use bindery::{epub, html, pdf, toc};

#[derive(Parser)]
#[command(name = "bindery")]
#[command(version, about = "Batch converters for e-book artifacts", long_about = None)]
#[command(after_help = "EXAMPLES:
    bindery epub-toc --input-epub book.epub          Write book_toc.txt
    bindery epub-images --input-epub book.epub       Extract page images to book/
    bindery pdf-images -i book.pdf                   Extract embedded images to book/
    bindery images-pdf -i scans --dpi 144            Assemble scans/ into scans.pdf
    bindery pdf-toc --pdf book.pdf --toc book_toc.txt
    bindery pdf-prefs -p book.pdf -l TwoPageRight -d R2L")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract an EPUB's table of contents to a CSV file beside the input
    EpubToc {
        /// EPUB file to read
        #[arg(long = "input-epub", value_name = "PATH")]
        input_epub: PathBuf,
    },
    /// Extract page images from a fixed-layout EPUB in spine order
    EpubImages {
        /// EPUB file to read
        #[arg(long = "input-epub", value_name = "PATH")]
        input_epub: PathBuf,
        /// Skip the cover (first spine page)
        #[arg(long)]
        skip_cover: bool,
    },
    /// Extract embedded images from a PDF
    PdfImages {
        /// PDF file to read
        #[arg(short = 'i', long = "input-pdf", value_name = "PATH")]
        input_pdf: PathBuf,
    },
    /// Assemble a directory of JPEG files into a PDF without re-encoding
    ImagesPdf {
        /// Directory containing the image files
        #[arg(short = 'i', long = "input-dir", value_name = "PATH")]
        input_dir: PathBuf,
        /// Fixed DPI for page sizing
        #[arg(long, default_value_t = 72)]
        dpi: u32,
    },
    /// Install a TOC CSV as a PDF document outline
    PdfToc {
        /// PDF file to modify in place
        #[arg(long, value_name = "PATH")]
        pdf: PathBuf,
        /// TOC CSV file (level,title,page records)
        #[arg(long, value_name = "PATH")]
        toc: PathBuf,
    },
    /// Set page layout and reading direction viewer preferences
    PdfPrefs {
        /// PDF file to modify in place
        #[arg(short = 'p', long, value_name = "PATH")]
        pdf: PathBuf,
        /// Page layout name (e.g. SinglePage, TwoPageRight)
        #[arg(short = 'l', long, default_value = "SinglePage")]
        layout: String,
        /// Reading direction (L2R or R2L)
        #[arg(short = 'd', long, default_value = "L2R")]
        direction: String,
    },
    /// Extract slide images from a saved HTML web-book page
    HtmlImages {
        /// HTML file to read
        #[arg(short = 'i', long = "input-file", value_name = "PATH")]
        input_file: PathBuf,
        /// Directory for the extracted images
        #[arg(short = 'o', long = "output-dir", value_name = "PATH")]
        output_dir: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::EpubToc { input_epub } => {
            epub::extract_toc(&input_epub)?;
        }
        Command::EpubImages {
            input_epub,
            skip_cover,
        } => {
            epub::extract_images(&input_epub, derived_dir(&input_epub), skip_cover)?;
        }
        Command::PdfImages { input_pdf } => {
            pdf::extract_images(&input_pdf, derived_dir(&input_pdf))?;
        }
        Command::ImagesPdf { input_dir, dpi } => {
            let output = sibling_pdf(&input_dir);
            pdf::images_to_pdf(&input_dir, &output, dpi)?;
        }
        Command::PdfToc { pdf, toc: toc_path } => {
            let entries = toc::read_toc(&toc_path)?;
            pdf::set_outline(&pdf, &entries)?;
        }
        Command::PdfPrefs {
            pdf,
            layout,
            direction,
        } => {
            pdf::set_viewer_prefs(&pdf, &layout, &direction)?;
        }
        Command::HtmlImages {
            input_file,
            output_dir,
        } => {
            html::extract_slide_images(&input_file, &output_dir)?;
        }
    }
    Ok(())
}

/// Output directory convention for extractors: `<input-dir>/<input-stem>/`.
fn derived_dir(input: &Path) -> PathBuf {
    input.with_extension("")
}

/// Output file convention for the assembler: `<dir-parent>/<dir-name>.pdf`.
fn sibling_pdf(input_dir: &Path) -> PathBuf {
    let name = input_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".into());
    input_dir
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("{name}.pdf"))
}
