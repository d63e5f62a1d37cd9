use clap::Parser;
use saveit::parsers::Extractor;
use saveit::render::{TitlePolicy, render_page};
use saveit::{ContentRenderer, DocumentView, ParseResponse};
use std::error::Error;
use url::Url;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a saved HTML page
    #[arg(short, long)]
    file: String,

    /// URL the page was saved from, used to resolve relative links
    #[arg(short, long, default_value = "https://example.com/")]
    url: String,

    /// Keep the title heading in the body
    #[arg(long)]
    inline_title: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logger
    env_logger::init();

    let args = Args::parse();
    let source = std::fs::read_to_string(&args.file)?;
    let url = Url::parse(&args.url)?;

    let Some(extracted) = Extractor::default().extract(&source, &url) else {
        println!("No readable content found in {}", args.file);
        return Ok(());
    };

    let document = ParseResponse {
        links: extracted.page.links.clone(),
        pages: vec![extracted.page],
    }
    .into_document()
    .ok_or("no page extracted")?;

    let policy = if args.inline_title {
        TitlePolicy::Inline
    } else {
        TitlePolicy::Extract
    };
    let view = DocumentView::new(ContentRenderer::new(), policy);
    let title = document.title().unwrap_or(document.url.as_str());

    println!("{}", render_page(title, &view.render_document(&document)));
    Ok(())
}
