use clap::Parser;
use saveit::render::render_page;
use saveit::{
    AppConfig, Backend, DocumentView, LocalBackend, ParsedDocument, RemoteBackend, Result, SaveId,
    ViewState,
};
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

mod args;
use args::{Args, Command};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ::log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    }
    .with_env_overrides();
    if let Some(api) = args.api {
        config.api_url = Some(api);
    }

    let view = config.document_view();

    if let Command::Render { file } = &args.command {
        return render_file(file.as_deref(), &view);
    }

    match &config.api_url {
        Some(api_url) => {
            ::log::info!("Using SaveIt server at {}", api_url);
            let backend = RemoteBackend::new(api_url)?;
            execute(&backend, args.command, view).await
        }
        None => {
            ::log::info!("Using save file {}", config.saves_file.display());
            let backend = LocalBackend::from_config(&config)?;
            let result = execute(&backend, args.command, view).await;
            backend.close().await;
            result
        }
    }
}

async fn execute<B: Backend>(backend: &B, command: Command, view: DocumentView) -> Result<()> {
    match command {
        Command::Parse {
            url,
            depth,
            html,
            save,
        } => {
            let mut state = ViewState::new(backend, view);
            state.open_url(&url, depth).await?;
            if save {
                state.save_current().await?;
            }
            if let Some(notice) = state.notice() {
                eprintln!("{}", notice);
            }

            if html {
                let title = state.current().and_then(ParsedDocument::title).unwrap_or(url.as_str());
                println!("{}", render_page(title, &state.render()));
            } else if let Some(document) = state.current() {
                println!("{}", serde_json::to_string_pretty(document)?);
            }
        }
        Command::Saves { html } => {
            let entries = backend.saves().await?;
            if html {
                println!("{}", render_page("Saved pages", &view.render_saves(&entries)));
            } else {
                for entry in &entries {
                    let document = entry.to_document();
                    println!("{}\t{}\t{}", entry.id, entry.url, document.title().unwrap_or(""));
                }
            }
        }
        Command::Show { id, html } => {
            let document = backend.get(SaveId(id)).await?.to_document();
            if html {
                let title = document.title().unwrap_or(document.url.as_str());
                println!("{}", render_page(title, &view.render_document(&document)));
            } else {
                println!("{}", serde_json::to_string_pretty(&document)?);
            }
        }
        Command::Remove { id } => {
            println!("{}", backend.remove(SaveId(id)).await?);
        }
        Command::RemoveAll => {
            println!("{}", backend.remove_all().await?);
        }
        Command::Render { file } => {
            render_file(file.as_deref(), &view)?;
        }
    }
    Ok(())
}

/// Render a document (an object with `content`) or a bare content list
fn render_file(file: Option<&Path>, view: &DocumentView) -> Result<()> {
    let input = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            input
        }
    };

    let value: Value = serde_json::from_str(&input)?;
    let page = if value.get("content").is_some() {
        let document: ParsedDocument = serde_json::from_value(value)?;
        let title = document.title().unwrap_or(document.url.as_str()).to_string();
        render_page(&title, &view.render_document(&document))
    } else {
        render_page("Content", &view.renderer().render_value(&value))
    };

    println!("{}", page);
    Ok(())
}
