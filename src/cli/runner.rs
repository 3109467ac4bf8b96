//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::AppConfig;
use crate::error::{Error, Result, ResultExt};
use crate::facade::{PaginationFacade, SearchView};
use crate::store::ListItem;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Search { query, pages } => self.search(query, *pages).await,
            Commands::Interactive => self.interactive().await,
            Commands::Config => self.show_config(),
        }
    }

    /// Load config from file (or defaults) and apply flag overrides
    fn load_config(&self) -> Result<AppConfig> {
        let mut config = match self.cli.config {
            Some(ref path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };

        if let Some(ref endpoint) = self.cli.endpoint {
            config.endpoint.clone_from(endpoint);
            config.validate()?;
        }

        Ok(config)
    }

    /// Load `pages` pages of `query` and print the result
    async fn search(&self, query: &str, pages: u32) -> Result<()> {
        if query.is_empty() {
            return Err(Error::config("Query must not be empty"));
        }
        if pages == 0 {
            return Err(Error::invalid_value("pages", "must be at least 1"));
        }

        let config = self.load_config()?;
        let facade = PaginationFacade::from_config(&config)?;

        if let Some(pending) = facade.activate_now(query).await {
            pending.wait().await?;
        }

        for _ in 1..pages {
            match facade.on_scroll_near_bottom().await {
                Some(pending) => pending.wait().await?,
                None => break,
            }
        }

        let view = facade.view().await;
        self.print_view(&view)?;

        match view.error {
            Some(message) => Err(Error::Other(message)),
            None => Ok(()),
        }
    }

    /// Line-driven session over stdin
    async fn interactive(&self) -> Result<()> {
        let config = self.load_config()?;
        let facade = PaginationFacade::from_config(&config)?;
        let mut changes = facade.subscribe();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    match line.trim() {
                        ":q" => break,
                        "" => {
                            if facade.on_scroll_near_bottom().await.is_none() {
                                debug!("Nothing more to load");
                            }
                        }
                        ":r" => {
                            let _pending = facade.refresh().await;
                        }
                        text => facade.set_query(text),
                    }
                }
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.print_view(&facade.view().await)?;
                }
            }
        }

        Ok(())
    }

    /// Print the effective configuration
    fn show_config(&self) -> Result<()> {
        let config = self.load_config()?;
        match self.cli.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&config).context("Failed to encode config")?;
                println!("{json}");
            }
            OutputFormat::Pretty => print!("{}", config.to_yaml()?),
        }
        Ok(())
    }

    fn print_view(&self, view: &SearchView) -> Result<()> {
        match self.cli.format {
            OutputFormat::Json => {
                let line = serde_json::to_string(view).context("Failed to encode view")?;
                println!("{line}");
            }
            OutputFormat::Pretty => print!("{}", render_pretty(view)),
        }
        Ok(())
    }
}

/// Plain-text rendering of a view
fn render_pretty(view: &SearchView) -> String {
    let mut out = String::new();

    if view.query.is_empty() {
        out.push_str("Type a search query\n");
        return out;
    }

    let shown = view.books().count();
    match view.total_count {
        Some(total) => out.push_str(&format!(
            "Results for '{}' ({} of {})\n",
            view.query, shown, total
        )),
        None => out.push_str(&format!("Results for '{}'\n", view.query)),
    }

    if view.is_initial_load {
        out.push_str("Loading...\n");
        return out;
    }

    for (idx, item) in view.items.iter().enumerate() {
        match item {
            ListItem::Book(book) if book.authors.is_empty() => {
                out.push_str(&format!("{:>4}. {}\n", idx + 1, book.title));
            }
            ListItem::Book(book) => {
                out.push_str(&format!(
                    "{:>4}. {} by {}\n",
                    idx + 1,
                    book.title,
                    book.author_line()
                ));
            }
            ListItem::LoadingPlaceholder => out.push_str("      ... more (press Enter)\n"),
        }
    }

    if let Some(ref error) = view.error {
        out.push_str(&format!("Error: {error}\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BookRecord;
    use clap::Parser;

    fn view_with(items: Vec<ListItem>) -> SearchView {
        SearchView {
            query: "dune".to_string(),
            items,
            total_count: Some(120),
            has_more: true,
            ..SearchView::default()
        }
    }

    #[test]
    fn test_render_pretty_books_and_placeholder() {
        let view = view_with(vec![
            ListItem::Book(BookRecord::new(
                "/works/OL1W",
                "Dune",
                vec!["Frank Herbert".to_string()],
            )),
            ListItem::Book(BookRecord::new("/works/OL2W", "Dune Companion", vec![])),
            ListItem::LoadingPlaceholder,
        ]);

        let text = render_pretty(&view);
        assert!(text.starts_with("Results for 'dune' (2 of 120)\n"));
        assert!(text.contains("   1. Dune by Frank Herbert\n"));
        assert!(text.contains("   2. Dune Companion\n"));
        assert!(text.contains("more (press Enter)"));
    }

    #[test]
    fn test_render_pretty_initial_load_and_error() {
        let mut view = view_with(vec![]);
        view.is_initial_load = true;
        view.total_count = None;
        assert_eq!(render_pretty(&view), "Results for 'dune'\nLoading...\n");

        let mut view = view_with(vec![]);
        view.error = Some("HTTP 500: oops".to_string());
        assert!(render_pretty(&view).ends_with("Error: HTTP 500: oops\n"));

        assert_eq!(render_pretty(&SearchView::empty("")), "Type a search query\n");
    }

    #[tokio::test]
    async fn test_search_rejects_zero_pages() {
        let cli = Cli::try_parse_from(["shelfscroll", "search", "dune", "--pages", "0"]).unwrap();
        let err = Runner::new(cli).run().await.unwrap_err();

        assert!(matches!(err, Error::InvalidConfigValue { ref field, .. } if field == "pages"));
    }
}
