//! Page subcommand handlers: rewrite, restore, extract and compare.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use tracing::info;

use mindmeld_config::Config;
use mindmeld_dom::Document;
use mindmeld_protocols::preferences::SIMPLIFICATION_LEVEL;
use mindmeld_protocols::{PreferenceStore, ProfileKey};
use mindmeld_runtime::compare::lens_for_level;
use mindmeld_runtime::{
    apply_theme, compare_pages, extract_page_text, restore_region, ComparePage, ExtractOptions,
    Theme,
};

use crate::app::{preference_store, read_page, write_output, App};

/// Rewrite a page and write the result.
pub(crate) async fn rewrite(
    config: &Config,
    input: &Path,
    output: Option<&Path>,
    profile: Option<ProfileKey>,
    theme: Option<&str>,
) -> anyhow::Result<()> {
    let theme = theme
        .map(|name| Theme::lookup(name).ok_or_else(|| anyhow!("Unknown theme: {name}")))
        .transpose()?;

    let app = App::new(config, read_page(input).await?, profile)?;
    let page = app.router.content().page();
    let summary = app.controller.simplify_page(page).await?;
    info!(
        profile = %summary.profile,
        replaced = summary.replaced,
        skipped = summary.skipped,
        "Rewrite finished"
    );
    eprintln!("{}", serde_json::to_string(&summary)?);

    let mut page = page.lock().await;
    if let Some(theme) = theme {
        apply_theme(&mut page, theme)?;
    }
    write_output(output, &page.html()).await
}

/// Put every rewritten element back.
pub(crate) async fn restore(input: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let mut page = read_page(input).await?;
    let root = page.root();
    let restored = restore_region(&mut page, root);
    eprintln!("Restored {restored} element(s)");
    write_output(output, &page.html()).await
}

/// Print the page's plain text.
pub(crate) async fn extract(config: &Config, input: &Path) -> anyhow::Result<()> {
    let page = read_page(input).await?;
    println!("{}", extract_page_text(&page, &ExtractOptions::from(&config.rewrite)));
    Ok(())
}

/// Compare pages through the content context, using the stored level as
/// the comparison lens.
pub(crate) async fn compare(config: &Config, pages: &[PathBuf]) -> anyhow::Result<()> {
    let options = ExtractOptions::from(&config.rewrite);
    let mut compared = Vec::with_capacity(pages.len());
    for path in pages {
        let doc = read_page(path).await?;
        compared.push(ComparePage::from_document(&doc, path.display().to_string(), &options));
    }

    let level = preference_store(config)
        .get(SIMPLIFICATION_LEVEL)
        .await
        .context("Failed to read preferences")?;
    let lens = lens_for_level(level.as_deref());

    let app = App::new(config, Document::new(), None)?;
    let output = compare_pages(app.router.as_ref(), &compared, lens).await?;
    println!("{output}");
    Ok(())
}
